//! Terminal host implementation using Reedline.
//!
//! Line editing in Vi or Emacs mode, tab completion of command names,
//! highlighting and a persistent history file.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use nu_ansi_term::{Color, Style};
use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, DefaultHinter, EditCommand, EditMode, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, Keybindings, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch,
    PromptHistorySearchStatus, PromptViMode, Reedline, ReedlineEvent, ReedlineMenu,
    Signal as ReedlineSignal, Vi,
};
use tracing::{debug, warn};

use crate::completer::ShellCompleter;
use crate::highlighter::ShellHighlighter;
use crate::io::{InputLine, IoError, IoHost, Output, OutputStyle, PromptConfig, Signal};

/// Environment variable forcing the edit mode (`vi` or `emacs`).
pub const EDIT_MODE_ENV: &str = "KFS_EDIT_MODE";

const HISTORY_SIZE: usize = 1000;
const COMPLETION_MENU: &str = "completion_menu";

/// Terminal host using Reedline for interactive I/O.
pub struct TerminalHost {
    line_editor: Reedline,
    pending_input: Option<InputLine>,
    pending_signal: Option<Signal>,
    current_prompt: PromptConfig,
}

impl TerminalHost {
    pub fn new() -> Result<Self, IoError> {
        let hinter = Box::new(
            DefaultHinter::default().with_style(Style::new().fg(Color::LightGray).dimmed()),
        );
        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name(COMPLETION_MENU)
                .with_text_style(Style::new().fg(Color::Cyan))
                .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan).bold()),
        );

        let mut line_editor = Reedline::create()
            .with_completer(Box::new(ShellCompleter::new()))
            .with_highlighter(Box::new(ShellHighlighter::new()))
            .with_hinter(hinter)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode());

        if let Some(path) = history_path() {
            match open_history(&path) {
                Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
                Err(e) => warn!(path = %path.display(), error = %e, "history unavailable"),
            }
        }

        Ok(Self {
            line_editor,
            pending_input: None,
            pending_signal: None,
            current_prompt: PromptConfig::default(),
        })
    }
}

impl IoHost for TerminalHost {
    fn wait_for_input(&mut self) -> Result<(), IoError> {
        let prompt = TerminalPrompt::from_config(&self.current_prompt);

        match self.line_editor.read_line(&prompt) {
            Ok(ReedlineSignal::Success(line)) => self.pending_input = Some(InputLine { line }),
            Ok(ReedlineSignal::CtrlC) => self.pending_signal = Some(Signal::Interrupt),
            Ok(ReedlineSignal::CtrlD) => self.pending_signal = Some(Signal::Eof),
            Err(e) => return Err(IoError::Io(format!("Reedline error: {}", e))),
        }

        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<InputLine>, IoError> {
        Ok(self.pending_input.take())
    }

    fn read_signal(&mut self) -> Result<Option<Signal>, IoError> {
        Ok(self.pending_signal.take())
    }

    fn write_output(&mut self, output: Output) -> Result<(), IoError> {
        let styled = match output.style {
            OutputStyle::Normal => output.text,
            OutputStyle::Error => {
                format!("{} {}", Color::Red.bold().paint("Error:"), output.text)
            }
            OutputStyle::Info | OutputStyle::Banner => Color::Cyan.paint(&output.text).to_string(),
        };
        println!("{}", styled);
        Ok(())
    }

    fn write_prompt(&mut self, config: PromptConfig) -> Result<(), IoError> {
        self.current_prompt = config;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), IoError> {
        io::stdout().flush().map_err(|e| IoError::Io(e.to_string()))
    }
}

/// Prompt showing the current directory and its child count.
struct TerminalPrompt {
    path: String,
    entry_count: usize,
}

impl TerminalPrompt {
    fn from_config(config: &PromptConfig) -> Self {
        Self {
            path: config.current_path.clone(),
            entry_count: config.entry_count,
        }
    }
}

impl Prompt for TerminalPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "{} {}",
            Color::Blue.bold().paint("kfs"),
            Color::Yellow.paint(&self.path)
        ))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        let label = if self.entry_count == 1 { "entry" } else { "entries" };
        Cow::Owned(
            Color::DarkGray
                .paint(format!("{} {}", self.entry_count, label))
                .to_string(),
        )
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => {
                Cow::Owned(format!("{} ", Color::Green.bold().paint("$")))
            }
            PromptEditMode::Vi(vi_mode) => {
                let indicator = match vi_mode {
                    PromptViMode::Normal => Color::Blue.bold().paint("[N]$"),
                    PromptViMode::Insert => Color::Green.bold().paint("[I]$"),
                };
                Cow::Owned(format!("{} ", indicator))
            }
            PromptEditMode::Custom(s) => Cow::Owned(format!("({})$ ", s)),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(": ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

fn edit_mode() -> Box<dyn EditMode> {
    if should_use_vi_mode() {
        debug!("using vi edit mode");
        let mut insert = default_vi_insert_keybindings();
        bind_tab_completion(&mut insert);
        Box::new(Vi::new(insert, default_vi_normal_keybindings()))
    } else {
        let mut keybindings = default_emacs_keybindings();
        bind_tab_completion(&mut keybindings);
        // Ctrl+D on a non-empty line clears it instead of exiting
        keybindings.add_binding(
            KeyModifiers::CONTROL,
            KeyCode::Char('d'),
            ReedlineEvent::Edit(vec![EditCommand::Clear]),
        );
        Box::new(Emacs::new(keybindings))
    }
}

fn bind_tab_completion(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
}

fn history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("kfs").join("history.txt"))
}

fn open_history(path: &Path) -> Result<FileBackedHistory, String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    FileBackedHistory::with_file(HISTORY_SIZE, path.to_path_buf()).map_err(|e| e.to_string())
}

/// Vi mode is chosen by an explicit `KFS_EDIT_MODE`, else by a vi-family
/// `EDITOR`/`VISUAL`, else by `set editing-mode vi` in an inputrc.
fn should_use_vi_mode() -> bool {
    if let Ok(mode) = std::env::var(EDIT_MODE_ENV) {
        return is_vi_name(&mode);
    }

    let editor_is_vi = ["EDITOR", "VISUAL"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .any(|editor| {
            let editor = editor.to_lowercase();
            editor.contains("vim") || editor == "vi"
        });

    editor_is_vi || inputrc_requests_vi()
}

fn is_vi_name(mode: &str) -> bool {
    matches!(mode.to_lowercase().as_str(), "vi" | "vim")
}

fn inputrc_requests_vi() -> bool {
    let candidates = [
        std::env::var("INPUTRC").ok().map(PathBuf::from),
        dirs::home_dir().map(|p| p.join(".inputrc")),
        Some(PathBuf::from("/etc/inputrc")),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(|path| std::fs::read_to_string(path).ok())
        .any(|content| content.lines().any(is_vi_inputrc_line))
}

fn is_vi_inputrc_line(line: &str) -> bool {
    let mut words = line.split_whitespace();
    matches!(
        (words.next(), words.next(), words.next()),
        (Some("set"), Some("editing-mode"), Some("vi"))
    )
}
