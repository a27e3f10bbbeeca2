//! Values exchanged between the shell loop and its host.

/// One line typed at the prompt.
#[derive(Debug, Clone)]
pub struct InputLine {
    pub line: String,
}

/// Ctrl+C or Ctrl+D, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Eof,
}

/// Text for the host to show, tagged with how it should look.
#[derive(Debug, Clone)]
pub struct Output {
    pub text: String,
    pub style: OutputStyle,
}

impl Output {
    fn styled(text: impl Into<String>, style: OutputStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// A command result, printed as is.
    pub fn normal(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Normal)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Error)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Info)
    }

    pub fn banner(text: impl Into<String>) -> Self {
        Self::styled(text, OutputStyle::Banner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// Command output; may already carry ANSI colour.
    Normal,
    /// A failed command; the terminal prefixes it with a red `Error:`.
    Error,
    /// Session notices such as `Goodbye!` and the `^C` hint.
    Info,
    Banner,
}

/// What the prompt shows before the next line.
#[derive(Debug, Clone, Default)]
pub struct PromptConfig {
    /// Absolute path of the current directory.
    pub current_path: String,
    /// Children of the current directory.
    pub entry_count: usize,
}

/// Why [`ShellCore::run`](crate::ShellCore::run) returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// `exit`, `quit` or `q`.
    UserExit,
    /// Ctrl+D, or the input ran out.
    Eof,
}
