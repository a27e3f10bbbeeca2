use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

/// Syntax highlighter for the shell
pub struct ShellHighlighter {
    commands: Vec<&'static str>,
}

impl ShellHighlighter {
    pub fn new() -> Self {
        Self {
            commands: vec![
                "help", "?", "exit", "quit", "q", "mkdir", "touch", "cd", "ls", "pwd", "tree",
                "cat", "write", "append", "rm", "stat", "copyfromhost", "import", "index",
            ],
        }
    }
}

impl Default for ShellHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for ShellHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        if line.is_empty() {
            return styled;
        }

        let (command, rest) = match line.find(char::is_whitespace) {
            Some(pos) => (&line[..pos], &line[pos..]),
            None => (line, ""),
        };

        let cmd_lower = command.to_lowercase();
        let cmd_style = if self.commands.contains(&cmd_lower.as_str()) {
            Style::new().bold().fg(Color::Cyan)
        } else {
            Style::new().fg(Color::Red)
        };
        styled.push((cmd_style, command.to_string()));

        if rest.is_empty() {
            return styled;
        }

        match cmd_lower.as_str() {
            "write" | "append" => {
                // The path is the first word; whatever follows is literal text
                let trimmed = rest.trim_start();
                let path_end = rest.len() - trimmed.len()
                    + trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
                let (path, text) = rest.split_at(path_end);

                styled.push((Style::new().fg(Color::Yellow), path.to_string()));
                if !text.is_empty() {
                    styled.push((Style::new().fg(Color::Green), text.to_string()));
                }
            }
            "mkdir" | "touch" | "cd" | "ls" | "cat" | "rm" | "stat" | "copyfromhost"
            | "import" => {
                styled.push((Style::new().fg(Color::Yellow), rest.to_string()));
            }
            _ => {
                styled.push((Style::new(), rest.to_string()));
            }
        }

        styled
    }
}
