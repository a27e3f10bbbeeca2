use reedline::{Completer, Span, Suggestion};

/// Command completer for the shell
pub struct ShellCompleter {
    commands: Vec<String>,
}

impl ShellCompleter {
    pub fn new() -> Self {
        Self {
            commands: [
                "help",
                "exit",
                "quit",
                "mkdir",
                "touch",
                "cd",
                "ls",
                "pwd",
                "tree",
                "cat",
                "write",
                "append",
                "rm",
                "stat",
                "copyFromHost",
                "import",
                "index",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Default for ShellCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for ShellCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        let line_to_pos = &line[..pos];
        let words: Vec<&str> = line_to_pos.split_whitespace().collect();

        if words.is_empty() || (words.len() == 1 && !line_to_pos.ends_with(' ')) {
            // Completing the command itself
            let prefix = words.first().copied().unwrap_or("");
            let start = line_to_pos.rfind(prefix).unwrap_or(0);

            for cmd in &self.commands {
                if cmd.starts_with(prefix) {
                    suggestions.push(Suggestion {
                        value: cmd.clone(),
                        description: Some(command_description(cmd)),
                        style: None,
                        extra: None,
                        span: Span::new(start, pos),
                        append_whitespace: true,
                        match_indices: None,
                    });
                }
            }
        }

        suggestions
    }
}

fn command_description(cmd: &str) -> String {
    match cmd {
        "help" => "Show help".to_string(),
        "exit" | "quit" => "Exit the shell".to_string(),
        "mkdir" => "Create a directory".to_string(),
        "touch" => "Create an empty file".to_string(),
        "cd" => "Change directory".to_string(),
        "ls" => "List a directory".to_string(),
        "pwd" => "Print working directory".to_string(),
        "tree" => "List everything below here".to_string(),
        "cat" => "Print a file".to_string(),
        "write" => "Replace a file's contents".to_string(),
        "append" => "Add to the end of a file".to_string(),
        "rm" => "Remove an entry".to_string(),
        "stat" => "Show attributes".to_string(),
        "copyFromHost" | "import" => "Copy a host file in".to_string(),
        "index" => "Show the directory index layout".to_string(),
        _ => String::new(),
    }
}
