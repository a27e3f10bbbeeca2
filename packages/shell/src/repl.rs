//! Platform-independent shell loop.
//!
//! The loop talks to its environment only through the `IoHost` trait, so the
//! terminal and the in-memory test host drive the same code.

use crate::commands::{self, CommandResult};
use crate::io::{ExitReason, IoError, IoHost, Output, PromptConfig, Signal};
use crate::shell_context::ShellContext;

/// The platform-independent shell core.
pub struct ShellCore {
    ctx: ShellContext,
}

impl ShellCore {
    /// A shell over a fresh, empty tree.
    pub fn new() -> Self {
        Self::with_context(ShellContext::new())
    }

    /// A shell over an existing context, e.g. one with host files already
    /// imported.
    pub fn with_context(ctx: ShellContext) -> Self {
        Self { ctx }
    }

    /// Run the shell loop, reading/writing through the provided I/O host.
    ///
    /// Returns the reason for exiting.
    pub fn run(&mut self, io: &mut impl IoHost) -> Result<ExitReason, IoError> {
        io.write_output(Output::banner(BANNER))?;

        loop {
            self.update_prompt(io)?;

            io.wait_for_input()?;

            // Signals take priority over buffered input
            if let Some(signal) = io.read_signal()? {
                match signal {
                    Signal::Eof => {
                        io.write_output(Output::info("Goodbye!"))?;
                        io.flush()?;
                        return Ok(ExitReason::Eof);
                    }
                    Signal::Interrupt => {
                        io.write_output(Output::info("^C (use 'exit' to quit)"))?;
                        continue;
                    }
                }
            }

            let input = match io.read_input()? {
                Some(input) => input,
                None => continue,
            };

            match commands::execute(&input.line, &mut self.ctx) {
                CommandResult::Ok { display: None } => {}
                CommandResult::Ok {
                    display: Some(output),
                } => {
                    io.write_output(Output::normal(output))?;
                }
                CommandResult::Error(msg) => {
                    io.write_output(Output::error(msg))?;
                }
                CommandResult::Help => {
                    io.write_output(Output::normal(commands::format_help()))?;
                }
                CommandResult::Exit => {
                    io.write_output(Output::info("Goodbye!"))?;
                    io.flush()?;
                    return Ok(ExitReason::UserExit);
                }
            }

            io.flush()?;
        }
    }

    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut ShellContext {
        &mut self.ctx
    }

    pub fn into_context(self) -> ShellContext {
        self.ctx
    }

    fn update_prompt(&self, io: &mut impl IoHost) -> Result<(), IoError> {
        let entry_count = self
            .ctx
            .fs()
            .dir(self.ctx.cwd())
            .map(|dir| dir.len())
            .unwrap_or(0);

        io.write_prompt(PromptConfig {
            current_path: self.ctx.current_path(),
            entry_count,
        })
    }
}

impl Default for ShellCore {
    fn default() -> Self {
        Self::new()
    }
}

const BANNER: &str = r#"
 _  _______ ____
| |/ /  ___/ ___|
| ' /| |_  \___ \
| . \|  _|  ___) |
|_|\_\_|   |____/

Type 'help' for available commands, 'exit' to quit.
"#;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::io::{OutputStyle, TestHost};

    fn run_script(lines: &[&str]) -> (ShellCore, TestHost, ExitReason) {
        let mut core = ShellCore::new();
        let mut host = TestHost::with_inputs(lines.iter().copied());
        let reason = core.run(&mut host).unwrap();
        (core, host, reason)
    }

    #[test]
    fn test_exit_command() {
        let (_, host, reason) = run_script(&["exit"]);
        assert_eq!(reason, ExitReason::UserExit);
        assert!(host.output_text().contains("Goodbye"));
    }

    #[test]
    fn test_banner_first() {
        let (_, host, _) = run_script(&["exit"]);
        assert_eq!(host.output()[0].style, OutputStyle::Banner);
    }

    #[test]
    fn test_eof_when_script_runs_out() {
        let (_, host, reason) = run_script(&["mkdir a"]);
        assert_eq!(reason, ExitReason::Eof);
        assert!(host.output_text().contains("Goodbye"));
    }

    #[test]
    fn test_eof_signal() {
        let mut core = ShellCore::new();
        let mut host = TestHost::with_inputs(["mkdir never"]);
        host.queue_signal(Signal::Eof);

        assert_eq!(core.run(&mut host).unwrap(), ExitReason::Eof);
        assert!(host.has_pending_input());
        assert!(core.context().resolve_path("never").is_none());
    }

    #[test]
    fn test_interrupt_continues() {
        let mut core = ShellCore::new();
        let mut host = TestHost::with_inputs(["exit"]);
        host.queue_signal(Signal::Interrupt);

        assert_eq!(core.run(&mut host).unwrap(), ExitReason::UserExit);
        assert!(host.output_text().contains("^C"));
    }

    #[test]
    fn test_create_write_and_read_back() {
        let (_, host, _) = run_script(&[
            "mkdir docs",
            "cd docs",
            "touch readme",
            "write readme hello",
            "cat readme",
            "ls",
            "exit",
        ]);
        assert!(host.errors().is_empty(), "errors: {:?}", host.errors());
        let results = host.results();
        assert!(results.contains(&"hello"));
        assert!(results.contains(&".\n..\nreadme"));
    }

    #[test]
    fn test_prompt_follows_cd() {
        let (_, host, _) = run_script(&["mkdir a", "cd a", "cd ..", "exit"]);
        assert_eq!(host.prompt_paths(), vec!["/", "/", "/a", "/"]);
    }

    #[test]
    fn test_prompt_counts_children() {
        let (_, host, _) = run_script(&["touch x", "touch y", "exit"]);
        assert_eq!(host.last_prompt().unwrap().entry_count, 2);
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let (core, host, reason) =
            run_script(&["cat missing", "mkdir a", "mkdir a", "cd nowhere", "mkdir b"]);
        assert_eq!(reason, ExitReason::Eof);
        assert_eq!(host.errors().len(), 3);
        assert!(host.errors()[1].contains("already exists"));
        assert!(core.context().resolve_path("/b").is_some());
    }

    #[test]
    fn test_rm_removes_subtree() {
        let (core, host, _) = run_script(&["mkdir a", "cd a", "touch f", "cd ..", "rm a", "ls"]);
        assert!(host.results().contains(&".\n.."));
        assert_eq!(core.context().fs().len(), 1);
    }

    #[test]
    fn test_stat_outputs_json() {
        let (_, host, _) = run_script(&["mkdir d", "stat d"]);
        let json = host.results()[0];
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["kind"], "directory");
        assert_eq!(value["permissions"], "drwxr-xr-x");
    }

    #[test]
    fn test_copy_from_host() {
        let mut host_file = tempfile::NamedTempFile::new().unwrap();
        host_file.write_all(b"copied bytes").unwrap();
        let src = host_file.path().display().to_string();

        let copy = format!("copyFromHost {} copy", src);
        let (_, host, _) = run_script(&[copy.as_str(), "cat copy"]);
        assert!(host.errors().is_empty(), "errors: {:?}", host.errors());
        assert!(host.results().contains(&"copied bytes"));
    }

    #[test]
    fn test_copy_from_missing_host_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").display().to_string();

        let copy = format!("import {} x", missing);
        let (core, host, _) = run_script(&[copy.as_str()]);
        assert!(host.errors()[0].contains("cannot read host file"));
        assert!(core.context().resolve_path("x").is_none());
    }

    #[test]
    fn test_index_shows_balanced_layout() {
        let (_, host, _) = run_script(&["touch a", "touch b", "touch c", "index"]);
        let layout = host.results()[0];
        let root_line = layout.lines().find(|l| l.starts_with(" <")).unwrap();
        assert!(root_line.starts_with(" <b:"));
    }

    #[test]
    fn test_help_output() {
        let (_, host, _) = run_script(&["help"]);
        assert!(host.results()[0].contains("copyFromHost"));
    }

    #[test]
    fn test_flushes_after_each_command() {
        let (_, host, _) = run_script(&["pwd", "pwd", "exit"]);
        // two commands plus the exit
        assert_eq!(host.flush_count(), 3);
    }
}
