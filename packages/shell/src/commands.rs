//! Shell command parsing and execution.
//!
//! Commands:
//! - `mkdir <name>` / `touch <name>` - Create a directory / file in the current directory
//! - `cd [path]` - Change the current directory (`..` for the parent, none for the root)
//! - `ls [path]` - List a directory
//! - `pwd` - Print the current directory
//! - `tree` - List everything below the current directory
//! - `cat <path>` - Print a file
//! - `write <path> <text>` / `append <path> <text>` - Replace / extend a file
//! - `rm <name>` - Remove a child of the current directory
//! - `stat <path>` - Show attributes as JSON
//! - `copyFromHost <src> <dst>` - Copy a host file into the current directory
//! - `index` - Show the layout of the current directory's index
//! - `help` - Show help
//! - `exit` - Exit the shell

use std::path::Path;

use kfs_core::EntryKind;
use nu_ansi_term::{Color, Style};

use crate::shell_context::ShellContext;

/// Result of executing a command
pub enum CommandResult {
    /// Command succeeded, optionally with output to display
    Ok { display: Option<String> },
    /// Command failed with an error message
    Error(String),
    /// User requested to exit
    Exit,
    /// Show help
    Help,
}

impl CommandResult {
    fn ok_display(display: impl Into<String>) -> Self {
        CommandResult::Ok {
            display: Some(display.into()),
        }
    }

    fn ok_none() -> Self {
        CommandResult::Ok { display: None }
    }
}

/// Parse and execute a command
pub fn execute(input: &str, ctx: &mut ShellContext) -> CommandResult {
    let input = input.trim();

    if input.is_empty() {
        return CommandResult::ok_none();
    }

    let mut parts = input.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    match command.to_lowercase().as_str() {
        "help" | "?" => CommandResult::Help,
        "exit" | "quit" | "q" => CommandResult::Exit,
        "mkdir" => cmd_make("mkdir", args, EntryKind::Directory, ctx),
        "touch" => cmd_make("touch", args, EntryKind::File, ctx),
        "cd" => cmd_cd(args, ctx),
        "ls" => cmd_ls(args, ctx),
        "pwd" => cmd_pwd(ctx),
        "tree" => cmd_tree(ctx),
        "cat" => cmd_cat(args, ctx),
        "write" => cmd_write("write", args, false, ctx),
        "append" => cmd_write("append", args, true, ctx),
        "rm" => cmd_rm(args, ctx),
        "stat" => cmd_stat(args, ctx),
        "copyfromhost" | "import" => cmd_import(args, ctx),
        "index" => cmd_index(ctx),
        _ => CommandResult::Error(format!(
            "Unknown command: '{}'. Type 'help' for available commands.",
            command
        )),
    }
}

/// Format help text
pub fn format_help() -> String {
    let cmd_style = Style::new().bold().fg(Color::Cyan);
    let arg_style = Style::new().fg(Color::Yellow);
    let desc_style = Style::new().fg(Color::White);

    let mut help = String::new();
    help.push_str(&format!(
        "{}\n\n",
        Style::new().bold().paint("KFS Shell Commands")
    ));

    let commands = [
        ("mkdir", "<name>", "Create a directory in the current directory"),
        ("touch", "<name>", "Create an empty file in the current directory"),
        ("cd", "[path]", "Change directory (.. for parent, no path for /)"),
        ("ls", "[path]", "List a directory"),
        ("pwd", "", "Print the current directory"),
        ("tree", "", "List everything below the current directory"),
        ("", "", ""),
        ("cat", "<path>", "Print a file"),
        ("write", "<path> <text>", "Replace a file's contents, creating it if needed"),
        ("append", "<path> <text>", "Add text to the end of a file"),
        ("rm", "<name>", "Remove an entry from the current directory"),
        ("stat", "<path>", "Show attributes"),
        ("copyFromHost", "<src> <dst>", "Copy a host file in (alias: import)"),
        ("index", "", "Show the current directory's index layout"),
        ("", "", ""),
        ("help", "", "Show this help message"),
        ("exit", "", "Exit the shell (alias: quit, q)"),
    ];

    for (cmd, args, desc) in commands {
        if cmd.is_empty() {
            help.push('\n');
        } else {
            help.push_str(&format!(
                "  {:<14} {:<16} {}\n",
                cmd_style.paint(cmd),
                arg_style.paint(args),
                desc_style.paint(desc)
            ));
        }
    }

    help.push_str(&format!("\n{}\n", Style::new().bold().paint("Paths")));
    help.push_str(&format!(
        "  Paths starting with {} resolve from the root, others from the current directory.\n",
        arg_style.paint("/")
    ));

    help
}

fn cmd_make(name: &str, args: &str, kind: EntryKind, ctx: &mut ShellContext) -> CommandResult {
    if args.is_empty() {
        return usage(name, "<name>");
    }
    match ctx.make(args, kind) {
        Ok(_) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(format!("{}: {}", name, e)),
    }
}

fn cmd_cd(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let target = if args.is_empty() { None } else { Some(args) };
    match ctx.change_dir(target) {
        Ok(()) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(format!("cd: {}", e)),
    }
}

fn cmd_ls(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let target = if args.is_empty() { None } else { Some(args) };
    match ctx.list(target) {
        Ok(names) => CommandResult::ok_display(names.join("\n")),
        Err(e) => CommandResult::Error(format!("ls: {}", e)),
    }
}

fn cmd_pwd(ctx: &mut ShellContext) -> CommandResult {
    CommandResult::ok_display(ctx.current_path())
}

fn cmd_tree(ctx: &mut ShellContext) -> CommandResult {
    match ctx.tree() {
        Ok(paths) => CommandResult::ok_display(paths.join("\n")),
        Err(e) => CommandResult::Error(format!("tree: {}", e)),
    }
}

fn cmd_cat(args: &str, ctx: &mut ShellContext) -> CommandResult {
    if args.is_empty() {
        return usage("cat", "<path>");
    }
    match ctx.read_text(args) {
        Ok(text) => CommandResult::ok_display(text),
        Err(e) => CommandResult::Error(format!("cat: {}", e)),
    }
}

fn cmd_write(name: &str, args: &str, append: bool, ctx: &mut ShellContext) -> CommandResult {
    let Some((path, text)) = split_first_arg(args) else {
        return usage(name, "<path> <text>");
    };
    match ctx.write_text(path, text, append) {
        Ok(written) => CommandResult::ok_display(format!(
            "{} {} bytes",
            Color::Green.paint("wrote"),
            written
        )),
        Err(e) => CommandResult::Error(format!("{}: {}", name, e)),
    }
}

fn cmd_rm(args: &str, ctx: &mut ShellContext) -> CommandResult {
    if args.is_empty() {
        return usage("rm", "<name>");
    }
    match ctx.remove(args) {
        Ok(_) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(format!("rm: {}", e)),
    }
}

fn cmd_stat(args: &str, ctx: &mut ShellContext) -> CommandResult {
    if args.is_empty() {
        return usage("stat", "<path>");
    }
    let stat = match ctx.stat(args) {
        Ok(stat) => stat,
        Err(e) => return CommandResult::Error(format!("stat: {}", e)),
    };
    match serde_json::to_string_pretty(&stat) {
        Ok(json) => CommandResult::ok_display(json),
        Err(e) => CommandResult::Error(format!("stat: {}", e)),
    }
}

fn cmd_import(args: &str, ctx: &mut ShellContext) -> CommandResult {
    let Some((source, name)) = split_first_arg(args) else {
        return usage("copyFromHost", "<src> <dst>");
    };
    if name.is_empty() {
        return usage("copyFromHost", "<src> <dst>");
    }
    match ctx.import_host_file(Path::new(source), name) {
        Ok(_) => CommandResult::ok_none(),
        Err(e) => CommandResult::Error(format!("copyFromHost: {}", e)),
    }
}

fn cmd_index(ctx: &mut ShellContext) -> CommandResult {
    match ctx.index() {
        Ok(layout) if layout.is_empty() => {
            CommandResult::ok_display(format!("{}", Color::Yellow.paint("(empty)")))
        }
        Ok(layout) => CommandResult::ok_display(layout.trim_end().to_string()),
        Err(e) => CommandResult::Error(format!("index: {}", e)),
    }
}

fn usage(command: &str, args: &str) -> CommandResult {
    CommandResult::Error(format!("usage: {} {}", command, args))
}

/// Split `<first> <rest>` on the first run of whitespace; the rest may be
/// empty but the first argument may not.
fn split_first_arg(args: &str) -> Option<(&str, &str)> {
    if args.is_empty() {
        return None;
    }
    match args.split_once(char::is_whitespace) {
        Some((first, rest)) => Some((first, rest.trim_start())),
        None => Some((args, "")),
    }
}
