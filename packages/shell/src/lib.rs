//! # kfs-shell
//!
//! An interactive shell over the in-memory filesystem.
//!
//! The shell keeps its own current directory and resolves relative paths
//! against it; the tree itself has no notion of one.
//!
//! ## Features
//!
//! - Create, list, read, write and remove entries
//! - Copy host files into the tree
//! - Tab completion for commands and highlighting of arguments
//! - Vi mode support (detected from EDITOR, .inputrc, or KFS_EDIT_MODE)
//! - Command history
//!
//! ## Usage
//!
//! ```bash
//! kfs --import notes.txt
//!
//! # Inside the shell:
//! $ mkdir docs
//! $ cd docs
//! $ write readme hello
//! $ cat readme
//! $ tree
//! ```

pub mod commands;
pub mod completer;
pub mod error;
pub mod highlighter;
pub mod host;
pub mod io;
pub mod logging;
pub mod repl;
pub mod shell_context;

pub use error::ShellError;
pub use io::ExitReason;
pub use repl::ShellCore;
pub use shell_context::{ShellContext, Stat};

use tracing::info;

use crate::host::TerminalHost;

/// Run the shell on the terminal until the user exits.
pub fn run(ctx: ShellContext) -> Result<ExitReason, ShellError> {
    info!(
        uid = ctx.owner().uid,
        gid = ctx.owner().gid,
        entries = ctx.fs().len(),
        "starting shell"
    );
    let mut host = TerminalHost::new()?;
    let mut shell = ShellCore::with_context(ctx);
    let reason = shell.run(&mut host)?;
    info!(?reason, "shell exited");
    Ok(reason)
}
