use std::path::PathBuf;

use clap::Parser;
use kfs_bridge::Credentials;
use kfs_shell::host::terminal::EDIT_MODE_ENV;
use kfs_shell::logging::init_logging;
use kfs_shell::{ShellContext, ShellError};

/// kfs - Interactive shell over an in-memory filesystem
#[derive(Parser, Debug)]
#[command(name = "kfs")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Force vi editing mode
    #[arg(long, conflicts_with = "emacs")]
    vi: bool,

    /// Force emacs editing mode
    #[arg(long)]
    emacs: bool,

    /// Owner uid for the root and new entries (default: the current user)
    #[arg(long)]
    uid: Option<u32>,

    /// Owner gid for the root and new entries (default: the current group)
    #[arg(long)]
    gid: Option<u32>,

    /// Host file to copy into the root at startup; may be repeated
    #[arg(long = "import", value_name = "HOSTFILE")]
    import: Vec<PathBuf>,

    /// Log level or filter directive, overridden by KFS_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if args.vi {
        std::env::set_var(EDIT_MODE_ENV, "vi");
    } else if args.emacs {
        std::env::set_var(EDIT_MODE_ENV, "emacs");
    }

    if let Err(e) = start(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn start(args: Args) -> Result<(), ShellError> {
    init_logging(args.log_level.as_deref(), args.log_file.as_deref())?;

    let current = Credentials::current();
    let owner = Credentials::new(
        args.uid.unwrap_or(current.uid),
        args.gid.unwrap_or(current.gid),
    );

    let mut ctx = ShellContext::with_owner(owner);
    for source in &args.import {
        ctx.import_host_file_named(source)?;
    }

    kfs_shell::run(ctx)?;
    Ok(())
}
