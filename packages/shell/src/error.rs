//! Errors surfaced by the shell outside of individual commands.

use std::path::PathBuf;

use kfs_core::FsError;

use crate::io::IoError;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("cannot read host file {}: {source}", path.display())]
    HostRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] IoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_read_names_the_file() {
        let err = ShellError::HostRead {
            path: PathBuf::from("/tmp/missing.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot read host file /tmp/missing.txt: gone");
    }

    #[test]
    fn fs_errors_pass_through() {
        let err: ShellError = FsError::not_found("/x").into();
        assert_eq!(err.to_string(), "no such file or directory: /x");
    }
}
