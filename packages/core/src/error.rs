//! Error taxonomy for filesystem operations.
//!
//! Lookups never fail with an error: a path or name that does not resolve is
//! `None`. Errors are reserved for operations that were asked to do something
//! the tree cannot do.

/// Errors raised by filesystem operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    /// The path did not resolve to an entry.
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    /// A directory-only operation was applied to a file.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// A file-only operation was applied to a directory.
    #[error("not a file: {path}")]
    NotAFile { path: String },

    /// A create-style operation found its target already present.
    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    /// The requester lacks the permission bits the operation needs.
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// A directory removal found children still attached.
    #[error("directory not empty: {path}")]
    NotEmpty { path: String },

    /// The caller passed something the operation cannot accept.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl FsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        FsError::NotFound { path: path.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        FsError::InvalidArgument {
            message: message.into(),
        }
    }

    /// True for the two wrong-kind variants.
    pub fn is_wrong_kind(&self) -> bool {
        matches!(self, FsError::NotADirectory { .. } | FsError::NotAFile { .. })
    }
}

pub type Result<T, E = FsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_path() {
        let e = FsError::not_found("/a/b");
        assert_eq!(e.to_string(), "no such file or directory: /a/b");

        let e = FsError::AlreadyExists {
            path: "/a".to_string(),
        };
        assert!(e.to_string().contains("/a"));
    }

    #[test]
    fn invalid_argument_display() {
        let e = FsError::invalid("empty name");
        assert_eq!(e.to_string(), "invalid argument: empty name");
    }

    #[test]
    fn wrong_kind_classification() {
        assert!(FsError::NotAFile {
            path: "/".to_string()
        }
        .is_wrong_kind());
        assert!(FsError::NotADirectory {
            path: "/f".to_string()
        }
        .is_wrong_kind());
        assert!(!FsError::not_found("/x").is_wrong_kind());
    }
}
