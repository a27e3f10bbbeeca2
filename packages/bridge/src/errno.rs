//! POSIX error numbers for [`FsError`].

use kfs_core::FsError;

pub use libc::{EACCES, EEXIST, EINVAL, EISDIR, ENOENT, ENOTDIR, ENOTEMPTY};

/// Maps filesystem errors onto the numbers a kernel bridge reports.
pub trait ErrnoExt {
    /// Positive error number.
    fn errno(&self) -> i32;

    /// Negated error number, the form bridge callbacks return.
    fn neg_errno(&self) -> i32 {
        -self.errno()
    }
}

impl ErrnoExt for FsError {
    fn errno(&self) -> i32 {
        match self {
            FsError::NotFound { .. } => ENOENT,
            FsError::NotADirectory { .. } => ENOTDIR,
            FsError::NotAFile { .. } => EISDIR,
            FsError::AlreadyExists { .. } => EEXIST,
            FsError::PermissionDenied { .. } => EACCES,
            FsError::NotEmpty { .. } => ENOTEMPTY,
            FsError::InvalidArgument { .. } => EINVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_variant_has_its_number() {
        let path = || "/x".to_string();
        assert_eq!(FsError::not_found("/x").errno(), ENOENT);
        assert_eq!(FsError::NotADirectory { path: path() }.errno(), ENOTDIR);
        assert_eq!(FsError::NotAFile { path: path() }.errno(), EISDIR);
        assert_eq!(FsError::AlreadyExists { path: path() }.errno(), EEXIST);
        assert_eq!(FsError::PermissionDenied { path: path() }.errno(), EACCES);
        assert_eq!(FsError::NotEmpty { path: path() }.errno(), ENOTEMPTY);
        assert_eq!(FsError::invalid("bad").errno(), EINVAL);
    }

    #[test]
    fn negated_form() {
        assert_eq!(FsError::not_found("/x").neg_errno(), -ENOENT);
        assert!(FsError::invalid("bad").neg_errno() < 0);
    }
}
