//! Requester identity and permission checks.

use std::fmt;
use std::ops::BitOr;

use kfs_core::FileMode;
use serde::{Deserialize, Serialize};

/// Bits a caller asks for when opening or probing an entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessMask(u32);

impl AccessMask {
    /// Existence only.
    pub const F_OK: Self = Self(0);
    pub const X_OK: Self = Self(1);
    pub const W_OK: Self = Self(2);
    pub const R_OK: Self = Self(4);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0o7)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_existence_only(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AccessMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for AccessMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_existence_only() {
            return write!(f, "F_OK");
        }
        let names: Vec<&str> = [(Self::R_OK, "R_OK"), (Self::W_OK, "W_OK"), (Self::X_OK, "X_OK")]
            .into_iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| name)
            .collect();
        write!(f, "{}", names.join("|"))
    }
}

/// The uid/gid operations are performed on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub uid: u32,
    pub gid: u32,
}

impl Credentials {
    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Real uid/gid of the running process; 0/0 where there is no such
    /// notion.
    pub fn current() -> Self {
        #[cfg(unix)]
        {
            // SAFETY: getuid and getgid cannot fail and touch no memory
            let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
            Self::new(uid, gid)
        }
        #[cfg(not(unix))]
        {
            Self::new(0, 0)
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::current()
    }
}

/// Whether `requester` may access an entry owned by `uid`/`gid` with `mode`.
///
/// Exactly one permission triplet applies: the owner's when the uids match,
/// else the group's when the gids match, else everyone else's. Every
/// requested bit must be set in that triplet. An existence-only mask always
/// passes.
pub fn check_access(
    requester: Credentials,
    uid: u32,
    gid: u32,
    mode: FileMode,
    mask: AccessMask,
) -> bool {
    if mask.is_existence_only() {
        return true;
    }

    let granted = if requester.uid == uid {
        mode.owner()
    } else if requester.gid == gid {
        mode.group()
    } else {
        mode.other()
    };

    AccessMask::from_bits(granted).contains(mask)
}
