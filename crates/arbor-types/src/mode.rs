use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// File mode bit-field.
///
/// The low bits carry unix permissions. Bit 31 is reserved to mark a
/// directory; the numeric value is persisted, so the bit position is fixed.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mode(u32);

impl Mode {
    /// The reserved "is directory" bit.
    pub const DIR: u32 = 1 << 31;
    /// Permission bits.
    pub const PERM: u32 = 0o777;

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// A directory mode with the given permission bits.
    pub const fn dir(perm: u32) -> Self {
        Self(Self::DIR | (perm & Self::PERM))
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_dir(&self) -> bool {
        self.0 & Self::DIR != 0
    }

    pub const fn perm(&self) -> u32 {
        self.0 & Self::PERM
    }
}

impl From<u32> for Mode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl From<Mode> for u32 {
    fn from(mode: Mode) -> Self {
        mode.0
    }
}

impl FromStr for Mode {
    type Err = TypeError;

    /// Parse the decimal form used in the triple store.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(Self)
            .map_err(|_| TypeError::InvalidMode(s.to_string()))
    }
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mode({self})")
    }
}

/// `ls`-style rendering, e.g. `drwxr-xr-x`.
impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(10);
        out.push(if self.is_dir() { 'd' } else { '-' });
        for shift in [6u32, 3, 0] {
            let triple = (self.0 >> shift) & 0o7;
            out.push(if triple & 0o4 != 0 { 'r' } else { '-' });
            out.push(if triple & 0o2 != 0 { 'w' } else { '-' });
            out.push(if triple & 0o1 != 0 { 'x' } else { '-' });
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_bit() {
        assert!(Mode::dir(0o755).is_dir());
        assert!(!Mode::new(0o644).is_dir());
        assert!(!Mode::default().is_dir());
    }

    #[test]
    fn dir_bit_value_is_stable() {
        assert_eq!(Mode::DIR, 2_147_483_648);
    }

    #[test]
    fn decimal_parse() {
        let mode: Mode = "2147484141".parse().unwrap();
        assert!(mode.is_dir());
        assert_eq!(mode.perm(), 0o755);
        assert!("rwx".parse::<Mode>().is_err());
    }

    #[test]
    fn display_like_ls() {
        assert_eq!(Mode::dir(0o755).to_string(), "drwxr-xr-x");
        assert_eq!(Mode::new(0o640).to_string(), "-rw-r-----");
    }
}
