//! Permission bit set for NFSv4-style access masks.
//!
//! The mask model follows the GPFS NFSv4 ACL bit table. Many historical
//! names alias onto one bit (`READ_DATA` and `LIST_DIRECTORY` are both the
//! `r` bit); the alias tables below preserve that many-to-one mapping
//! exactly. Only `r`, `w` and `x` are load-bearing for authorization
//! decisions, which is why [`Mask`] renders as a fixed three-character
//! string.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::{DatagateError, Result};

/// Bit set of granted rights.
///
/// Combination is bitwise OR; intersection is bitwise AND. Masks for
/// different principals are never ORed directly: matching happens at the
/// ACE level first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Mask(u16);

impl Mask {
    pub const EMPTY: Mask = Mask(0);

    /// `r`: `READ_DATA` / `LIST_DIRECTORY`.
    pub const READ: Mask = Mask(1);
    /// `w`: `WRITE_DATA` / `ADD_FILE`.
    pub const WRITE: Mask = Mask(1 << 1);
    /// `p`: `APPEND_DATA` / `ADD_SUBDIRECTORY`.
    pub const APPEND: Mask = Mask(1 << 2);
    /// `R`: `READ_NAMED_ATTRS`.
    pub const READ_NAMED_ATTRS: Mask = Mask(1 << 3);
    /// `W`: `WRITE_NAMED_ATTRS`.
    pub const WRITE_NAMED_ATTRS: Mask = Mask(1 << 4);
    /// `x`: `EXECUTE` / `SEARCH_DIRECTORY`.
    pub const EXECUTE: Mask = Mask(1 << 5);
    /// `D`: `DELETE_CHILD`.
    pub const DELETE_CHILD: Mask = Mask(1 << 6);
    /// `a`: `READ_ATTRIBUTES`.
    pub const READ_ATTRIBUTES: Mask = Mask(1 << 7);
    /// `A`: `WRITE_ATTRIBUTES`.
    pub const WRITE_ATTRIBUTES: Mask = Mask(1 << 8);
    /// `d`: `DELETE`.
    pub const DELETE: Mask = Mask(1 << 9);
    /// `c`: `READ_ACL`.
    pub const READ_ACL: Mask = Mask(1 << 10);
    /// `C`: `WRITE_ACL`.
    pub const WRITE_ACL: Mask = Mask(1 << 11);
    /// `o`: `WRITE_OWNER`.
    pub const WRITE_OWNER: Mask = Mask(1 << 12);
    /// `s`: `SYNCHRONIZE`.
    pub const SYNCHRONIZE: Mask = Mask(1 << 13);

    /// Full nominal access used when projecting identities.
    pub const RWX: Mask = Mask(1 | (1 << 1) | (1 << 5));

    /// Look up a single mask letter.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Mask> {
        let mask = match letter {
            'r' => Self::READ,
            'w' => Self::WRITE,
            'p' => Self::APPEND,
            'R' => Self::READ_NAMED_ATTRS,
            'W' => Self::WRITE_NAMED_ATTRS,
            'x' => Self::EXECUTE,
            'D' => Self::DELETE_CHILD,
            'a' => Self::READ_ATTRIBUTES,
            'A' => Self::WRITE_ATTRIBUTES,
            'd' => Self::DELETE,
            'c' => Self::READ_ACL,
            'C' => Self::WRITE_ACL,
            'o' => Self::WRITE_OWNER,
            's' => Self::SYNCHRONIZE,
            _ => return None,
        };
        Some(mask)
    }

    /// Look up a historical bit name. Several names map onto one bit.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Mask> {
        if name.len() == 1 {
            if let Some(mask) = name.chars().next().and_then(Self::from_letter) {
                return Some(mask);
            }
        }
        let mask = match name {
            "READ_DATA" | "LIST_DIRECTORY" => Self::READ,
            "WRITE_DATA" | "ADD_FILE" => Self::WRITE,
            "APPEND_DATA" | "ADD_SUBDIRECTORY" => Self::APPEND,
            "READ_NAMED_ATTRS" => Self::READ_NAMED_ATTRS,
            "WRITE_NAMED_ATTRS" => Self::WRITE_NAMED_ATTRS,
            "EXECUTE" | "SEARCH_DIRECTORY" => Self::EXECUTE,
            "DELETE_CHILD" => Self::DELETE_CHILD,
            "READ_ATTRIBUTES" => Self::READ_ATTRIBUTES,
            "WRITE_ATTRIBUTES" => Self::WRITE_ATTRIBUTES,
            "DELETE" => Self::DELETE,
            "READ_ACL" => Self::READ_ACL,
            "WRITE_ACL" => Self::WRITE_ACL,
            "WRITE_OWNER" => Self::WRITE_OWNER,
            "SYNCHRONIZE" => Self::SYNCHRONIZE,
            "rwx" => Self::RWX,
            _ => return None,
        };
        Some(mask)
    }

    /// Fold a mask-letter string (`rwxc`, `r-x-`, …) into a mask.
    ///
    /// `-` marks an absent bit and is skipped; an all-dash string is the
    /// empty mask. Any letter outside the alias table is a hard error.
    pub fn from_letters(letters: &str) -> Result<Mask> {
        let mut mask = Mask::EMPTY;
        for letter in letters.chars() {
            if letter == '-' {
                continue;
            }
            mask |= Self::from_letter(letter).ok_or_else(|| DatagateError::UnknownMaskLetter {
                letter,
                mask: letters.to_string(),
            })?;
        }
        Ok(mask)
    }

    #[must_use]
    pub fn contains(self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        Mask(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mask {
    fn bitor_assign(&mut self, rhs: Mask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Mask {
    type Output = Mask;

    fn bitand(self, rhs: Mask) -> Mask {
        Mask(self.0 & rhs.0)
    }
}

impl BitAndAssign for Mask {
    fn bitand_assign(&mut self, rhs: Mask) {
        self.0 &= rhs.0;
    }
}

impl fmt::Display for Mask {
    /// Renders exactly three characters in fixed `r`, `w`, `x` order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bit, letter) in [
            (Self::READ, 'r'),
            (Self::WRITE, 'w'),
            (Self::EXECUTE, 'x'),
        ] {
            write!(f, "{}", if self.contains(bit) { letter } else { '-' })?;
        }
        Ok(())
    }
}
