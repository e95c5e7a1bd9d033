//-
// Copyright (c) 2020, Jason Lingle
//
// This file is part of Crysearch.
//
// Crysearch is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Crysearch is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Crysearch. If not, see <http://www.gnu.org/licenses/>.

use std::fmt;
use std::num::NonZeroU32;

use bitflags::bitflags;

/// Uniquely identifies a message within a single mailbox.
///
/// UIDs start at 1 and increase monotonically as messages are added to the
/// mailbox. The message store assigns them; this crate only compares them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(pub NonZeroU32);

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Uid({})", self.0.get())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.get())
    }
}

impl Uid {
    // Unsafe because new() isn't const for some reason
    pub const MIN: Self = unsafe { Uid(NonZeroU32::new_unchecked(1)) };
    pub const MAX: Self = unsafe { Uid(NonZeroU32::new_unchecked(u32::MAX)) };

    pub fn of(uid: u32) -> Option<Self> {
        NonZeroU32::new(uid).map(Uid)
    }

    #[cfg(test)]
    pub fn u(uid: u32) -> Self {
        Uid::of(uid).unwrap()
    }
}

impl From<Uid> for u32 {
    fn from(uid: Uid) -> u32 {
        uid.0.get()
    }
}

bitflags! {
    /// The system flags set on a message.
    ///
    /// `RECENT` is included here even though clients cannot set it, since
    /// `NEW`, `OLD`, and `RECENT` all search on it.
    #[derive(Default)]
    pub struct SystemFlags: u8 {
        const ANSWERED = 1 << 0;
        const DELETED = 1 << 1;
        const DRAFT = 1 << 2;
        const FLAGGED = 1 << 3;
        const RECENT = 1 << 4;
        const SEEN = 1 << 5;
    }
}

/// A message flag.
///
/// System flags are represented as top-level enum values. Keywords are in the
/// `Keyword` case.
///
/// The `Display` format of this type is the exact string value that would be
/// sent over the wire.
///
/// Keywords compare case-sensitively; `$Important` and `$important` are
/// different keywords as far as searching is concerned.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Flag {
    Answered,
    Deleted,
    Draft,
    Flagged,
    Recent,
    Seen,
    Keyword(String),
}

impl Flag {
    /// If this is a system flag, return its bit in `SystemFlags`.
    pub fn system_bit(&self) -> Option<SystemFlags> {
        match *self {
            Flag::Answered => Some(SystemFlags::ANSWERED),
            Flag::Deleted => Some(SystemFlags::DELETED),
            Flag::Draft => Some(SystemFlags::DRAFT),
            Flag::Flagged => Some(SystemFlags::FLAGGED),
            Flag::Recent => Some(SystemFlags::RECENT),
            Flag::Seen => Some(SystemFlags::SEEN),
            Flag::Keyword(..) => None,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Flag::Answered => write!(f, "\\Answered"),
            &Flag::Deleted => write!(f, "\\Deleted"),
            &Flag::Draft => write!(f, "\\Draft"),
            &Flag::Flagged => write!(f, "\\Flagged"),
            &Flag::Recent => write!(f, "\\Recent"),
            &Flag::Seen => write!(f, "\\Seen"),
            &Flag::Keyword(ref kw) => write!(f, "{}", kw),
        }
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        <Flag as fmt::Display>::fmt(self, f)
    }
}

/// The addressing header a message address was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressRole {
    From,
    To,
    Cc,
    Bcc,
}

impl AddressRole {
    pub const ALL: [AddressRole; 4] = [
        AddressRole::From,
        AddressRole::To,
        AddressRole::Cc,
        AddressRole::Bcc,
    ];

    /// The name of the RFC 5322 header carrying addresses of this role.
    pub fn header_name(self) -> &'static str {
        match self {
            AddressRole::From => "From",
            AddressRole::To => "To",
            AddressRole::Cc => "Cc",
            AddressRole::Bcc => "Bcc",
        }
    }

    /// Determine the role of the header named `name`, if it is an addressing
    /// header at all.
    pub fn for_header(name: &str) -> Option<Self> {
        AddressRole::ALL
            .iter()
            .copied()
            .find(|role| role.header_name().eq_ignore_ascii_case(name))
    }
}
