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

use std::borrow::Cow;
use std::fmt;
use std::str;

use super::header;
use crate::support::error::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrSpec<'a> {
    pub local: Vec<Cow<'a, [u8]>>,
    pub domain: Vec<Cow<'a, [u8]>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailboxSpec<'a> {
    pub addr: AddrSpec<'a>,
    pub name: Vec<Cow<'a, [u8]>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpec<'a> {
    pub name: Vec<Cow<'a, [u8]>>,
    pub boxes: Vec<MailboxSpec<'a>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Address<'a> {
    Mailbox(MailboxSpec<'a>),
    Group(GroupSpec<'a>),
}

impl<'a> Address<'a> {
    /// Iterate over the mailboxes named by this address, descending into
    /// groups.
    pub fn mailboxes(&self) -> impl Iterator<Item = &MailboxSpec<'a>> {
        let boxes: &[MailboxSpec<'a>] = match *self {
            Address::Mailbox(ref mailbox) => std::slice::from_ref(mailbox),
            Address::Group(ref group) => &group.boxes,
        };
        boxes.iter()
    }
}

/// An email address in normalised `local@domain` form.
///
/// Display names, comments, routing information, and quoting are all
/// stripped away; only the addr-spec survives.
///
/// Equality is ASCII case-insensitive over the whole address. RFC 5321
/// technically allows the local part to be case-sensitive, but no real mail
/// system treats it that way and IMAP clients expect `User@Example.COM` to
/// find mail from `user@example.com`.
#[derive(Clone, Debug)]
pub struct EmailAddress {
    local: String,
    domain: String,
}

impl EmailAddress {
    /// Parse `raw` as a single RFC 5322 mailbox (`user@example.com`, or
    /// `Display Name <user@example.com>`).
    pub fn parse(raw: &str) -> Result<Self, Error> {
        header::parse_mailbox(raw.as_bytes())
            .map(|mailbox| EmailAddress::from(&mailbox.addr))
            .ok_or_else(|| Error::InvalidAddress(raw.to_owned()))
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl<'a, 'b> From<&'b AddrSpec<'a>> for EmailAddress {
    fn from(addr: &'b AddrSpec<'a>) -> Self {
        EmailAddress {
            local: join_dotted(&addr.local),
            domain: join_dotted(&addr.domain),
        }
    }
}

impl PartialEq for EmailAddress {
    fn eq(&self, other: &EmailAddress) -> bool {
        self.local.eq_ignore_ascii_case(&other.local)
            && self.domain.eq_ignore_ascii_case(&other.domain)
    }
}

impl Eq for EmailAddress {}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

fn join_dotted(parts: &[Cow<'_, [u8]>]) -> String {
    let mut out = String::new();
    for (ix, part) in parts.iter().enumerate() {
        if 0 != ix {
            out.push('.');
        }
        out.push_str(&String::from_utf8_lossy(part));
    }
    out
}
