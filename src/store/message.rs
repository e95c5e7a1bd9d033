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

//! The view of a stored message that search terms evaluate against.

use std::collections::BTreeSet;

use super::model::*;
use crate::mime::header;
use crate::mime::model::EmailAddress;

/// Everything a search term may ask of a message.
///
/// Implementations must answer from data already in memory; evaluation never
/// performs I/O.
pub trait SearchableMessage {
    /// The UID of the message, if the store assigns UIDs.
    fn uid(&self) -> Option<Uid>;

    /// The system flags currently set on the message, including `\Recent`.
    fn system_flags(&self) -> SystemFlags;

    /// Whether the keyword `keyword` is set on the message.
    ///
    /// The comparison is exact.
    fn has_keyword(&self, keyword: &str) -> bool;

    /// All values of the header named `name`, in message order.
    ///
    /// Header names are matched case-insensitively. An empty result means the
    /// header is absent.
    fn header_values(&self, name: &str) -> Vec<&str>;

    /// The addresses found in the header corresponding to `role`.
    fn addresses(&self, role: AddressRole) -> &[EmailAddress];

    /// Whether `flag` is set on the message.
    fn has_flag(&self, flag: &Flag) -> bool {
        match flag.system_bit() {
            Some(bit) => self.system_flags().contains(bit),
            None => match *flag {
                Flag::Keyword(ref kw) => self.has_keyword(kw),
                _ => false,
            },
        }
    }

    /// A short name for the message suitable for log messages.
    fn log_name(&self) -> String {
        match self.uid() {
            Some(uid) => format!("UID {}", uid),
            None => self
                .header_values("Message-ID")
                .first()
                .map_or_else(|| "<no Message-ID>".to_owned(), |id| {
                    (*id).to_owned()
                }),
        }
    }
}

/// A fully in-memory message.
///
/// This is what the command-line front end loads message files into, and
/// what tests build by hand.
#[derive(Clone, Debug, Default)]
pub struct SimpleMessage {
    uid: Option<Uid>,
    system_flags: SystemFlags,
    keywords: BTreeSet<String>,
    headers: Vec<(String, String)>,
    from: Vec<EmailAddress>,
    to: Vec<EmailAddress>,
    cc: Vec<EmailAddress>,
    bcc: Vec<EmailAddress>,
}

impl SimpleMessage {
    /// Create a message with no UID, flags, or headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a message from the header block of the raw RFC 5322 message
    /// `raw`.
    ///
    /// The body is ignored. Addressing headers that cannot be parsed
    /// contribute no addresses but are still available as plain headers.
    pub fn parse(raw: &[u8]) -> Self {
        let mut this = Self::new();
        for (name, value) in header::parse_header_block(raw) {
            this.push_header(name, value);
        }
        this
    }

    pub fn with_uid(mut self, uid: Uid) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.set_flag(flag);
        self
    }

    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.push_header(name.into(), value.into());
        self
    }

    pub fn set_uid(&mut self, uid: Option<Uid>) {
        self.uid = uid;
    }

    pub fn set_flag(&mut self, flag: Flag) {
        match flag.system_bit() {
            Some(bit) => self.system_flags |= bit,
            None => {
                if let Flag::Keyword(kw) = flag {
                    self.keywords.insert(kw);
                }
            }
        }
    }

    /// Append a header. Addressing headers also have their addresses parsed
    /// into the corresponding role.
    pub fn push_header(&mut self, name: String, value: String) {
        if let Some(role) = AddressRole::for_header(&name) {
            let parsed = header::parse_address_list(value.as_bytes())
                .unwrap_or_else(Vec::new);
            let dst = self.addresses_mut(role);
            for address in &parsed {
                dst.extend(
                    address.mailboxes().map(|m| EmailAddress::from(&m.addr)),
                );
            }
        }

        self.headers.push((name, value));
    }

    fn addresses_mut(&mut self, role: AddressRole) -> &mut Vec<EmailAddress> {
        match role {
            AddressRole::From => &mut self.from,
            AddressRole::To => &mut self.to,
            AddressRole::Cc => &mut self.cc,
            AddressRole::Bcc => &mut self.bcc,
        }
    }
}

impl SearchableMessage for SimpleMessage {
    fn uid(&self) -> Option<Uid> {
        self.uid
    }

    fn system_flags(&self) -> SystemFlags {
        self.system_flags
    }

    fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword)
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|&&(ref n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, ref v)| v.as_str())
            .collect()
    }

    fn addresses(&self, role: AddressRole) -> &[EmailAddress] {
        match role {
            AddressRole::From => &self.from,
            AddressRole::To => &self.to,
            AddressRole::Cc => &self.cc,
            AddressRole::Bcc => &self.bcc,
        }
    }
}
