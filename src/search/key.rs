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

//! The SEARCH key vocabulary.

use std::fmt;
use std::str::FromStr;

use crate::support::error::Error;

/// A search key from the IMAP `SEARCH` grammar.
///
/// Only the keys listed here are supported. In particular, there is no `OR`,
/// `NOT`, date, size, or body text searching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SearchKey {
    All,
    Answered,
    Bcc,
    Cc,
    Deleted,
    Draft,
    Flagged,
    From,
    Header,
    Keyword,
    New,
    Old,
    Recent,
    Seen,
    Subject,
    To,
    Uid,
    Unanswered,
    Undeleted,
    Undraft,
    Unflagged,
    Unkeyword,
    Unseen,
}

impl SearchKey {
    pub const ALL_KEYS: [SearchKey; 23] = [
        SearchKey::All,
        SearchKey::Answered,
        SearchKey::Bcc,
        SearchKey::Cc,
        SearchKey::Deleted,
        SearchKey::Draft,
        SearchKey::Flagged,
        SearchKey::From,
        SearchKey::Header,
        SearchKey::Keyword,
        SearchKey::New,
        SearchKey::Old,
        SearchKey::Recent,
        SearchKey::Seen,
        SearchKey::Subject,
        SearchKey::To,
        SearchKey::Uid,
        SearchKey::Unanswered,
        SearchKey::Undeleted,
        SearchKey::Undraft,
        SearchKey::Unflagged,
        SearchKey::Unkeyword,
        SearchKey::Unseen,
    ];

    /// The keyword as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            SearchKey::All => "ALL",
            SearchKey::Answered => "ANSWERED",
            SearchKey::Bcc => "BCC",
            SearchKey::Cc => "CC",
            SearchKey::Deleted => "DELETED",
            SearchKey::Draft => "DRAFT",
            SearchKey::Flagged => "FLAGGED",
            SearchKey::From => "FROM",
            SearchKey::Header => "HEADER",
            SearchKey::Keyword => "KEYWORD",
            SearchKey::New => "NEW",
            SearchKey::Old => "OLD",
            SearchKey::Recent => "RECENT",
            SearchKey::Seen => "SEEN",
            SearchKey::Subject => "SUBJECT",
            SearchKey::To => "TO",
            SearchKey::Uid => "UID",
            SearchKey::Unanswered => "UNANSWERED",
            SearchKey::Undeleted => "UNDELETED",
            SearchKey::Undraft => "UNDRAFT",
            SearchKey::Unflagged => "UNFLAGGED",
            SearchKey::Unkeyword => "UNKEYWORD",
            SearchKey::Unseen => "UNSEEN",
        }
    }

    /// The number of arguments that follow this key in a `SEARCH` command.
    pub fn required_parameter_count(self) -> usize {
        match self {
            SearchKey::Header => 2,

            SearchKey::Bcc
            | SearchKey::Cc
            | SearchKey::From
            | SearchKey::Subject
            | SearchKey::To
            | SearchKey::Keyword
            | SearchKey::Unkeyword
            | SearchKey::Uid => 1,

            SearchKey::All
            | SearchKey::Answered
            | SearchKey::Deleted
            | SearchKey::Draft
            | SearchKey::Flagged
            | SearchKey::New
            | SearchKey::Old
            | SearchKey::Recent
            | SearchKey::Seen
            | SearchKey::Unanswered
            | SearchKey::Undeleted
            | SearchKey::Undraft
            | SearchKey::Unflagged
            | SearchKey::Unseen => 0,
        }
    }
}

impl fmt::Display for SearchKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        SearchKey::ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSearchKey(s.to_owned()))
    }
}
