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

//! Compiled search predicates.

use std::fmt;

use log::warn;
use regex::{Regex, RegexBuilder};

use super::id_range::UidSet;
use crate::mime::model::EmailAddress;
use crate::store::message::SearchableMessage;
use crate::store::model::*;
use crate::support::error::Error;

/// Controls how header needles are matched against header values.
///
/// The defaults give the usual IMAP behaviour: case-insensitive substring
/// matching in which any whitespace in the needle matches any amount of
/// whitespace in the value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// If true, letter case must match exactly.
    pub case_sensitive: bool,
    /// If true, whitespace in the needle must match the value exactly rather
    /// than matching any whitespace run.
    pub exact_whitespace: bool,
}

/// The substring a `HEADER` or `SUBJECT` term looks for.
#[derive(Clone)]
pub struct Needle {
    text: String,
    regex: Regex,
}

impl Needle {
    /// Compile `text` into a needle.
    ///
    /// Fails if the matcher for `text` would exceed the regex engine's size
    /// limits, which only happens for needles of hundreds of kilobytes.
    pub fn new(text: &str, options: MatchOptions) -> Result<Self, Error> {
        Ok(Needle {
            text: text.to_owned(),
            regex: to_regex(text, options).map_err(Error::UnsearchableText)?,
        })
    }

    /// The needle as it was given.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this needle occurs anywhere within `haystack`.
    ///
    /// The empty needle occurs in everything.
    pub fn is_found_in(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Needle {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.regex.as_str() == other.regex.as_str()
    }
}

impl fmt::Debug for Needle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Needle({:?})", self.text)
    }
}

// Every whitespace run in `pat`, including leading and trailing ones, becomes
// a class matching any non-empty whitespace run.
fn to_regex(pat: &str, options: MatchOptions) -> Result<Regex, regex::Error> {
    let regex_str = if options.exact_whitespace {
        regex::escape(pat)
    } else {
        let mut regex_str = String::with_capacity(pat.len());
        let mut in_whitespace = false;
        for ch in pat.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    regex_str.push_str("[ \r\n\t]+");
                }
                in_whitespace = true;
            } else {
                let mut buf = [0u8; 4];
                regex_str.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
                in_whitespace = false;
            }
        }
        regex_str
    };

    RegexBuilder::new(&regex_str)
        .case_insensitive(!options.case_sensitive)
        .build()
}

/// A predicate over a single message.
///
/// Terms are immutable once built and can be shared freely between threads.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchTerm {
    /// Matches every message.
    All,
    /// Matches messages which have `flag` set if `present`, or which lack it
    /// otherwise.
    FlagPresence { flag: Flag, present: bool },
    /// Matches messages having at least one header named `field` whose value
    /// contains `needle`.
    HeaderContains { field: String, needle: Needle },
    /// Matches messages where at least one address in the `role` header is
    /// `address`.
    AddressEquals {
        role: AddressRole,
        address: EmailAddress,
    },
    /// Matches messages whose UID is in the set.
    UidIn(UidSet),
    /// Matches messages matched by both sides.
    And(Box<SearchTerm>, Box<SearchTerm>),
}

impl SearchTerm {
    /// Combine `self` and `other` into a conjunction.
    ///
    /// `All` is the identity and vanishes from the result.
    pub fn and(self, other: SearchTerm) -> SearchTerm {
        match (self, other) {
            (SearchTerm::All, other) => other,
            (this, SearchTerm::All) => this,
            (this, other) => SearchTerm::And(Box::new(this), Box::new(other)),
        }
    }

    /// Evaluate this term against `message`.
    pub fn matches<M: SearchableMessage + ?Sized>(&self, message: &M) -> bool {
        match *self {
            SearchTerm::All => true,
            SearchTerm::FlagPresence { ref flag, present } => {
                present == message.has_flag(flag)
            }
            SearchTerm::HeaderContains {
                ref field,
                ref needle,
            } => message
                .header_values(field)
                .into_iter()
                .any(|value| needle.is_found_in(value)),
            SearchTerm::AddressEquals { role, ref address } => message
                .addresses(role)
                .iter()
                .any(|candidate| candidate == address),
            SearchTerm::UidIn(ref uids) => match message.uid() {
                Some(uid) => uids.contains(uid),
                None => {
                    warn!(
                        "{} has no UID; excluding it from UID search",
                        message.log_name()
                    );
                    false
                }
            },
            SearchTerm::And(ref left, ref right) => {
                left.matches(message) && right.matches(message)
            }
        }
    }
}

impl fmt::Display for SearchTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SearchTerm::All => write!(f, "ALL"),
            SearchTerm::FlagPresence {
                ref flag,
                present: true,
            } => write!(f, "FLAG {}", flag),
            SearchTerm::FlagPresence {
                ref flag,
                present: false,
            } => write!(f, "NOT FLAG {}", flag),
            SearchTerm::HeaderContains {
                ref field,
                ref needle,
            } => write!(f, "HEADER {} CONTAINS {:?}", field, needle.text()),
            SearchTerm::AddressEquals { role, ref address } => {
                write!(f, "{} IS {}", role.header_name(), address)
            }
            SearchTerm::UidIn(ref uids) => write!(f, "UID IN {}", uids),
            SearchTerm::And(ref left, ref right) => {
                write!(f, "({} AND {})", left, right)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::message::SimpleMessage;

    fn header(field: &str, needle: &str) -> SearchTerm {
        SearchTerm::HeaderContains {
            field: field.to_owned(),
            needle: Needle::new(needle, MatchOptions::default()).unwrap(),
        }
    }

    fn flag(flag: Flag, present: bool) -> SearchTerm {
        SearchTerm::FlagPresence { flag, present }
    }

    #[test]
    fn all_matches_anything() {
        assert!(SearchTerm::All.matches(&SimpleMessage::new()));
        assert!(SearchTerm::All.matches(
            &SimpleMessage::new()
                .with_uid(Uid::u(3))
                .with_flag(Flag::Seen)
                .with_header("Subject", "foo")
        ));
    }

    #[test]
    fn flag_presence() {
        let seen = SimpleMessage::new().with_flag(Flag::Seen);
        let plain = SimpleMessage::new();
        let custom = SimpleMessage::new()
            .with_flag(Flag::Keyword("custom".to_owned()));

        assert!(flag(Flag::Seen, true).matches(&seen));
        assert!(!flag(Flag::Seen, true).matches(&plain));
        assert!(!flag(Flag::Seen, false).matches(&seen));
        assert!(flag(Flag::Seen, false).matches(&plain));

        let kw = |s: &str| Flag::Keyword(s.to_owned());
        assert!(flag(kw("custom"), true).matches(&custom));
        assert!(!flag(kw("Custom"), true).matches(&custom));
        assert!(!flag(kw("custom"), false).matches(&custom));
        assert!(flag(kw("Custom"), false).matches(&custom));
        assert!(!flag(kw("custom"), true).matches(&seen));
    }

    #[test]
    fn header_contains() {
        let hello = SimpleMessage::new().with_header("Subject", "Hello World");
        let goodbye = SimpleMessage::new().with_header("Subject", "Goodbye");
        let nosubj = SimpleMessage::new().with_header("From", "Hello World");

        assert!(header("Subject", "").matches(&hello));
        assert!(header("Subject", "").matches(&goodbye));
        assert!(!header("Subject", "").matches(&nosubj));

        assert!(header("Subject", "Hello").matches(&hello));
        assert!(!header("Subject", "Hello").matches(&goodbye));
        assert!(!header("Subject", "Hello").matches(&nosubj));

        assert!(header("subject", "hello").matches(&hello));
        assert!(header("SUBJECT", "o w").matches(&hello));
        assert!(header("Subject", "lo   wor").matches(&hello));
        assert!(!header("Subject", "HelloWorld").matches(&hello));
        assert!(!header("Subject", "Hello World!").matches(&hello));
        // Regex metacharacters are literal
        assert!(!header("Subject", "H.llo").matches(&hello));
    }

    #[test]
    fn edge_whitespace_is_significant() {
        let joined = SimpleMessage::new().with_header("Subject", "HelloWorld");
        let spaced = SimpleMessage::new().with_header("Subject", "Hello World");

        assert!(!header("Subject", " World").matches(&joined));
        assert!(header("Subject", " World").matches(&spaced));
        assert!(!header("Subject", "Hello ").matches(&joined));
        assert!(header("Subject", "Hello\t").matches(&spaced));

        assert!(!header("Subject", "   ").matches(&joined));
        assert!(header("Subject", "   ").matches(&spaced));
        // Only the truly empty needle is a presence test
        assert!(header("Subject", "").matches(&joined));
    }

    #[test]
    fn oversized_needle_fails_cleanly() {
        let huge = "k".repeat(400_000);
        assert_matches!(
            Err(Error::UnsearchableText(..)),
            Needle::new(&huge, MatchOptions::default())
        );
    }

    #[test]
    fn header_contains_any_value() {
        let message = SimpleMessage::new()
            .with_header("X-Tag", "first")
            .with_header("X-Tag", "second");
        assert!(header("X-Tag", "first").matches(&message));
        assert!(header("x-tag", "SECOND").matches(&message));
        assert!(!header("X-Tag", "third").matches(&message));
    }

    #[test]
    fn header_match_options() {
        let message =
            SimpleMessage::new().with_header("Subject", "Hello \t World");

        let strict = MatchOptions {
            case_sensitive: true,
            exact_whitespace: true,
        };
        let term = |needle: &str, options| SearchTerm::HeaderContains {
            field: "Subject".to_owned(),
            needle: Needle::new(needle, options).unwrap(),
        };

        assert!(!term("hello", strict).matches(&message));
        assert!(term("Hello", strict).matches(&message));
        assert!(!term("Hello World", strict).matches(&message));
        assert!(term("Hello \t World", strict).matches(&message));

        let case_only = MatchOptions {
            case_sensitive: true,
            exact_whitespace: false,
        };
        assert!(term("Hello World", case_only).matches(&message));
        assert!(!term("hello world", case_only).matches(&message));
    }

    #[test]
    fn address_equals() {
        let message = SimpleMessage::new()
            .with_header("From", "User <user@example.com>")
            .with_header("Cc", "a@example.com, B <b@Example.com>");

        let term = |role, addr: &str| SearchTerm::AddressEquals {
            role,
            address: EmailAddress::parse(addr).unwrap(),
        };

        assert!(term(AddressRole::From, "user@example.com").matches(&message));
        assert!(term(AddressRole::From, "USER@EXAMPLE.COM").matches(&message));
        assert!(
            !term(AddressRole::From, "other@example.com").matches(&message)
        );
        assert!(!term(AddressRole::To, "user@example.com").matches(&message));
        assert!(term(AddressRole::Cc, "b@example.com").matches(&message));
        assert!(term(AddressRole::Cc, "a@example.com").matches(&message));
        assert!(!term(AddressRole::Bcc, "a@example.com").matches(&message));
    }

    #[test]
    fn uid_membership() {
        crate::init_test_log();

        let term = SearchTerm::UidIn(UidSet::parse("1:3,7").unwrap());
        let with = |uid| SimpleMessage::new().with_uid(Uid::u(uid));
        for &uid in &[1, 2, 3, 7] {
            assert!(term.matches(&with(uid)), "{}", uid);
        }
        for &uid in &[4, 5, 6, 8] {
            assert!(!term.matches(&with(uid)), "{}", uid);
        }

        assert!(!term.matches(&SimpleMessage::new()));
        assert!(!SearchTerm::UidIn(UidSet::parse("1:*").unwrap())
            .matches(&SimpleMessage::new()));
    }

    #[test]
    fn conjunction() {
        let recent_unseen =
            flag(Flag::Recent, true).and(flag(Flag::Seen, false));
        for &(recent, seen) in
            &[(false, false), (false, true), (true, false), (true, true)]
        {
            let mut message = SimpleMessage::new();
            if recent {
                message.set_flag(Flag::Recent);
            }
            if seen {
                message.set_flag(Flag::Seen);
            }

            assert_eq!(
                recent && !seen,
                recent_unseen.matches(&message),
                "recent={}, seen={}",
                recent,
                seen
            );
        }
    }

    #[test]
    fn and_drops_all() {
        assert_eq!(SearchTerm::All, SearchTerm::All.and(SearchTerm::All));
        assert_eq!(
            flag(Flag::Draft, true),
            SearchTerm::All.and(flag(Flag::Draft, true))
        );
        assert_eq!(
            flag(Flag::Draft, true),
            flag(Flag::Draft, true).and(SearchTerm::All)
        );
    }

    #[test]
    fn display() {
        let term = flag(Flag::Recent, true)
            .and(flag(Flag::Seen, false))
            .and(header("Subject", "hi"));
        assert_eq!(
            "((FLAG \\Recent AND NOT FLAG \\Seen) AND \
             HEADER Subject CONTAINS \"hi\")",
            term.to_string()
        );
        assert_eq!(
            "UID IN 1:3,7",
            SearchTerm::UidIn(UidSet::parse("7,1:3").unwrap()).to_string()
        );
    }

    #[test]
    fn terms_are_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<SearchTerm>();
    }
}
