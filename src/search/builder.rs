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

//! Turns a search key and its parameters into a `SearchTerm`.
//!
//! A `SearchTermBuilder` is created for each occurrence of a key in the
//! criteria. The caller feeds it parameters while `expects_parameter()` is
//! true, then calls `build()`.

use super::flag_name::resolve_flag;
use super::id_range::UidSet;
use super::key::SearchKey;
use super::term::*;
use crate::mime::model::EmailAddress;
use crate::store::model::*;
use crate::support::error::Error;

type Strategy = fn(&[String], MatchOptions) -> Result<SearchTerm, Error>;

/// Collects the parameters for one search key.
#[derive(Clone)]
pub struct SearchTermBuilder {
    key: SearchKey,
    parameters: Vec<String>,
    options: MatchOptions,
    strategy: Strategy,
}

impl std::fmt::Debug for SearchTermBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SearchTermBuilder")
            .field("key", &self.key)
            .field("parameters", &self.parameters)
            .field("options", &self.options)
            .finish()
    }
}

impl SearchTermBuilder {
    pub fn key(&self) -> SearchKey {
        self.key
    }

    /// Append the next parameter. Nothing is validated until `build()`.
    pub fn add_parameter(&mut self, value: impl Into<String>) -> &mut Self {
        self.parameters.push(value.into());
        self
    }

    /// Whether the key still needs more parameters.
    pub fn expects_parameter(&self) -> bool {
        self.parameters.len() < self.key.required_parameter_count()
    }

    pub fn parameter(&self, ix: usize) -> Option<&str> {
        self.parameters.get(ix).map(String::as_str)
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Build the term, validating the parameters.
    pub fn build(self) -> Result<SearchTerm, Error> {
        let expected = self.key.required_parameter_count();
        if self.parameters.len() != expected {
            return Err(Error::WrongParameterCount {
                key: self.key,
                expected,
                actual: self.parameters.len(),
            });
        }

        (self.strategy)(&self.parameters, self.options)
    }
}

/// Creates builders which all share the same `MatchOptions`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TermFactory {
    options: MatchOptions,
}

impl TermFactory {
    pub fn new(options: MatchOptions) -> Self {
        TermFactory { options }
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Create a builder for `key`.
    pub fn create(&self, key: SearchKey) -> SearchTermBuilder {
        SearchTermBuilder {
            key,
            parameters: Vec::with_capacity(key.required_parameter_count()),
            options: self.options,
            strategy: strategy_for(key),
        }
    }

    /// Resolve `token` as a search key and create a builder for it.
    pub fn create_from_token(
        &self,
        token: &str,
    ) -> Result<SearchTermBuilder, Error> {
        Ok(self.create(token.parse()?))
    }
}

/// Create a builder for `key` using the default `MatchOptions`.
pub fn create(key: SearchKey) -> SearchTermBuilder {
    TermFactory::default().create(key)
}

/// Resolve `token` and create a builder for it using the default
/// `MatchOptions`.
pub fn create_from_token(token: &str) -> Result<SearchTermBuilder, Error> {
    TermFactory::default().create_from_token(token)
}

fn strategy_for(key: SearchKey) -> Strategy {
    match key {
        SearchKey::All => |_, _| Ok(SearchTerm::All),
        SearchKey::Answered => |_, _| Ok(has(Flag::Answered, true)),
        SearchKey::Deleted => |_, _| Ok(has(Flag::Deleted, true)),
        SearchKey::Draft => |_, _| Ok(has(Flag::Draft, true)),
        SearchKey::Flagged => |_, _| Ok(has(Flag::Flagged, true)),
        SearchKey::Seen => |_, _| Ok(has(Flag::Seen, true)),
        SearchKey::Unanswered => |_, _| Ok(has(Flag::Answered, false)),
        SearchKey::Undeleted => |_, _| Ok(has(Flag::Deleted, false)),
        SearchKey::Undraft => |_, _| Ok(has(Flag::Draft, false)),
        SearchKey::Unflagged => |_, _| Ok(has(Flag::Flagged, false)),
        SearchKey::Unseen => |_, _| Ok(has(Flag::Seen, false)),
        SearchKey::New => |_, _| {
            Ok(has(Flag::Recent, true).and(has(Flag::Seen, false)))
        },
        SearchKey::Old => |_, _| Ok(has(Flag::Recent, false)),
        SearchKey::Recent => |_, _| Ok(has(Flag::Recent, true)),
        SearchKey::Bcc => |p, _| address(AddressRole::Bcc, &p[0]),
        SearchKey::Cc => |p, _| address(AddressRole::Cc, &p[0]),
        SearchKey::From => |p, _| address(AddressRole::From, &p[0]),
        SearchKey::To => |p, _| address(AddressRole::To, &p[0]),
        SearchKey::Subject => |p, o| header("Subject", &p[0], o),
        SearchKey::Header => |p, o| header(&p[0], &p[1], o),
        SearchKey::Keyword => |p, _| Ok(has(resolve_flag(&p[0])?, true)),
        SearchKey::Unkeyword => |p, _| Ok(has(resolve_flag(&p[0])?, false)),
        SearchKey::Uid => |p, _| Ok(SearchTerm::UidIn(UidSet::parse(&p[0])?)),
    }
}

fn has(flag: Flag, present: bool) -> SearchTerm {
    SearchTerm::FlagPresence { flag, present }
}

fn address(role: AddressRole, raw: &str) -> Result<SearchTerm, Error> {
    Ok(SearchTerm::AddressEquals {
        role,
        address: EmailAddress::parse(raw)?,
    })
}

fn header(
    field: &str,
    needle: &str,
    options: MatchOptions,
) -> Result<SearchTerm, Error> {
    Ok(SearchTerm::HeaderContains {
        field: field.to_owned(),
        needle: Needle::new(needle, options)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::message::SimpleMessage;

    fn valid_parameters(key: SearchKey) -> &'static [&'static str] {
        match key {
            SearchKey::Bcc | SearchKey::Cc | SearchKey::From | SearchKey::To => {
                &["user@example.com"]
            }
            SearchKey::Subject => &["hello"],
            SearchKey::Header => &["X-Foo", "bar"],
            SearchKey::Keyword | SearchKey::Unkeyword => &["custom"],
            SearchKey::Uid => &["1:5"],
            _ => &[],
        }
    }

    fn build(key: SearchKey, params: &[&str]) -> Result<SearchTerm, Error> {
        let mut builder = create(key);
        for &param in params {
            builder.add_parameter(param);
        }
        builder.build()
    }

    fn term(key: SearchKey, params: &[&str]) -> SearchTerm {
        build(key, params).unwrap()
    }

    fn message_with(flags: &[Flag]) -> SimpleMessage {
        let mut message = SimpleMessage::new();
        for flag in flags {
            message.set_flag(flag.clone());
        }
        message
    }

    #[test]
    fn parameter_feeding() {
        for &key in &SearchKey::ALL_KEYS {
            let params = valid_parameters(key);
            assert_eq!(key.required_parameter_count(), params.len());

            let mut builder = create(key);
            assert_eq!(key, builder.key());
            for (ix, &param) in params.iter().enumerate() {
                assert!(builder.expects_parameter(), "{} at {}", key, ix);
                builder.add_parameter(param);
                assert_eq!(Some(param), builder.parameter(ix));
            }
            assert!(!builder.expects_parameter(), "{}", key);
            assert_eq!(params.len(), builder.parameters().len());
            assert_eq!(None, builder.parameter(params.len()));

            if let Err(e) = builder.build() {
                panic!("{} failed to build: {}", key, e);
            }
        }
    }

    #[test]
    fn wrong_parameter_count() {
        for &key in &SearchKey::ALL_KEYS {
            let count = key.required_parameter_count();
            let mut too_many = create(key);
            for _ in 0..=count {
                too_many.add_parameter("1");
            }
            assert!(!too_many.expects_parameter());
            match too_many.build() {
                Err(Error::WrongParameterCount {
                    key: k,
                    expected,
                    actual,
                }) => {
                    assert_eq!(key, k);
                    assert_eq!(count, expected);
                    assert_eq!(count + 1, actual);
                }
                r => panic!("Unexpected result for {}: {:?}", key, r),
            }

            if count > 0 {
                assert_matches!(
                    Err(Error::WrongParameterCount { actual: 0, .. }),
                    create(key).build()
                );
            }
        }
    }

    #[test]
    fn chained_parameters() {
        let mut builder = create(SearchKey::Header);
        builder.add_parameter("Subject").add_parameter("");
        assert_eq!(&["Subject".to_owned(), String::new()], builder.parameters());
        assert!(!builder.expects_parameter());
    }

    #[test]
    fn unknown_key_token() {
        assert_matches!(
            Err(Error::UnknownSearchKey(..)),
            create_from_token("BODY")
        );
        assert_matches!(Err(Error::UnknownSearchKey(..)), create_from_token(""));
        let builder = create_from_token("fLaGgEd").unwrap();
        assert_eq!(SearchKey::Flagged, builder.key());
    }

    #[test]
    fn all_matches_everything() {
        let all = term(SearchKey::All, &[]);
        assert!(all.matches(&SimpleMessage::new()));
        assert!(all.matches(&message_with(&[Flag::Deleted, Flag::Seen])));
    }

    #[test]
    fn system_flag_keys() {
        let cases = [
            (SearchKey::Answered, SearchKey::Unanswered, Flag::Answered),
            (SearchKey::Deleted, SearchKey::Undeleted, Flag::Deleted),
            (SearchKey::Draft, SearchKey::Undraft, Flag::Draft),
            (SearchKey::Flagged, SearchKey::Unflagged, Flag::Flagged),
            (SearchKey::Seen, SearchKey::Unseen, Flag::Seen),
        ];

        let all_flags = [
            Flag::Answered,
            Flag::Deleted,
            Flag::Draft,
            Flag::Flagged,
            Flag::Recent,
            Flag::Seen,
        ];

        for (positive, negative, flag) in &cases {
            let pos = term(*positive, &[]);
            let neg = term(*negative, &[]);

            for other in &all_flags {
                let message = message_with(&[other.clone()]);
                assert_eq!(other == flag, pos.matches(&message));
                assert_eq!(other != flag, neg.matches(&message));
            }

            assert!(!pos.matches(&SimpleMessage::new()));
            assert!(neg.matches(&SimpleMessage::new()));
        }
    }

    #[test]
    fn recency_keys() {
        let new = term(SearchKey::New, &[]);
        let old = term(SearchKey::Old, &[]);
        let recent = term(SearchKey::Recent, &[]);

        for &(is_recent, is_seen) in
            &[(false, false), (false, true), (true, false), (true, true)]
        {
            let mut flags = Vec::new();
            if is_recent {
                flags.push(Flag::Recent);
            }
            if is_seen {
                flags.push(Flag::Seen);
            }
            let message = message_with(&flags);

            assert_eq!(is_recent && !is_seen, new.matches(&message));
            assert_eq!(!is_recent, old.matches(&message));
            assert_eq!(is_recent, recent.matches(&message));
        }
    }

    #[test]
    fn header_keys() {
        let hello = SimpleMessage::new().with_header("Subject", "Hello World");
        let goodbye = SimpleMessage::new().with_header("Subject", "Goodbye");
        let bare = SimpleMessage::new();

        let present = term(SearchKey::Header, &["Subject", ""]);
        assert!(present.matches(&hello));
        assert!(present.matches(&goodbye));
        assert!(!present.matches(&bare));

        let hello_term = term(SearchKey::Header, &["Subject", "Hello"]);
        assert!(hello_term.matches(&hello));
        assert!(!hello_term.matches(&goodbye));

        let lower_name = term(SearchKey::Header, &["subject", "Hello"]);
        assert!(lower_name.matches(&hello));

        let subject = term(SearchKey::Subject, &["world"]);
        assert!(subject.matches(&hello));
        assert!(!subject.matches(&goodbye));
        assert!(!subject.matches(&bare));
    }

    #[test]
    fn factory_options_reach_terms() {
        let factory = TermFactory::new(MatchOptions {
            case_sensitive: true,
            exact_whitespace: false,
        });
        let mut builder = factory.create(SearchKey::Subject);
        builder.add_parameter("world");
        let sensitive = builder.build().unwrap();

        let message = SimpleMessage::new().with_header("Subject", "Hello World");
        assert!(!sensitive.matches(&message));
        assert!(term(SearchKey::Subject, &["world"]).matches(&message));
    }

    #[test]
    fn oversized_needle_is_rejected() {
        let huge = "k".repeat(400_000);
        assert_matches!(
            Err(Error::UnsearchableText(..)),
            build(SearchKey::Subject, &[huge.as_str()])
        );
        assert_matches!(
            Err(Error::UnsearchableText(..)),
            build(SearchKey::Header, &["X-Foo", huge.as_str()])
        );

        let err = build(SearchKey::Subject, &[huge.as_str()]).unwrap_err();
        assert!(err.is_bad_criteria());
    }

    #[test]
    fn address_keys() {
        let message = SimpleMessage::new()
            .with_header("From", "user@example.com")
            .with_header("To", "Someone <someone@example.org>")
            .with_header("Cc", "Group: a@example.net, b@example.net;")
            .with_header("Bcc", "hidden@example.com (secret)");

        let from = term(SearchKey::From, &["user@example.com"]);
        assert!(from.matches(&message));
        assert!(!term(SearchKey::From, &["other@example.com"]).matches(&message));
        assert!(!from.matches(&SimpleMessage::new()));

        assert!(term(SearchKey::To, &["Some One <someone@example.org>"])
            .matches(&message));
        assert!(term(SearchKey::Cc, &["b@example.net"]).matches(&message));
        assert!(term(SearchKey::Bcc, &["hidden@example.com"]).matches(&message));
        assert!(!term(SearchKey::Bcc, &["user@example.com"]).matches(&message));
    }

    #[test]
    fn invalid_address() {
        for &key in &[SearchKey::Bcc, SearchKey::Cc, SearchKey::From, SearchKey::To]
        {
            let mut builder = create(key);
            builder.add_parameter("not-an-address");
            // Validation only happens in build()
            assert!(!builder.expects_parameter());
            assert_matches!(Err(Error::InvalidAddress(..)), builder.build());
        }

        let deep = format!("a@b.com {}", "(".repeat(200_000));
        assert_matches!(
            Err(Error::InvalidAddress(..)),
            build(SearchKey::From, &[deep.as_str()])
        );
    }

    #[test]
    fn keyword_keys() {
        let custom = message_with(&[Flag::Keyword("custom".to_owned())]);
        let other = message_with(&[Flag::Keyword("Custom".to_owned())]);

        let kw = term(SearchKey::Keyword, &["custom"]);
        let unkw = term(SearchKey::Unkeyword, &["custom"]);
        for message in &[custom, other, SimpleMessage::new()] {
            assert_ne!(kw.matches(message), unkw.matches(message));
        }
        assert!(kw.matches(&message_with(&[Flag::Keyword("custom".to_owned())])));
        assert!(!kw.matches(&message_with(&[Flag::Keyword("Custom".to_owned())])));

        // System flag names resolve to the system flag
        let seen = term(SearchKey::Keyword, &["\\SEEN"]);
        assert!(seen.matches(&message_with(&[Flag::Seen])));

        assert_matches!(
            Err(Error::EmptyFlagName),
            build(SearchKey::Keyword, &[""])
        );
        assert_matches!(
            Err(Error::EmptyFlagName),
            build(SearchKey::Unkeyword, &["  "])
        );
    }

    #[test]
    fn uid_key() {
        crate::init_test_log();

        let uid = term(SearchKey::Uid, &["1:3,7"]);
        for i in 1..10 {
            let message = SimpleMessage::new().with_uid(Uid::u(i));
            assert_eq!(
                i <= 3 || 7 == i,
                uid.matches(&message),
                "UID {}",
                i
            );
        }
        assert!(!uid.matches(&SimpleMessage::new()));

        let open = term(SearchKey::Uid, &["5:*"]);
        assert!(!open.matches(&SimpleMessage::new().with_uid(Uid::u(4))));
        assert!(open.matches(&SimpleMessage::new().with_uid(Uid::u(5))));
        assert!(open.matches(&SimpleMessage::new().with_uid(Uid::MAX)));

        assert_matches!(
            Err(Error::InvalidUidRange(..)),
            build(SearchKey::Uid, &["1:x"])
        );
    }
}
