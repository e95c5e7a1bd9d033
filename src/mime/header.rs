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

//! Utilities for working with individual RFC 5322 headers.
//!
//! Only the parts of the grammar that searching needs are here: the header
//! block itself, and the addressing syntax.

use std::borrow::Cow;

use lazy_static::lazy_static;
use nom::{
    branch::alt,
    bytes::complete::{is_a, is_not, take, take_while1},
    character::complete::char,
    combinator::{all_consuming, map, opt},
    multi::{
        fold_many0, many0, many0_count, many1_count, separated_nonempty_list,
    },
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};
use regex::bytes::Regex;

use super::model::*;

lazy_static! {
    /// Matches one logical header line, including any continuation lines.
    ///
    /// Group 1 is the name, group 2 the raw (still folded) value.
    static ref FULL_HEADER_LINE: Regex = Regex::new(
        r"(?m-u)^([\x21-\x39\x3B-\x7E]+)[ \t]*:([^\n]*(?:\n[ \t][^\n]*)*)"
    )
    .unwrap();
    /// Matches the blank line separating the header block from the body.
    static ref END_OF_HEADERS: Regex = Regex::new(r"(?m)^\r?$").unwrap();
}

/// Split the header block of `message` into `(name, value)` pairs, in the
/// order they occur.
///
/// Values are unfolded and trimmed but otherwise left alone; in particular,
/// encoded words are not decoded. Bytes which are not valid UTF-8 are
/// replaced.
///
/// Lines in the header block which are not syntactically headers are
/// skipped.
pub fn parse_header_block(message: &[u8]) -> Vec<(String, String)> {
    let end = END_OF_HEADERS
        .find(message)
        .map_or(message.len(), |m| m.start());
    let block = &message[..end];

    FULL_HEADER_LINE
        .captures_iter(block)
        .map(|caps| {
            let name = String::from_utf8_lossy(&caps[1]).into_owned();
            let mut value = String::from_utf8_lossy(&caps[2]).into_owned();
            value.retain(|c| '\r' != c && '\n' != c);
            (name, value.trim().to_owned())
        })
        .collect()
}

/// Comments nested deeper than this are rejected outright, since the comment
/// grammar recurses once per level.
const MAX_COMMENT_DEPTH: usize = 64;

/// Parse `i` as exactly one RFC 5322 mailbox.
pub fn parse_mailbox(i: &[u8]) -> Option<MailboxSpec<'_>> {
    if !comment_depth_ok(i) {
        return None;
    }

    all_consuming(mailbox)(i).ok().map(|(_, m)| m)
}

/// Parse `i` as an RFC 5322 address list.
pub fn parse_address_list(i: &[u8]) -> Option<Vec<Address<'_>>> {
    if !comment_depth_ok(i) {
        return None;
    }

    all_consuming(address_list)(i).ok().map(|(_, l)| l)
}

// Conservative: parentheses inside domain literals count too, which can only
// make deeply-nested-looking input fail.
fn comment_depth_ok(i: &[u8]) -> bool {
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;

    for &b in i {
        if escaped {
            escaped = false;
        } else if b'\\' == b {
            escaped = true;
        } else if quoted {
            quoted = b'"' != b;
        } else if b'"' == b && 0 == depth {
            quoted = true;
        } else if b'(' == b {
            depth += 1;
            if depth > MAX_COMMENT_DEPTH {
                return false;
            }
        } else if b')' == b {
            depth = depth.saturating_sub(1);
        }
    }

    true
}

type Res<'a, T> = IResult<&'a [u8], T>;

// RFC 5322 3.2.1 "quoted-pair", including the 8-bit clean "obsolete" syntax
fn quoted_pair(i: &[u8]) -> Res<'_, &[u8]> {
    preceded(char('\\'), take(1usize))(i)
}

// RFC 5322 3.2.2 "Folding white space".
// Unfolding is performed by a different mechanism, so we just treat the
// line-ending characters as simple whitespace.
fn fws(i: &[u8]) -> Res<'_, &[u8]> {
    map(is_a(" \t\r\n"), |_| &b" "[..])(i)
}

// RFC 5322 3.2.2 "Comment text".
fn ctext(i: &[u8]) -> Res<'_, &[u8]> {
    is_not("()\\ \t\r\n")(i)
}

// RFC 5322 3.2.2 "Comment content".
// The original definition includes FWS in the comment syntax instead of here,
// which makes it a lot more complicated.
fn ccontent(i: &[u8]) -> Res<'_, ()> {
    alt((
        map(ctext, |_| ()),
        map(quoted_pair, |_| ()),
        map(fws, |_| ()),
        comment,
    ))(i)
}

// RFC 5322 3.2.2 "Comment". Note it is recursive.
fn comment(i: &[u8]) -> Res<'_, ()> {
    delimited(char('('), map(many0_count(ccontent), |_| ()), char(')'))(i)
}

// RFC 5322 3.2.2 "Comment or folding white space". Matches the empty string.
fn cfws(i: &[u8]) -> Res<'_, ()> {
    map(many0_count(alt((map(fws, |_| ()), comment))), |_| ())(i)
}

fn is_atext(ch: u8) -> bool {
    // RFC 5322 ALPHA / DIGIT
    ch.is_ascii_alphanumeric() ||
        // RFC 5322 non-specials
        b"!#$%&'*+-/=?^_`{|}~".contains(&ch) ||
        // RFC 6532 Unicode
        ch >= 0x80
}

// RFC 5322 3.2.3 "Atom text"
fn atext(i: &[u8]) -> Res<'_, &[u8]> {
    take_while1(is_atext)(i)
}

// RFC 5322 3.2.3 "Atom"
fn atom(i: &[u8]) -> Res<'_, &[u8]> {
    delimited(cfws, atext, cfws)(i)
}

// RFC 5322 3.2.4 "Quoted [string] text"
// Amended by RFC 6532 to include all non-ASCII characters
fn qtext(i: &[u8]) -> Res<'_, &[u8]> {
    is_not(" \t\r\n\\\"")(i)
}

// RFC 5322 3.2.4 "Quoted [string] content"
// FWS is moved in here from the quoted-string definition.
fn qcontent(i: &[u8]) -> Res<'_, &[u8]> {
    alt((qtext, quoted_pair, fws))(i)
}

fn append_content<'a>(mut acc: Cow<'a, [u8]>, item: &'a [u8]) -> Cow<'a, [u8]> {
    if acc.is_empty() {
        acc = Cow::Borrowed(item);
    } else {
        acc.to_mut().extend_from_slice(item);
    }
    acc
}

// RFC 5322 3.2.4 "Quoted string"
fn quoted_string(i: &[u8]) -> Res<'_, Cow<'_, [u8]>> {
    delimited(
        pair(cfws, char('"')),
        fold_many0(qcontent, Cow::Borrowed(&[] as &[u8]), append_content),
        pair(char('"'), cfws),
    )(i)
}

// RFC 5322 3.2.5 "word"
fn word(i: &[u8]) -> Res<'_, Cow<'_, [u8]>> {
    alt((map(atom, Cow::Borrowed), quoted_string))(i)
}

// Part of the `obs-phrase` grammar, which accounts for the '.' that many
// agents put unquoted into display names.
fn obs_dot(i: &[u8]) -> Res<'_, Cow<'_, [u8]>> {
    terminated(map(char('.'), |_| Cow::Borrowed(&b"."[..])), cfws)(i)
}

// RFC 5322 3.2.5 "phrase", plus "obsolete phrase" syntax.
fn phrase(i: &[u8]) -> Res<'_, Vec<Cow<'_, [u8]>>> {
    map(pair(word, many0(alt((word, obs_dot)))), |(head, mut tail)| {
        tail.insert(0, head);
        tail
    })(i)
}

// RFC 5322 3.4.1 local part of address
// Formally, this is `dot-atom / quoted-string / obs-local-part`, with
// `obs-local-part` being `word *("." word)`. Any dot-atom or quoted-string
// conforms to obs-local-part, so we just parse that.
fn local_part(i: &[u8]) -> Res<'_, Vec<Cow<'_, [u8]>>> {
    separated_nonempty_list(char('.'), word)(i)
}

// RFC 5322 4.4 obsolete domain format, which subsumes dot-atom
fn obs_domain(i: &[u8]) -> Res<'_, Vec<Cow<'_, [u8]>>> {
    separated_nonempty_list(char('.'), map(atom, Cow::Borrowed))(i)
}

// RFC 5322 3.4.1 domain name text
// Amended by RFC 6532 to include all non-ASCII
fn dtext(i: &[u8]) -> Res<'_, &[u8]> {
    is_not("[]\\ \t\r\n")(i)
}

// RFC 5322 3.4.1 domain literal content
fn dcontent(i: &[u8]) -> Res<'_, &[u8]> {
    alt((dtext, quoted_pair, fws))(i)
}

// RFC 5322 3.4.1 domain literal, brackets retained
fn domain_literal(i: &[u8]) -> Res<'_, Vec<u8>> {
    map(
        delimited(
            pair(cfws, char('[')),
            fold_many0(dcontent, vec![b'['], |mut acc: Vec<u8>, item: &[u8]| {
                acc.extend_from_slice(item);
                acc
            }),
            pair(char(']'), cfws),
        ),
        |mut res| {
            res.push(b']');
            res
        },
    )(i)
}

// RFC 5322 3.4.1 domain
fn domain(i: &[u8]) -> Res<'_, Vec<Cow<'_, [u8]>>> {
    alt((obs_domain, map(domain_literal, |v| vec![Cow::Owned(v)])))(i)
}

// RFC 5322 3.4.1 address specification
fn addr_spec(i: &[u8]) -> Res<'_, AddrSpec<'_>> {
    map(
        pair(local_part, preceded(char('@'), domain)),
        |(local, domain)| AddrSpec { local, domain },
    )(i)
}

fn list_delim(i: &[u8]) -> Res<'_, ()> {
    map(many1_count(tuple((cfws, char(','), cfws))), |_| ())(i)
}

// RFC 5322 4.4 obsolete routing information, `@a,@b:`
// We just discard all this
fn obs_route(i: &[u8]) -> Res<'_, ()> {
    map(
        terminated(
            separated_nonempty_list(list_delim, preceded(char('@'), domain)),
            char(':'),
        ),
        |_| (),
    )(i)
}

// RFC 5322 3.4 angle-delimited address, including obsolete routing
fn angle_addr(i: &[u8]) -> Res<'_, AddrSpec<'_>> {
    delimited(
        tuple((cfws, char('<'), opt(obs_route))),
        addr_spec,
        pair(char('>'), cfws),
    )(i)
}

// RFC 5322 3.4 mailbox
fn mailbox(i: &[u8]) -> Res<'_, MailboxSpec<'_>> {
    map(
        alt((
            pair(opt(phrase), angle_addr),
            map(addr_spec, |a| (None, a)),
        )),
        |(name, addr)| MailboxSpec {
            name: name.unwrap_or_default(),
            addr,
        },
    )(i)
}

// RFC 5322 3.4 mailbox list, including the obsolete syntax which permits
// empty elements
fn mailbox_list(i: &[u8]) -> Res<'_, Vec<MailboxSpec<'_>>> {
    delimited(
        opt(list_delim),
        separated_nonempty_list(list_delim, mailbox),
        opt(list_delim),
    )(i)
}

// RFC 5322 3.4 group
fn group(i: &[u8]) -> Res<'_, GroupSpec<'_>> {
    map(
        pair(
            terminated(phrase, char(':')),
            terminated(opt(mailbox_list), tuple((cfws, char(';'), cfws))),
        ),
        |(name, boxes)| GroupSpec {
            name,
            boxes: boxes.unwrap_or_default(),
        },
    )(i)
}

// RFC 5322 3.4 address
fn address(i: &[u8]) -> Res<'_, Address<'_>> {
    alt((map(mailbox, Address::Mailbox), map(group, Address::Group)))(i)
}

// RFC 5322 3.4 address list, including obsolete syntax
fn address_list(i: &[u8]) -> Res<'_, Vec<Address<'_>>> {
    delimited(
        opt(list_delim),
        separated_nonempty_list(list_delim, address),
        opt(list_delim),
    )(i)
}
