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

//! UID sequence sets, as used by the `UID` search key.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound::{Excluded, Included, Unbounded};

use crate::store::model::Uid;
use crate::support::error::Error;

/// An inclusive range of UIDs, possibly open at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdRange {
    pub low: Uid,
    /// `None` if the range was written with `*` and so extends to whatever
    /// the greatest UID in the mailbox is.
    pub high: Option<Uid>,
}

impl IdRange {
    pub fn includes(&self, uid: Uid) -> bool {
        self.low <= uid && self.high.map_or(true, |high| uid <= high)
    }
}

/// A set of UIDs parsed from an IMAP sequence set such as `1:5,7,9:*`.
///
/// Internally, this is maintained as a minimal sorted set of inclusive ranges.
/// It does not maintain information on the original fragmentation, ordering,
/// or duplication.
///
/// `*` is not resolved against any particular mailbox. It stands for the
/// greatest possible UID, so `5:*` contains every UID from 5 up. A lone `*`
/// therefore only contains `Uid::MAX`.
///
/// The `Display` format puts this into minimal IMAP wire format.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct UidSet {
    parts: BTreeMap<u32, u32>,
}

const SPLAT: u32 = u32::MAX;

impl UidSet {
    /// Create a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set containing just a single, simple range.
    pub fn range(start: Uid, end: Uid) -> Self {
        let mut this = Self::new();
        this.insert(start, end);
        this
    }

    /// Insert the given inclusive range into this set.
    ///
    /// The endpoints may be given in either order.
    pub fn insert(&mut self, a: Uid, b: Uid) {
        self.insert_raw(a.min(b).into(), a.max(b).into());
    }

    fn insert_raw(&mut self, start_incl: u32, mut end_incl: u32) {
        // If this range overlaps or abuts any later ranges, fuse them.
        loop {
            let following = self
                .parts
                .range((Excluded(start_incl), Unbounded))
                .next()
                .map(|(&start, &end)| (start, end));

            if let Some((following_start, following_end)) = following {
                if following_start - 1 <= end_incl {
                    end_incl = end_incl.max(following_end);
                    self.parts.remove(&following_start);
                    continue;
                }
            }

            break;
        }

        let preceding = self
            .parts
            .range((Unbounded, Included(start_incl)))
            .next_back()
            .map(|(&start, &end)| (start, end));
        if let Some((preceding_start, preceding_end)) = preceding {
            if preceding_end.saturating_add(1) >= start_incl {
                self.parts
                    .insert(preceding_start, end_incl.max(preceding_end));
                return;
            }
        }

        self.parts.insert(start_incl, end_incl);
    }

    /// Return whether the given UID is present in this set.
    pub fn contains(&self, uid: Uid) -> bool {
        let v: u32 = uid.into();
        self.parts
            .range(..=v)
            .next_back()
            .filter(|&(_, &end)| end >= v)
            .is_some()
    }

    /// Iterate over the ranges in this set, in ascending order.
    pub fn ranges<'a>(&'a self) -> impl Iterator<Item = IdRange> + 'a {
        self.parts.iter().filter_map(|(&start, &end)| {
            Some(IdRange {
                low: Uid::of(start)?,
                high: if SPLAT == end { None } else { Uid::of(end) },
            })
        })
    }

    /// Return whether this set is empty (invalid for IMAP wire format).
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parse the IMAP format of a sequence set.
    ///
    /// Endpoints of a range may appear in either order, since RFC 3501 allows
    /// that. Zero is not a valid UID and is rejected.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        fn do_parse(r: &str) -> Option<u32> {
            if "*" == r {
                Some(SPLAT)
            } else if !r.is_empty() && r.bytes().all(|b| b.is_ascii_digit()) {
                r.parse().ok().filter(|&n| 0 != n)
            } else {
                None
            }
        }

        let bad = || Error::InvalidUidRange(raw.to_owned());

        let mut this = Self::new();
        for part in raw.split(',') {
            let mut subs = part.split(':');
            match (subs.next(), subs.next(), subs.next()) {
                (Some(only), None, None) => {
                    let only = do_parse(only).ok_or_else(bad)?;
                    this.insert_raw(only, only);
                }
                (Some(start), Some(end), None) => {
                    let start = do_parse(start).ok_or_else(bad)?;
                    let end = do_parse(end).ok_or_else(bad)?;
                    this.insert_raw(start.min(end), end.max(start));
                }
                _ => return Err(bad()),
            }
        }

        Ok(this)
    }
}

impl fmt::Display for UidSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn write_end(f: &mut fmt::Formatter, v: u32) -> fmt::Result {
            if SPLAT == v {
                write!(f, "*")
            } else {
                write!(f, "{}", v)
            }
        }

        for (ix, (&start, &end)) in self.parts.iter().enumerate() {
            if 0 != ix {
                write!(f, ",")?;
            }

            write_end(f, start)?;
            if start != end {
                write!(f, ":")?;
                write_end(f, end)?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for UidSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[Uid {}]", self)
    }
}
