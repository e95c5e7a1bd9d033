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

//! Drives the search term builders over a whole list of criteria tokens and
//! runs the result over a set of messages.

use log::debug;
use rayon::prelude::*;

use super::builder::TermFactory;
use super::term::SearchTerm;
use crate::store::message::SearchableMessage;
use crate::support::error::Error;

/// Compile the already-split criteria `tokens` into a single term.
///
/// Each key token is followed by exactly as many parameter tokens as the key
/// requires. All criteria must hold for a message to match; empty criteria
/// match everything.
pub fn compile<S: AsRef<str>>(
    factory: &TermFactory,
    tokens: &[S],
) -> Result<SearchTerm, Error> {
    let mut tokens = tokens.iter().map(AsRef::as_ref);
    let mut term = SearchTerm::All;

    while let Some(token) = tokens.next() {
        let mut builder = factory.create_from_token(token)?;
        while builder.expects_parameter() {
            let param = tokens
                .next()
                .ok_or_else(|| Error::MissingParameter(builder.key()))?;
            builder.add_parameter(param);
        }

        term = term.and(builder.build()?);
    }

    debug!("Compiled search criteria: {}", term);
    Ok(term)
}

/// Evaluate `term` against every message in `messages`, returning the indices
/// of those that match in ascending order.
///
/// Unless `sequential` is set, messages are evaluated in parallel.
pub fn search<M: SearchableMessage + Sync>(
    term: &SearchTerm,
    messages: &[M],
    sequential: bool,
) -> Vec<usize> {
    let mut hits: Vec<usize> = if sequential {
        messages
            .iter()
            .enumerate()
            .filter(|&(_, message)| term.matches(message))
            .map(|(ix, _)| ix)
            .collect()
    } else {
        messages
            .par_iter()
            .enumerate()
            .filter(|&(_, message)| term.matches(message))
            .map(|(ix, _)| ix)
            .collect()
    };

    hits.sort_unstable();
    debug!("{} of {} messages matched", hits.len(), messages.len());
    hits
}
