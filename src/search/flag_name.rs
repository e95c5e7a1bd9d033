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

//! Flag names as given to `KEYWORD` and `UNKEYWORD`.

use crate::store::model::Flag;
use crate::support::error::Error;

const SYSTEM_FLAGS: [(&str, Flag); 6] = [
    ("answered", Flag::Answered),
    ("deleted", Flag::Deleted),
    ("draft", Flag::Draft),
    ("flagged", Flag::Flagged),
    ("recent", Flag::Recent),
    ("seen", Flag::Seen),
];

/// Resolve the argument of `KEYWORD` or `UNKEYWORD` to a flag.
///
/// System flag names are recognised case-insensitively, with or without the
/// leading backslash, so `KEYWORD seen` and `KEYWORD \Seen` both search for
/// `\Seen`. Anything else is a keyword and keeps its exact spelling.
///
/// Surrounding whitespace is ignored. A name which is empty after that is an
/// error.
pub fn resolve_flag(name: &str) -> Result<Flag, Error> {
    let name = name.trim();
    let bare = name.strip_prefix('\\').unwrap_or(name);
    if bare.is_empty() {
        return Err(Error::EmptyFlagName);
    }

    Ok(SYSTEM_FLAGS
        .iter()
        .find(|&&(system_name, _)| system_name.eq_ignore_ascii_case(bare))
        .map_or_else(|| Flag::Keyword(name.to_owned()), |(_, f)| f.clone()))
}
