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

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::error::Error;
use crate::search::term::MatchOptions;

/// The configuration for Crysearch.
///
/// This is stored in a TOML file, conventionally named `crysearch.toml`, and
/// passed to the command-line program with `--config`. Every section is
/// optional.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct SystemConfig {
    /// Options controlling how search criteria are evaluated.
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// If true, textual criteria (`SUBJECT`, `HEADER`) compare case exactly.
    ///
    /// By default, matching is case-insensitive using Unicode simple case
    /// folding, which is what nearly every IMAP client expects.
    pub case_sensitive: bool,

    /// If true, whitespace in a textual criterion must match the message
    /// byte-for-byte.
    ///
    /// By default, any run of whitespace in the criterion matches any
    /// non-empty run of spaces, tabs, and line breaks in the header, so that
    /// folded headers can still be found.
    pub exact_whitespace: bool,

    /// If true, messages are evaluated one at a time on the calling thread
    /// instead of on the rayon thread pool.
    pub sequential: bool,
}

impl SystemConfig {
    /// Load the configuration from the TOML file at `path`.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = fs::read(path)?;
        Ok(toml::from_slice(&raw)?)
    }
}

impl SearchConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            exact_whitespace: self.exact_whitespace,
        }
    }
}
