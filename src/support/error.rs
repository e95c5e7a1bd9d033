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

use std::io;

use thiserror::Error;

use crate::search::key::SearchKey;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown search key: {0}")]
    UnknownSearchKey(String),
    #[error("{key} takes {expected} parameter(s), but {actual} were given")]
    WrongParameterCount {
        key: SearchKey,
        expected: usize,
        actual: usize,
    },
    #[error("Search criteria ended before {0} received its parameters")]
    MissingParameter(SearchKey),
    #[error("Address is not correct: {0}")]
    InvalidAddress(String),
    #[error("Invalid UID range: {0}")]
    InvalidUidRange(String),
    #[error("Can not convert empty string to mail flag")]
    EmptyFlagName,
    #[error("Search text cannot be matched: {0}")]
    UnsearchableText(regex::Error),
    #[error("Bad configuration: {0}")]
    BadConfig(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether this error was caused by the content of the search criteria
    /// (as opposed to the environment).
    ///
    /// The command layer answers these with a command rejection rather than
    /// tearing down the session.
    pub fn is_bad_criteria(&self) -> bool {
        match *self {
            Error::UnknownSearchKey(..)
            | Error::WrongParameterCount { .. }
            | Error::MissingParameter(..)
            | Error::InvalidAddress(..)
            | Error::InvalidUidRange(..)
            | Error::EmptyFlagName
            | Error::UnsearchableText(..) => true,
            Error::BadConfig(..) | Error::Io(..) => false,
        }
    }
}
