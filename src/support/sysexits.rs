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

//! Constants from `sysexits.h`
//!
//! The command-line front end follows the sendmail/procmail conventions for
//! exit codes, so scripts driving it can tell a bad query from a missing file.

use std::io;

use super::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Sysexit(pub i32);

pub const EX_USAGE: Sysexit = Sysexit(64);
pub const EX_NOINPUT: Sysexit = Sysexit(66);
pub const EX_IOERR: Sysexit = Sysexit(74);
pub const EX_CONFIG: Sysexit = Sysexit(78);

impl Sysexit {
    pub fn exit(self) -> ! {
        std::process::exit(self.0)
    }

    /// Choose the exit code that best describes `err`.
    pub fn for_error(err: &Error) -> Self {
        match *err {
            Error::UnknownSearchKey(..)
            | Error::WrongParameterCount { .. }
            | Error::MissingParameter(..)
            | Error::InvalidAddress(..)
            | Error::InvalidUidRange(..)
            | Error::EmptyFlagName
            | Error::UnsearchableText(..) => EX_USAGE,
            Error::BadConfig(..) => EX_CONFIG,
            Error::Io(ref e) if io::ErrorKind::NotFound == e.kind() => {
                EX_NOINPUT
            }
            Error::Io(..) => EX_IOERR,
        }
    }
}
