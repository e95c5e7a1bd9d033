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

//! Compiles IMAP `SEARCH` criteria into predicates over messages.
//!
//! The usual entry points are `search::builder::TermFactory`, which turns one
//! search key and its parameters into a `search::term::SearchTerm`, and
//! `search::criteria`, which does the same for a whole list of criteria and
//! evaluates the result against a set of messages.

#[cfg(test)]
macro_rules! assert_matches {
    ($expected:pat, $actual:expr) => {
        match $actual {
            $expected => (),
            unexpected => panic!(
                "Expected {} matches {}, got {:?}",
                stringify!($expected),
                stringify!($actual),
                unexpected
            ),
        }
    };
}

pub mod cli;
pub mod mime;
pub mod search;
pub mod store;
pub mod support;

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Send log output at `level` and above to standard error.
///
/// Used when no log4rs configuration file was supplied.
pub fn init_simple_log(level: LevelFilter) {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S%.3f)} [{l}][{t}] {m}{n}",
        )))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level));

    match config {
        Ok(config) => {
            // Only fails if a logger is already installed, which is fine
            let _ = log4rs::init_config(config);
        }
        Err(e) => eprintln!("Failed to configure logging: {}", e),
    }
}

#[cfg(test)]
static INIT_TEST_LOG: std::sync::Once = std::sync::Once::new();

#[cfg(test)]
fn init_test_log() {
    INIT_TEST_LOG.call_once(|| init_simple_log(LevelFilter::Debug))
}
