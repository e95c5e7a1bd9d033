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

use std::path::{Path, PathBuf};

use log::LevelFilter;
use structopt::StructOpt;

use crate::search::builder::TermFactory;
use crate::search::criteria;
use crate::search::flag_name::resolve_flag;
use crate::store::model::Flag;
use crate::support::sysexits::*;
use crate::support::system_config::SystemConfig;

#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
enum Command {
    Search(SearchSubcommand),
    Explain(ExplainSubcommand),
}

#[derive(StructOpt, Default)]
pub(super) struct CommonOptions {
    /// Path to `crysearch.toml`. Built-in defaults are used if not given.
    #[structopt(long, parse(from_os_str))]
    pub(super) config: Option<PathBuf>,
}

/// Search message files.
///
/// Each file named with `-m` is loaded as one message in a scratch mailbox.
/// Messages are numbered from 1 in the order given, and unless `--no-uids` is
/// passed, each message's UID is the same as its number.
///
/// The criteria follow `--` and use the IMAP SEARCH vocabulary, for example:
///
/// crysearch search -m a.eml -m b.eml -- UNSEEN FROM alice@example.com
///
/// The numbers of the matching messages are printed as an untagged SEARCH
/// response.
#[derive(StructOpt)]
pub(super) struct SearchSubcommand {
    #[structopt(flatten)]
    pub(super) common: CommonOptions,

    /// A log4rs configuration file to use instead of logging to stderr.
    #[structopt(long, parse(from_os_str))]
    pub(super) log_config: Option<PathBuf>,

    /// Log debugging information to stderr.
    #[structopt(short, long)]
    pub(super) verbose: bool,

    /// Extract maildir-style flags from the file name(s). Files under a
    /// directory named `new` are also considered `\Recent`.
    #[structopt(long)]
    pub(super) maildir_flags: bool,

    /// Add this IMAP flag (e.g., '\Flagged') or keyword to every message.
    /// Can be passed multiple times.
    #[structopt(
        parse(try_from_str = resolve_flag),
        short,
        long,
        number_of_values(1)
    )]
    pub(super) flag: Vec<Flag>,

    /// Do not assign UIDs to the messages.
    #[structopt(long)]
    pub(super) no_uids: bool,

    /// A message file to search. Can be passed multiple times.
    #[structopt(
        short = "m",
        long = "message",
        parse(from_os_str),
        required = true,
        number_of_values(1)
    )]
    pub(super) messages: Vec<PathBuf>,

    /// The search criteria.
    pub(super) criteria: Vec<String>,
}

/// Show how search criteria are interpreted without searching anything.
#[derive(StructOpt)]
pub(super) struct ExplainSubcommand {
    #[structopt(flatten)]
    pub(super) common: CommonOptions,

    /// The search criteria.
    pub(super) criteria: Vec<String>,
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let cmd = Command::from_clap(&match Command::clap().get_matches_safe() {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    match cmd {
        Command::Search(cmd) => search(cmd),
        Command::Explain(cmd) => explain(cmd),
    }
}

fn search(cmd: SearchSubcommand) {
    if let Some(ref log_config) = cmd.log_config {
        if let Err(e) =
            log4rs::init_file(log_config, log4rs::file::Deserializers::new())
        {
            eprintln!(
                "Error in log config file at '{}': {}",
                log_config.display(),
                e
            );
            EX_CONFIG.exit();
        }
    } else {
        crate::init_simple_log(if cmd.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        });
    }

    let config = load_config(cmd.common.config.as_deref());
    match super::search::run(&cmd, &config) {
        Ok(response) => println!("{}", response),
        Err(e) => {
            eprintln!("{}", e);
            Sysexit::for_error(&e).exit()
        }
    }
}

fn explain(cmd: ExplainSubcommand) {
    crate::init_simple_log(LevelFilter::Warn);

    let config = load_config(cmd.common.config.as_deref());
    let factory = TermFactory::new(config.search.match_options());
    match criteria::compile(&factory, &cmd.criteria[..]) {
        Ok(term) => println!("{}", term),
        Err(e) => {
            eprintln!("{}", e);
            Sysexit::for_error(&e).exit()
        }
    }
}

fn load_config(path: Option<&Path>) -> SystemConfig {
    let path = match path {
        Some(path) => path,
        None => return SystemConfig::default(),
    };

    match SystemConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error in config file at '{}': {}", path.display(), e);
            EX_CONFIG.exit()
        }
    }
}
