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

//! The `search` subcommand proper.

use std::fs;
use std::path::Path;

use log::{debug, error, info};

use super::main::SearchSubcommand;
use crate::search::builder::TermFactory;
use crate::search::criteria;
use crate::store::message::SimpleMessage;
use crate::store::model::*;
use crate::support::error::Error;
use crate::support::system_config::SystemConfig;

/// Load the messages named by `cmd`, search them, and return the untagged
/// `SEARCH` response line.
pub(super) fn run(
    cmd: &SearchSubcommand,
    config: &SystemConfig,
) -> Result<String, Error> {
    let factory = TermFactory::new(config.search.match_options());
    let term = criteria::compile(&factory, &cmd.criteria[..])?;

    let messages = cmd
        .messages
        .iter()
        .enumerate()
        .map(|(ix, path)| load_message(cmd, ix, path))
        .collect::<Result<Vec<_>, Error>>()?;
    info!("Loaded {} message(s)", messages.len());

    let hits = criteria::search(&term, &messages, config.search.sequential);
    Ok(format_response(&hits))
}

fn load_message(
    cmd: &SearchSubcommand,
    ix: usize,
    path: &Path,
) -> Result<SimpleMessage, Error> {
    let raw = fs::read(path).map_err(|e| {
        error!("Failed to read '{}': {}", path.display(), e);
        e
    })?;

    let mut message = SimpleMessage::parse(&raw);
    if !cmd.no_uids {
        message.set_uid(Uid::of(ix as u32 + 1));
    }

    for flag in &cmd.flag {
        message.set_flag(flag.clone());
    }

    if cmd.maildir_flags {
        for flag in extract_maildir_flags(path) {
            message.set_flag(flag);
        }
    }

    debug!("Loaded '{}' as message {}", path.display(), ix + 1);
    Ok(message)
}

/// Determine the flags implied by a maildir file name.
///
/// The file name suffix `:2,` introduces the flag letters; a message still
/// in the `new` directory has not been seen by any client and so is
/// `\Recent`.
fn extract_maildir_flags(path: &Path) -> Vec<Flag> {
    let mut flags: Vec<Flag> = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rfind(":2,").map(|ix| &name[ix + 3..]))
        .unwrap_or("")
        .chars()
        .filter_map(|ch| match ch {
            'D' => Some(Flag::Draft),
            'F' => Some(Flag::Flagged),
            'R' => Some(Flag::Answered),
            'S' => Some(Flag::Seen),
            'T' => Some(Flag::Deleted),
            _ => None,
        })
        .collect();

    let in_new = path
        .parent()
        .and_then(Path::file_name)
        .map_or(false, |dir| "new" == dir);
    if in_new {
        flags.push(Flag::Recent);
    }

    flags
}

/// Messages are reported by their position, which is also their UID when
/// UIDs are assigned.
fn format_response(hits: &[usize]) -> String {
    let mut response = "* SEARCH".to_owned();
    for hit in hits {
        response.push(' ');
        response.push_str(&(hit + 1).to_string());
    }
    response
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::cli::main::CommonOptions;

    #[test]
    fn maildir_flag_extraction() {
        assert_eq!(
            vec![Flag::Flagged, Flag::Seen],
            extract_maildir_flags(Path::new("cur/1234.host:2,FS"))
        );
        assert_eq!(
            vec![
                Flag::Draft,
                Flag::Flagged,
                Flag::Answered,
                Flag::Seen,
                Flag::Deleted
            ],
            extract_maildir_flags(Path::new("/mail/cur/x:2,DFRSTa"))
        );
        assert_eq!(
            vec![Flag::Recent],
            extract_maildir_flags(Path::new("Maildir/new/1234.host"))
        );
        assert_eq!(
            Vec::<Flag>::new(),
            extract_maildir_flags(Path::new("cur/1234.host"))
        );
        assert_eq!(
            Vec::<Flag>::new(),
            extract_maildir_flags(Path::new("1234.host:2,"))
        );
    }

    #[test]
    fn response_format() {
        assert_eq!("* SEARCH", format_response(&[]));
        assert_eq!("* SEARCH 1 3 10", format_response(&[0, 2, 9]));
    }

    fn write_message(dir: &Path, name: &str, headers: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("{}\r\n\r\nBody text\r\n", headers))
            .unwrap();
        path
    }

    fn command(messages: Vec<PathBuf>, criteria: &[&str]) -> SearchSubcommand {
        SearchSubcommand {
            common: CommonOptions::default(),
            log_config: None,
            verbose: false,
            maildir_flags: false,
            flag: vec![],
            no_uids: false,
            messages,
            criteria: criteria.iter().map(|&s| s.to_owned()).collect(),
        }
    }

    #[test]
    fn search_files() {
        crate::init_test_log();

        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("cur")).unwrap();
        fs::create_dir(root.path().join("new")).unwrap();

        let a = write_message(
            &root.path().join("cur"),
            "1.host:2,S",
            "From: Alice <alice@example.com>\r\nSubject: Lunch\r\n plans",
        );
        let b = write_message(
            &root.path().join("new"),
            "2.host",
            "From: bob@example.com\r\nSubject: Re: lunch plans",
        );
        let c = write_message(
            &root.path().join("cur"),
            "3.host:2,F",
            "From: alice@example.com\r\nSubject: Report",
        );
        let messages = vec![a, b, c];
        let config = SystemConfig::default();

        let mut cmd = command(messages.clone(), &["SUBJECT", "lunch plans"]);
        assert_eq!("* SEARCH 1 2", run(&cmd, &config).unwrap());

        cmd = command(messages.clone(), &["FROM", "alice@example.com"]);
        assert_eq!("* SEARCH 1 3", run(&cmd, &config).unwrap());

        // Without --maildir-flags, nothing is flagged
        cmd = command(messages.clone(), &["FLAGGED"]);
        assert_eq!("* SEARCH", run(&cmd, &config).unwrap());

        cmd.maildir_flags = true;
        assert_eq!("* SEARCH 3", run(&cmd, &config).unwrap());

        cmd = command(messages.clone(), &["NEW"]);
        cmd.maildir_flags = true;
        assert_eq!("* SEARCH 2", run(&cmd, &config).unwrap());

        cmd = command(
            messages.clone(),
            &["KEYWORD", "$Imported", "UID", "2:*"],
        );
        cmd.flag.push(Flag::Keyword("$Imported".to_owned()));
        assert_eq!("* SEARCH 2 3", run(&cmd, &config).unwrap());

        cmd.no_uids = true;
        assert_eq!("* SEARCH", run(&cmd, &config).unwrap());

        cmd = command(messages.clone(), &[]);
        assert_eq!("* SEARCH 1 2 3", run(&cmd, &config).unwrap());
    }

    #[test]
    fn search_errors() {
        let root = TempDir::new().unwrap();
        let a = write_message(root.path(), "a", "Subject: hi");
        let config = SystemConfig::default();

        assert_matches!(
            Err(Error::UnknownSearchKey(..)),
            run(&command(vec![a.clone()], &["BODY", "hi"]), &config)
        );
        assert_matches!(
            Err(Error::MissingParameter(..)),
            run(&command(vec![a.clone()], &["SUBJECT"]), &config)
        );
        assert_matches!(
            Err(Error::Io(..)),
            run(
                &command(vec![a, root.path().join("missing")], &["ALL"]),
                &config
            )
        );
    }
}
