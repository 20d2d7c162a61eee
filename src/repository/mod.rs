//-
// Copyright (c) 2026, the Mailrepo authors
//
// This file is part of Mailrepo.
//
// Mailrepo is free software: you can  redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Mailrepo is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Mailrepo. If not, see <http://www.gnu.org/licenses/>.

//! The normalised record store.
//!
//! # File layout
//!
//! Paths are relative to the mail-data root (`domains/` by default).
//!
//! - `.valiasdomains` — one `alias:target` line per alias domain.
//! - `<domain>/` — one directory per domain.
//! - `<domain>/.vpasswd` — `user:hash` per user.
//! - `<domain>/.valiases` — `alias:target1,target2,...` per alias user.
//! - `<domain>/.vcatchall` — the catch-all user's name, or empty.
//! - `<domain>/.vdomaindisable` — present iff the domain is disabled.
//! - `<domain>/<user>/Maildir/{cur,new,tmp}` — the user's mailbox.
//! - `<domain>/<user>/.forward` — one forward address per line.
//!
//! The shared index files are always rewritten whole, sorted by name. There
//! is no locking; callers are expected to serialise access themselves.
//!
//! Integrity rules are checked against what is on disk at the moment of each
//! mutation, never against anything cached.
//!
//! Removal never deletes data. Domain and user directories are moved aside to
//! `.<name>.deleted.<timestamp>`; index entries are simply dropped.

use std::path::{Path, PathBuf};

use chrono::prelude::*;

use self::store::Store;
use crate::support::error::Error;

mod alias_domains;
mod alias_users;
mod catch_all;
mod domains;
mod mail_data;
pub mod store;
mod users;

pub use self::mail_data::MailData;

pub const FILE_NAME_ALIAS_DOMAINS: &str = ".valiasdomains";
pub const FILE_NAME_USERS_PASSWORD: &str = ".vpasswd";
pub const FILE_NAME_USER_FORWARDS: &str = ".forward";
pub const FILE_NAME_ALIAS_USERS: &str = ".valiases";
pub const FILE_NAME_CATCH_ALL_USER: &str = ".vcatchall";
pub const FILE_NAME_DOMAIN_DISABLE: &str = ".vdomaindisable";

pub const DIR_NAME_MAILDIR: &str = "Maildir";
pub const DIR_NAMES_MAILDIR_SUB: &[&str] = &["cur", "new", "tmp"];

/// Second granularity; two removals of the same name within one second
/// collide and the second fails.
const TOMBSTONE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub struct Repository<S> {
    store: S,
}

impl<S: Store> Repository<S> {
    pub fn new(store: S) -> Self {
        Repository { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Move the directory at `path` aside to a timestamped tombstone.
    fn archive(&self, path: &Path) -> Result<PathBuf, Error> {
        let stamp = Local::now().format(TOMBSTONE_TIMESTAMP_FORMAT).to_string();
        self.store.archive(path, &stamp)
    }

    /// Read a shared index file as `(name, value)` pairs.
    ///
    /// A missing file is an empty index. Any line which is not exactly
    /// `name:value` poisons the whole file; `bad_format` produces the error
    /// to report in that case.
    fn read_index(
        &self,
        path: &Path,
        bad_format: impl Fn() -> Error,
    ) -> Result<Vec<(String, String)>, Error> {
        let data = match self.store.read(path)? {
            Some(data) => data,
            None => return Ok(vec![]),
        };

        parse_index(&data).ok_or_else(bad_format)
    }

    /// Rewrite a shared index file from `records`, sorted by name.
    fn write_index(
        &self,
        path: &Path,
        records: Vec<(&str, String)>,
    ) -> Result<(), Error> {
        self.store.write(path, &format_index(records))
    }
}

fn parse_index(data: &[u8]) -> Option<Vec<(String, String)>> {
    let text = std::str::from_utf8(data).ok()?;
    text.lines()
        .map(|line| {
            let mut words = line.split(':');
            match (words.next(), words.next(), words.next()) {
                (Some(name), Some(value), None) => {
                    Some((name.to_owned(), value.to_owned()))
                }
                _ => None,
            }
        })
        .collect()
}

fn format_index(mut records: Vec<(&str, String)>) -> Vec<u8> {
    records.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (name, value) in records {
        out.push_str(name);
        out.push(':');
        out.push_str(&value);
        out.push('\n');
    }
    out.into_bytes()
}

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::TempDir;

    use super::store::{FsStore, MemStore};
    use super::*;
    use crate::model::*;

    pub(super) fn mem_repo() -> Repository<MemStore> {
        Repository::new(MemStore::new())
    }

    /// A repository with `example.com` holding `alice` and `bob`.
    pub(super) fn populated_repo() -> Repository<MemStore> {
        let repo = mem_repo();
        repo.domain_create(&Domain::new("example.com").unwrap())
            .unwrap();
        repo.user_create(
            "example.com",
            &User::new("alice", NEVER_MATCH_HASHED_PASSWORD, vec![]).unwrap(),
        )
        .unwrap();
        repo.user_create(
            "example.com",
            &User::new("bob", NEVER_MATCH_HASHED_PASSWORD, vec![]).unwrap(),
        )
        .unwrap();
        repo
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(Some(vec![]), parse_index(b""));
        assert_eq!(
            Some(vec![
                ("a".to_owned(), "1".to_owned()),
                ("b".to_owned(), "x,y".to_owned()),
            ]),
            parse_index(b"a:1\nb:x,y\n")
        );
        assert_eq!(
            Some(vec![("a".to_owned(), "".to_owned())]),
            parse_index(b"a:")
        );
        assert_eq!(None, parse_index(b"a:1\nb\n"));
        assert_eq!(None, parse_index(b"a:1:2\n"));
        assert_eq!(None, parse_index(b"a:1\n\n"));
        assert_eq!(None, parse_index(b"a:\xff\n"));
    }

    #[test]
    fn test_format_index() {
        assert_eq!(
            b"alpha:1\nbeta:2\nzulu:3\n".to_vec(),
            format_index(vec![
                ("zulu", "3".to_owned()),
                ("alpha", "1".to_owned()),
                ("beta", "2".to_owned()),
            ])
        );
        // Byte order, not case-insensitive
        assert_eq!(
            b"Zed:1\nalpha:2\n".to_vec(),
            format_index(vec![
                ("alpha", "2".to_owned()),
                ("Zed", "1".to_owned()),
            ])
        );
        assert!(format_index(vec![]).is_empty());
    }

    #[test]
    fn on_disk_layout() {
        let root = TempDir::new().unwrap();
        let repo = Repository::new(FsStore::new(root.path(), None));

        repo.domain_create(&Domain::new("example.com").unwrap())
            .unwrap();
        repo.user_create(
            "example.com",
            &User::new(
                "alice",
                "{PLAIN}secret",
                vec!["x@y.com".to_owned(), "z@y.com".to_owned()],
            )
            .unwrap(),
        )
        .unwrap();
        repo.alias_user_create(
            "example.com",
            &AliasUser::new(
                "info",
                vec!["alice@example.com".to_owned(), "ab@b.org".to_owned()],
            )
            .unwrap(),
        )
        .unwrap();
        repo.alias_domain_create(
            &AliasDomain::new("example.net", "example.com").unwrap(),
        )
        .unwrap();
        repo.catch_all_user_set(
            "example.com",
            &CatchAllUser::new("alice").unwrap(),
        )
        .unwrap();

        let domain_dir = root.path().join("example.com");
        for sub in DIR_NAMES_MAILDIR_SUB {
            assert!(domain_dir.join("alice/Maildir").join(sub).is_dir());
        }
        assert_eq!(
            "alice:{PLAIN}secret\n",
            fs::read_to_string(domain_dir.join(FILE_NAME_USERS_PASSWORD))
                .unwrap()
        );
        assert_eq!(
            "x@y.com\nz@y.com\n",
            fs::read_to_string(
                domain_dir.join("alice").join(FILE_NAME_USER_FORWARDS)
            )
            .unwrap()
        );
        assert_eq!(
            "info:alice@example.com,ab@b.org\n",
            fs::read_to_string(domain_dir.join(FILE_NAME_ALIAS_USERS))
                .unwrap()
        );
        assert_eq!(
            "alice\n",
            fs::read_to_string(domain_dir.join(FILE_NAME_CATCH_ALL_USER))
                .unwrap()
        );
        assert_eq!(
            "example.net:example.com\n",
            fs::read_to_string(root.path().join(FILE_NAME_ALIAS_DOMAINS))
                .unwrap()
        );

        repo.catch_all_user_unset("example.com").unwrap();
        repo.user_remove("example.com", "alice").unwrap();
        assert!(!domain_dir.join("alice").exists());
        let tombstones = fs::read_dir(&domain_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|n| n.starts_with(".alice.deleted."))
            .collect::<Vec<_>>();
        assert_eq!(1, tombstones.len());
        assert!(domain_dir
            .join(&tombstones[0])
            .join("Maildir/cur")
            .is_dir());
        assert_eq!(
            "",
            fs::read_to_string(domain_dir.join(FILE_NAME_USERS_PASSWORD))
                .unwrap()
        );

        // The tombstone is not mistaken for a user
        assert!(repo.users("example.com").unwrap().is_empty());
    }

    #[test]
    fn missing_index_files_read_as_empty() {
        let repo = mem_repo();
        repo.store().create_dir(Path::new("example.com")).unwrap();

        assert!(repo.alias_domains().unwrap().is_empty());
        assert!(repo.users("example.com").unwrap().is_empty());
        assert!(repo.alias_users("example.com").unwrap().is_empty());
        assert_eq!(None, repo.catch_all_user("example.com").unwrap());
    }
}
