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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use super::error::Error;
use super::file_ops::{self, IgnoreKinds};
use crate::repository::FILE_NAME_ALIAS_DOMAINS;

/// The directory under the repository root which marks it as a repository.
pub const DIR_NAME_CONFIG: &str = ".mailrepo";
pub const FILE_NAME_CONFIG: &str = "config.toml";
/// Optional `log4rs` configuration used when not attached to a terminal.
pub const FILE_NAME_LOGGING: &str = "logging.toml";

/// The configuration of one repository.
///
/// This is stored in `.mailrepo/config.toml` under the repository root.
/// Every field is optional in the file.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Where the generated lookup tables are written.
    ///
    /// Relative paths are relative to the repository root.
    pub dir_database: PathBuf,
    /// Where domains, users and their mailboxes live.
    ///
    /// Relative paths are relative to the repository root.
    pub dir_maildata: PathBuf,
    /// The UNIX user which owns the mail data and receives virtual mail.
    ///
    /// Mail to this user is discarded by the generated aliases table.
    pub username: String,
    /// The UNIX group which owns the mail data.
    pub groupname: String,
    /// The program which compiles `key value` tables.
    pub postmap: String,
    /// The program which compiles aliases tables.
    pub postalias: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            dir_database: PathBuf::from("./etc"),
            dir_maildata: PathBuf::from("./domains"),
            username: "mailrepo".to_owned(),
            groupname: "mailrepo".to_owned(),
            postmap: "postmap".to_owned(),
            postalias: "postalias".to_owned(),
        }
    }
}

impl RepositoryConfig {
    /// Make the directory paths absolute against `root`.
    fn resolve(&mut self, root: &Path) {
        if self.dir_database.is_relative() {
            self.dir_database = root.join(&self.dir_database);
        }
        if self.dir_maildata.is_relative() {
            self.dir_maildata = root.join(&self.dir_maildata);
        }
    }
}

/// Find the repository containing `start` and load its configuration.
///
/// `start` and each of its ancestors in turn is checked for a `.mailrepo`
/// directory. The returned configuration has absolute directory paths.
pub fn open_repository(
    start: &Path,
) -> Result<(PathBuf, RepositoryConfig), Error> {
    let mut root = absolute(start)?;
    loop {
        match fs::metadata(root.join(DIR_NAME_CONFIG)) {
            Ok(md) if md.is_dir() => break,
            Ok(_) => return Err(Error::InvalidRepository),
            Err(e) if io::ErrorKind::NotFound == e.kind() => (),
            Err(e) => return Err(e.into()),
        }

        if !root.pop() {
            return Err(Error::NotRepository);
        }
    }

    let config_path = root.join(DIR_NAME_CONFIG).join(FILE_NAME_CONFIG);
    if fs::metadata(&config_path)?.is_dir() {
        return Err(Error::InvalidRepository);
    }

    let mut config: RepositoryConfig =
        toml::from_str(&fs::read_to_string(&config_path)?)?;
    config.resolve(&root);
    Ok((root, config))
}

/// Turn `root` into a new repository with the default configuration.
///
/// Existing directories are reused, but an existing configuration file is an
/// error. Returns the configuration with absolute directory paths.
pub fn init_repository(root: &Path) -> Result<RepositoryConfig, Error> {
    let root = absolute(root)?;

    let config_dir = root.join(DIR_NAME_CONFIG);
    ensure_dir(&config_dir)?;

    let config_path = config_dir.join(FILE_NAME_CONFIG);
    match fs::metadata(&config_path) {
        Ok(md) if md.is_dir() => return Err(Error::InvalidRepository),
        Ok(_) => return Err(Error::RepositoryExist),
        Err(e) if io::ErrorKind::NotFound == e.kind() => (),
        Err(e) => return Err(e.into()),
    }

    let mut config = RepositoryConfig::default();
    file_ops::spit(
        &config_path,
        0o644,
        toml::to_string_pretty(&config)?.as_bytes(),
    )?;

    config.resolve(&root);
    ensure_dir(&config.dir_database)?;
    ensure_dir(&config.dir_maildata)?;

    let alias_domains_path = config.dir_maildata.join(FILE_NAME_ALIAS_DOMAINS);
    match fs::metadata(&alias_domains_path) {
        Ok(md) if md.is_dir() => return Err(Error::InvalidRepository),
        Ok(_) => (),
        Err(e) if io::ErrorKind::NotFound == e.kind() => {
            file_ops::spit(&alias_domains_path, 0o600, b"")?;
        }
        Err(e) => return Err(e.into()),
    }

    info!("Initialised repository in {}", root.display());
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf, Error> {
    if path.is_absolute() {
        Ok(path.to_owned())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Create `path` if needed; anything other than a directory there is an
/// invalid repository.
fn ensure_dir(path: &Path) -> Result<(), Error> {
    fs::create_dir(path).ignore_already_exists()?;
    if !fs::metadata(path)?.is_dir() {
        return Err(Error::InvalidRepository);
    }
    Ok(())
}
