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

//! Storage backends for the repository.
//!
//! The repository only ever deals in paths relative to the mail-data root; a
//! `Store` maps those onto something that holds bytes. `FsStore` is the real
//! thing. `MemStore` keeps everything in a map, which is what the
//! referential-integrity tests run against.
//!
//! Nothing is ever deleted outright. Records which own a directory are
//! retired with `archive()`, which moves the directory aside to a tombstone
//! name starting with `.`; since no valid domain or user name starts with a
//! dot, tombstones are invisible to listing.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use log::info;

use crate::support::error::Error;
use crate::support::file_ops::{self, IgnoreKinds};
use crate::support::service_account::ServiceAccount;

pub trait Store {
    /// Read the whole file at `path`, or `None` if there is no such file.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, Error>;
    /// Replace the whole content of the file at `path`, creating it if
    /// needed. The parent directory must exist.
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), Error>;
    /// Remove the file at `path`. It is not an error if it does not exist.
    fn remove(&self, path: &Path) -> Result<(), Error>;
    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> Result<bool, Error>;
    fn is_dir(&self, path: &Path) -> Result<bool, Error>;
    /// List the names of the directories directly inside `path`, in byte
    /// order.
    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, Error>;
    /// Create the directory `path`, which must not exist yet.
    fn create_dir(&self, path: &Path) -> Result<(), Error>;
    /// Move the directory at `path` to its tombstone for `stamp`.
    ///
    /// Returns the tombstone path.
    fn archive(&self, path: &Path, stamp: &str) -> Result<PathBuf, Error>;
}

/// Return the path that `path` is moved to when it is archived at `stamp`.
///
/// `domains/example.com` becomes `domains/.example.com.deleted.<stamp>`.
pub fn tombstone_path(path: &Path, stamp: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.deleted.{}", name, stamp))
}

/// A `Store` backed by a directory on the local file system.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
    owner: Option<ServiceAccount>,
}

impl FsStore {
    /// Create a store rooted at `root`.
    ///
    /// If `owner` is given, everything the store creates is handed over to
    /// that account.
    pub fn new(root: impl Into<PathBuf>, owner: Option<ServiceAccount>) -> Self {
        FsStore {
            root: root.into(),
            owner,
        }
    }

    fn chown(&self, path: &Path) -> Result<(), Error> {
        if let Some(ref owner) = self.owner {
            owner.chown(path)?;
        }
        Ok(())
    }
}

impl Store for FsStore {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, Error> {
        Ok(file_ops::slurp(self.root.join(path))?)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), Error> {
        let path = self.root.join(path);
        file_ops::spit(&path, 0o600, data)?;
        self.chown(&path)
    }

    fn remove(&self, path: &Path) -> Result<(), Error> {
        fs::remove_file(self.root.join(path)).ignore_not_found()?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> Result<bool, Error> {
        match fs::symlink_metadata(self.root.join(path)) {
            Ok(_) => Ok(true),
            Err(e) if io::ErrorKind::NotFound == e.kind() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn is_dir(&self, path: &Path) -> Result<bool, Error> {
        match fs::metadata(self.root.join(path)) {
            Ok(md) => Ok(md.is_dir()),
            Err(e) if io::ErrorKind::NotFound == e.kind() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root.join(path))? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        names.sort_unstable();
        Ok(names)
    }

    fn create_dir(&self, path: &Path) -> Result<(), Error> {
        let path = self.root.join(path);
        fs::DirBuilder::new().mode(0o700).create(&path)?;
        self.chown(&path)
    }

    fn archive(&self, path: &Path, stamp: &str) -> Result<PathBuf, Error> {
        let tombstone = tombstone_path(path, stamp);
        let dst = self.root.join(&tombstone);
        // rename(2) would happily replace an empty directory
        if dst.symlink_metadata().is_ok() {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists).into());
        }

        fs::rename(self.root.join(path), &dst)?;
        info!("Archived '{}' as '{}'", path.display(), tombstone.display());
        Ok(tombstone)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// A `Store` which exists only in memory.
///
/// The root directory always exists.
#[derive(Debug, Default)]
pub struct MemStore {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, path: &Path) -> Option<Node> {
        if path.as_os_str().is_empty() {
            return Some(Node::Dir);
        }

        self.nodes.borrow().get(path).cloned()
    }

    fn require_parent_dir(&self, path: &Path) -> Result<(), Error> {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        match self.node(parent) {
            Some(Node::Dir) => Ok(()),
            _ => Err(io::Error::from(io::ErrorKind::NotFound).into()),
        }
    }
}

impl Store for MemStore {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, Error> {
        match self.node(path) {
            None => Ok(None),
            Some(Node::File(data)) => Ok(Some(data)),
            Some(Node::Dir) => {
                Err(io::Error::new(io::ErrorKind::Other, "is a directory")
                    .into())
            }
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<(), Error> {
        self.require_parent_dir(path)?;
        if let Some(Node::Dir) = self.node(path) {
            return Err(
                io::Error::new(io::ErrorKind::Other, "is a directory").into()
            );
        }

        self.nodes
            .borrow_mut()
            .insert(path.to_owned(), Node::File(data.to_vec()));
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), Error> {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get(path) {
            Some(Node::Dir) => {
                Err(io::Error::new(io::ErrorKind::Other, "is a directory")
                    .into())
            }
            Some(Node::File(_)) => {
                nodes.remove(path);
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn exists(&self, path: &Path) -> Result<bool, Error> {
        Ok(self.node(path).is_some())
    }

    fn is_dir(&self, path: &Path) -> Result<bool, Error> {
        Ok(Some(Node::Dir) == self.node(path))
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<String>, Error> {
        if !self.is_dir(path)? {
            return Err(io::Error::from(io::ErrorKind::NotFound).into());
        }

        // BTreeMap order over paths is component-wise, so the result is
        // already sorted
        Ok(self
            .nodes
            .borrow()
            .iter()
            .filter(|&(p, node)| {
                Node::Dir == *node && p.parent() == Some(path)
            })
            .filter_map(|(p, _)| {
                p.file_name().and_then(|n| n.to_str()).map(str::to_owned)
            })
            .collect())
    }

    fn create_dir(&self, path: &Path) -> Result<(), Error> {
        self.require_parent_dir(path)?;
        if self.exists(path)? {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists).into());
        }

        self.nodes.borrow_mut().insert(path.to_owned(), Node::Dir);
        Ok(())
    }

    fn archive(&self, path: &Path, stamp: &str) -> Result<PathBuf, Error> {
        if !self.is_dir(path)? {
            return Err(io::Error::from(io::ErrorKind::NotFound).into());
        }

        let tombstone = tombstone_path(path, stamp);
        if self.exists(&tombstone)? {
            return Err(io::Error::from(io::ErrorKind::AlreadyExists).into());
        }

        let mut nodes = self.nodes.borrow_mut();
        let moved = nodes
            .keys()
            .filter(|p| p.starts_with(path))
            .cloned()
            .collect::<Vec<_>>();
        for old in moved {
            if let Some(node) = nodes.remove(&old) {
                let new = match old.strip_prefix(path) {
                    Ok(rest) if !rest.as_os_str().is_empty() => {
                        tombstone.join(rest)
                    }
                    _ => tombstone.clone(),
                };
                nodes.insert(new, node);
            }
        }

        Ok(tombstone)
    }
}
