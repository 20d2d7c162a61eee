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

//! Miscellaneous functions for working with files.

use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

/// Write `data` into the file at `path`, atomically.
///
/// The file is first staged in the directory containing `path`, so the final
/// rename never crosses a file system boundary. Readers see either the old
/// content or the new content, never a truncated file.
pub fn spit(path: impl AsRef<Path>, mode: u32, data: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tf = tempfile::NamedTempFile::new_in(dir)?;
    tf.as_file_mut().write_all(data)?;
    chmod(tf.path(), mode)?;
    tf.as_file_mut().sync_all()?;
    tf.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read the whole file at `path`.
///
/// Returns `None` if the file does not exist.
pub fn slurp(path: impl AsRef<Path>) -> io::Result<Option<Vec<u8>>> {
    let mut data = Vec::new();
    match fs::File::open(path) {
        Ok(mut f) => {
            f.read_to_end(&mut data)?;
            Ok(Some(data))
        }
        Err(e) if io::ErrorKind::NotFound == e.kind() => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn chmod(path: impl AsRef<Path>, mode: u32) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

pub trait IgnoreKinds {
    fn ignore_already_exists(self) -> Self;
    fn ignore_not_found(self) -> Self;
}

impl<R: Default> IgnoreKinds for Result<R, io::Error> {
    fn ignore_already_exists(self) -> Self {
        match self {
            Ok(r) => Ok(r),
            Err(e) if io::ErrorKind::AlreadyExists == e.kind() => {
                Ok(R::default())
            }
            Err(e) => Err(e),
        }
    }

    fn ignore_not_found(self) -> Self {
        match self {
            Ok(r) => Ok(r),
            Err(e) if io::ErrorKind::NotFound == e.kind() => Ok(R::default()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn spit_replaces_content() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("index");

        spit(&path, 0o600, b"first\n").unwrap();
        spit(&path, 0o600, b"second\n").unwrap();

        assert_eq!(Some(b"second\n".to_vec()), slurp(&path).unwrap());
        assert_eq!(
            0o600,
            fs::metadata(&path).unwrap().permissions().mode() & 0o777
        );
        // Only the target remains; the staging file was renamed over it
        assert_eq!(1, fs::read_dir(root.path()).unwrap().count());
    }

    #[test]
    fn slurp_missing_is_none() {
        let root = TempDir::new().unwrap();
        assert_eq!(None, slurp(root.path().join("nx")).unwrap());
    }

    #[test]
    fn ignore_kinds() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("d")).unwrap();
        fs::create_dir(root.path().join("d"))
            .ignore_already_exists()
            .unwrap();
        fs::remove_file(root.path().join("nx"))
            .ignore_not_found()
            .unwrap();
        assert!(fs::remove_file(root.path().join("d"))
            .ignore_not_found()
            .is_err());
    }
}
