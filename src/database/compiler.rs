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

use std::path::Path;
use std::process::Command;

use log::{debug, error};

use crate::support::error::Error;

/// Which flavour of lookup table a text file is compiled into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    /// A `key value` table, as built by `postmap`.
    Map,
    /// A `key: value` aliases table, as built by `postalias`.
    Alias,
}

/// Turns a flat text table into whatever indexed form the mail system reads.
pub trait IndexCompiler {
    fn compile(&self, kind: IndexKind, path: &Path) -> Result<(), Error>;
}

/// An `IndexCompiler` which runs an external program on the file.
#[derive(Clone, Debug)]
pub struct CommandCompiler {
    pub postmap: String,
    pub postalias: String,
}

impl IndexCompiler for CommandCompiler {
    fn compile(&self, kind: IndexKind, path: &Path) -> Result<(), Error> {
        let program = match kind {
            IndexKind::Map => &self.postmap,
            IndexKind::Alias => &self.postalias,
        };

        debug!("Running {} {}", program, path.display());
        let status = Command::new(program).arg(path).status().map_err(|e| {
            error!("Failed to run {}: {}", program, e);
            e
        })?;

        if !status.success() {
            error!("{} {} failed: {}", program, path.display(), status);
            return Err(Error::IndexCompileFailed {
                program: program.clone(),
                path: path.to_owned(),
                status,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn compiler(postmap: &str, postalias: &str) -> CommandCompiler {
        CommandCompiler {
            postmap: postmap.to_owned(),
            postalias: postalias.to_owned(),
        }
    }

    #[test]
    fn program_chosen_by_kind() {
        let c = compiler("true", "false");
        c.compile(IndexKind::Map, Path::new("/dev/null")).unwrap();
        assert_matches!(
            Err(Error::IndexCompileFailed { .. }),
            c.compile(IndexKind::Alias, Path::new("/dev/null"))
        );
    }

    #[test]
    fn failure_carries_details() {
        match compiler("false", "true")
            .compile(IndexKind::Map, Path::new("/tmp/domains"))
        {
            Err(Error::IndexCompileFailed {
                program,
                path,
                status,
            }) => {
                assert_eq!("false", program);
                assert_eq!(Path::new("/tmp/domains"), path);
                assert!(!status.success());
            }
            r => panic!("Unexpected result: {:?}", r),
        }
    }

    #[test]
    fn missing_program_is_io_error() {
        assert_matches!(
            Err(Error::Io(_)),
            compiler("/nonexistent/mailrepo-postmap", "true")
                .compile(IndexKind::Map, Path::new("/dev/null"))
        );
    }
}
