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

use log::{debug, error};
use nix::unistd::{Gid, Group, Uid, User};

use super::error::Error;

/// The UNIX user and group which own the mail data and generated databases.
///
/// Postfix and Dovecot run their virtual delivery as this account, so
/// everything the repository creates must end up owned by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceAccount {
    pub uid: Uid,
    pub gid: Gid,
}

impl ServiceAccount {
    /// Look up `user_name` and `group_name` in the system databases.
    pub fn resolve(user_name: &str, group_name: &str) -> Result<Self, Error> {
        let uid = match User::from_name(user_name) {
            Ok(Some(user)) => user.uid,
            Ok(None) => {
                return Err(Error::NoSuchServiceUser(user_name.to_owned()))
            }
            Err(e) => {
                error!("Unable to look up user '{}': {}", user_name, e);
                return Err(e.into());
            }
        };

        let gid = match Group::from_name(group_name) {
            Ok(Some(group)) => group.gid,
            Ok(None) => {
                return Err(Error::NoSuchServiceGroup(group_name.to_owned()))
            }
            Err(e) => {
                error!("Unable to look up group '{}': {}", group_name, e);
                return Err(e.into());
            }
        };

        debug!(
            "Service account {}:{} is {}:{}",
            user_name, group_name, uid, gid
        );
        Ok(ServiceAccount { uid, gid })
    }

    /// Resolve the service account only if this process could actually hand
    /// files over to it.
    ///
    /// An unprivileged process can only create files owned by itself, so
    /// there is nothing to resolve; files simply stay with the invoking user,
    /// which is expected to be the service account.
    pub fn resolve_if_root(
        user_name: &str,
        group_name: &str,
    ) -> Result<Option<Self>, Error> {
        if nix::unistd::ROOT != nix::unistd::getuid() {
            return Ok(None);
        }

        Self::resolve(user_name, group_name).map(Some)
    }

    /// The identity of the current process.
    #[cfg(test)]
    pub fn current() -> Self {
        ServiceAccount {
            uid: nix::unistd::getuid(),
            gid: nix::unistd::getgid(),
        }
    }

    pub fn chown(&self, path: &Path) -> Result<(), Error> {
        nix::unistd::chown(path, Some(self.uid), Some(self.gid))?;
        Ok(())
    }
}
