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

use std::path::{Path, PathBuf};

use log::info;

use super::store::Store;
use super::*;
use crate::model::CatchAllUser;

impl<S: Store> Repository<S> {
    /// Return the catch-all user of `domain_name`, if it has one.
    ///
    /// Only the first line of the marker file is significant.
    pub fn catch_all_user(
        &self,
        domain_name: &str,
    ) -> Result<Option<CatchAllUser>, Error> {
        self.require_domain(domain_name)?;

        let data = match self.store.read(&catch_all_path(domain_name))? {
            Some(data) => data,
            None => return Ok(None),
        };
        let text = String::from_utf8(data)
            .map_err(|_| Error::InvalidFormatCatchAllUser)?;

        match text.lines().next().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => CatchAllUser::new(name).map(Some),
        }
    }

    /// Make `catch_all_user` the catch-all of `domain_name`.
    ///
    /// The named user must exist in the domain.
    pub fn catch_all_user_set(
        &self,
        domain_name: &str,
        catch_all_user: &CatchAllUser,
    ) -> Result<(), Error> {
        if self.user(domain_name, catch_all_user.name())?.is_none() {
            return Err(Error::UserNotExist);
        }

        self.store.write(
            &catch_all_path(domain_name),
            format!("{}\n", catch_all_user.name()).as_bytes(),
        )?;

        info!(
            "Set catch-all of {} to {}",
            domain_name,
            catch_all_user.name()
        );
        Ok(())
    }

    pub fn catch_all_user_unset(&self, domain_name: &str) -> Result<(), Error> {
        self.require_domain(domain_name)?;
        self.store.write(&catch_all_path(domain_name), b"")?;

        info!("Unset catch-all of {}", domain_name);
        Ok(())
    }
}

fn catch_all_path(domain_name: &str) -> PathBuf {
    Path::new(domain_name).join(FILE_NAME_CATCH_ALL_USER)
}
