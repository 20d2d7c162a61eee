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

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::store::Store;
use super::*;
use crate::model::{User, NEVER_MATCH_HASHED_PASSWORD};
use crate::support::valid::valid_user_name;

impl<S: Store> Repository<S> {
    /// List the users of `domain_name`.
    ///
    /// A user directory without an entry in the password index gets the
    /// never-matching password.
    pub fn users(&self, domain_name: &str) -> Result<Vec<User>, Error> {
        self.require_domain(domain_name)?;

        let hashed_passwords = self.users_hashed_password(domain_name)?;
        let mut users = Vec::new();
        for name in self.store.list_dirs(Path::new(domain_name))? {
            if !valid_user_name(&name) {
                if !name.starts_with('.') {
                    warn!(
                        "Ignoring '{}' in {}: not a valid user name",
                        name, domain_name
                    );
                }
                continue;
            }

            let forwards = self.user_forwards(domain_name, &name)?;
            let hashed_password = hashed_passwords
                .get(&name)
                .map(String::as_str)
                .unwrap_or(NEVER_MATCH_HASHED_PASSWORD)
                .to_owned();
            users.push(User::new(name, hashed_password, forwards)?);
        }

        Ok(users)
    }

    pub fn user(
        &self,
        domain_name: &str,
        user_name: &str,
    ) -> Result<Option<User>, Error> {
        self.require_domain(domain_name)?;

        if !valid_user_name(user_name) {
            return Err(Error::InvalidUserName);
        }

        if !self.store.is_dir(&user_dir(domain_name, user_name))? {
            return Ok(None);
        }

        let hashed_password = self
            .users_hashed_password(domain_name)?
            .remove(user_name)
            .unwrap_or_else(|| NEVER_MATCH_HASHED_PASSWORD.to_owned());
        let forwards = self.user_forwards(domain_name, user_name)?;
        User::new(user_name, hashed_password, forwards).map(Some)
    }

    /// Create `user` in `domain_name`, including an empty Maildir.
    ///
    /// The name must not be used by a user or an alias user of the domain.
    pub fn user_create(
        &self,
        domain_name: &str,
        user: &User,
    ) -> Result<(), Error> {
        self.require_domain(domain_name)?;

        if self.user(domain_name, user.name())?.is_some() {
            return Err(Error::UserAlreadyExist);
        }
        if self.alias_user(domain_name, user.name())?.is_some() {
            return Err(Error::AliasUserAlreadyExist);
        }

        let dir = user_dir(domain_name, user.name());
        let maildir = dir.join(DIR_NAME_MAILDIR);
        self.store.create_dir(&dir)?;
        self.store.create_dir(&maildir)?;
        for sub in DIR_NAMES_MAILDIR_SUB {
            self.store.create_dir(&maildir.join(sub))?;
        }

        self.write_user_forwards(domain_name, user)?;
        let mut hashed_passwords = self.users_hashed_password(domain_name)?;
        hashed_passwords.insert(
            user.name().to_owned(),
            user.hashed_password().to_owned(),
        );
        self.write_users_hashed_password(domain_name, &hashed_passwords)?;

        info!("Created user {}@{}", user.name(), domain_name);
        Ok(())
    }

    /// Persist the password and forwards of `user`, which must already exist.
    pub fn user_update(
        &self,
        domain_name: &str,
        user: &User,
    ) -> Result<(), Error> {
        if self.user(domain_name, user.name())?.is_none() {
            return Err(Error::UserNotExist);
        }

        let mut hashed_passwords = self.users_hashed_password(domain_name)?;
        hashed_passwords.insert(
            user.name().to_owned(),
            user.hashed_password().to_owned(),
        );
        self.write_users_hashed_password(domain_name, &hashed_passwords)?;
        self.write_user_forwards(domain_name, user)?;

        info!("Updated user {}@{}", user.name(), domain_name);
        Ok(())
    }

    /// Archive the user's directory and drop their password entry.
    ///
    /// Fails if the user is the domain's catch-all.
    pub fn user_remove(
        &self,
        domain_name: &str,
        user_name: &str,
    ) -> Result<(), Error> {
        if self.user(domain_name, user_name)?.is_none() {
            return Err(Error::UserNotExist);
        }

        if self
            .catch_all_user(domain_name)?
            .map_or(false, |cu| cu.name() == user_name)
        {
            return Err(Error::UserIsCatchAllUser);
        }

        let mut hashed_passwords = self.users_hashed_password(domain_name)?;
        self.archive(&user_dir(domain_name, user_name))?;
        hashed_passwords.remove(user_name);
        self.write_users_hashed_password(domain_name, &hashed_passwords)?;

        info!("Removed user {}@{}", user_name, domain_name);
        Ok(())
    }

    fn users_hashed_password(
        &self,
        domain_name: &str,
    ) -> Result<BTreeMap<String, String>, Error> {
        Ok(self
            .read_index(
                &Path::new(domain_name).join(FILE_NAME_USERS_PASSWORD),
                || Error::InvalidFormatUsersPassword,
            )?
            .into_iter()
            .collect())
    }

    fn write_users_hashed_password(
        &self,
        domain_name: &str,
        hashed_passwords: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        self.write_index(
            &Path::new(domain_name).join(FILE_NAME_USERS_PASSWORD),
            hashed_passwords
                .iter()
                .map(|(name, hash)| (name.as_str(), hash.clone()))
                .collect(),
        )
    }

    /// Blank lines in `.forward` are ignored.
    fn user_forwards(
        &self,
        domain_name: &str,
        user_name: &str,
    ) -> Result<Vec<String>, Error> {
        let path =
            user_dir(domain_name, user_name).join(FILE_NAME_USER_FORWARDS);
        let data = match self.store.read(&path)? {
            Some(data) => data,
            None => return Ok(vec![]),
        };

        let text = String::from_utf8(data)
            .map_err(|_| Error::InvalidFormatUserForwards)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// An empty forward list is stored as the absence of `.forward`.
    fn write_user_forwards(
        &self,
        domain_name: &str,
        user: &User,
    ) -> Result<(), Error> {
        let path =
            user_dir(domain_name, user.name()).join(FILE_NAME_USER_FORWARDS);
        if user.forwards().is_empty() {
            return self.store.remove(&path);
        }

        let mut data = String::new();
        for forward in user.forwards() {
            data.push_str(forward);
            data.push('\n');
        }
        self.store.write(&path, data.as_bytes())
    }
}

fn user_dir(domain_name: &str, user_name: &str) -> PathBuf {
    Path::new(domain_name).join(user_name)
}
