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
use crate::model::AliasUser;
use crate::support::valid::valid_alias_user_name;

impl<S: Store> Repository<S> {
    pub fn alias_users(
        &self,
        domain_name: &str,
    ) -> Result<Vec<AliasUser>, Error> {
        self.require_domain(domain_name)?;

        self.read_index(&alias_users_path(domain_name), || {
            Error::InvalidFormatAliasUsers
        })?
        .into_iter()
        .map(|(name, targets)| {
            AliasUser::new(
                name,
                targets.split(',').map(str::to_owned).collect(),
            )
        })
        .collect()
    }

    pub fn alias_user(
        &self,
        domain_name: &str,
        name: &str,
    ) -> Result<Option<AliasUser>, Error> {
        if !valid_alias_user_name(name) {
            return Err(Error::InvalidAliasUserName);
        }

        Ok(self
            .alias_users(domain_name)?
            .into_iter()
            .find(|au| au.name() == name))
    }

    /// Add `alias_user` to the domain.
    ///
    /// The name must not be used by an alias user or a real user.
    pub fn alias_user_create(
        &self,
        domain_name: &str,
        alias_user: &AliasUser,
    ) -> Result<(), Error> {
        let mut alias_users = self.alias_users(domain_name)?;
        if alias_users.iter().any(|au| au.name() == alias_user.name()) {
            return Err(Error::AliasUserAlreadyExist);
        }
        if self.user(domain_name, alias_user.name())?.is_some() {
            return Err(Error::UserAlreadyExist);
        }

        alias_users.push(alias_user.clone());
        self.write_alias_users(domain_name, &alias_users)?;

        info!("Created alias user {}@{}", alias_user.name(), domain_name);
        Ok(())
    }

    /// Replace the targets of an existing alias user.
    pub fn alias_user_update(
        &self,
        domain_name: &str,
        alias_user: &AliasUser,
    ) -> Result<(), Error> {
        let mut alias_users = self.alias_users(domain_name)?;
        let existing = alias_users
            .iter_mut()
            .find(|au| au.name() == alias_user.name())
            .ok_or(Error::AliasUserNotExist)?;
        *existing = alias_user.clone();
        self.write_alias_users(domain_name, &alias_users)?;

        info!("Updated alias user {}@{}", alias_user.name(), domain_name);
        Ok(())
    }

    pub fn alias_user_remove(
        &self,
        domain_name: &str,
        name: &str,
    ) -> Result<(), Error> {
        if self.alias_user(domain_name, name)?.is_none() {
            return Err(Error::AliasUserNotExist);
        }

        let mut alias_users = self.alias_users(domain_name)?;
        alias_users.retain(|au| au.name() != name);
        self.write_alias_users(domain_name, &alias_users)?;

        info!("Removed alias user {}@{}", name, domain_name);
        Ok(())
    }

    fn write_alias_users(
        &self,
        domain_name: &str,
        alias_users: &[AliasUser],
    ) -> Result<(), Error> {
        self.write_index(
            &alias_users_path(domain_name),
            alias_users
                .iter()
                .map(|au| (au.name(), au.targets().join(",")))
                .collect(),
        )
    }
}

fn alias_users_path(domain_name: &str) -> PathBuf {
    Path::new(domain_name).join(FILE_NAME_ALIAS_USERS)
}

#[cfg(test)]
mod test {
    use super::super::test::*;
    use super::*;
    use crate::model::{User, NEVER_MATCH_HASHED_PASSWORD};

    fn alias(name: &str, targets: &[&str]) -> AliasUser {
        AliasUser::new(name, targets.iter().map(|&s| s.to_owned()).collect())
            .unwrap()
    }

    #[test]
    fn create_update_remove() {
        let repo = populated_repo();
        assert_eq!(None, repo.alias_user("example.com", "info").unwrap());

        repo.alias_user_create(
            "example.com",
            &alias("support", &["bob@example.com"]),
        )
        .unwrap();
        repo.alias_user_create(
            "example.com",
            &alias("info", &["alice@example.com", "xy@y.org"]),
        )
        .unwrap();
        assert_eq!(
            Some(
                b"info:alice@example.com,xy@y.org\nsupport:bob@example.com\n"
                    .to_vec()
            ),
            repo.store()
                .read(Path::new("example.com/.valiases"))
                .unwrap()
        );

        repo.alias_user_update(
            "example.com",
            &alias("info", &["bob@example.com"]),
        )
        .unwrap();
        assert_eq!(
            Some(alias("info", &["bob@example.com"])),
            repo.alias_user("example.com", "info").unwrap()
        );

        repo.alias_user_remove("example.com", "info").unwrap();
        assert_eq!(None, repo.alias_user("example.com", "info").unwrap());
        assert_eq!(1, repo.alias_users("example.com").unwrap().len());

        assert_matches!(
            Err(Error::AliasUserNotExist),
            repo.alias_user_remove("example.com", "info")
        );
        assert_matches!(
            Err(Error::AliasUserNotExist),
            repo.alias_user_update(
                "example.com",
                &alias("info", &["bob@example.com"])
            )
        );
    }

    #[test]
    fn names_shared_with_users() {
        let repo = populated_repo();
        assert_matches!(
            Err(Error::UserAlreadyExist),
            repo.alias_user_create(
                "example.com",
                &alias("alice", &["bob@example.com"])
            )
        );

        repo.alias_user_create(
            "example.com",
            &alias("info", &["bob@example.com"]),
        )
        .unwrap();
        assert_matches!(
            Err(Error::AliasUserAlreadyExist),
            repo.alias_user_create(
                "example.com",
                &alias("info", &["alice@example.com"])
            )
        );
        assert_matches!(
            Err(Error::AliasUserAlreadyExist),
            repo.user_create(
                "example.com",
                &User::new("info", NEVER_MATCH_HASHED_PASSWORD, vec![])
                    .unwrap()
            )
        );
    }

    #[test]
    fn unknown_domain() {
        let repo = mem_repo();
        assert_matches!(
            Err(Error::DomainNotExist),
            repo.alias_users("example.com")
        );
        assert_matches!(
            Err(Error::DomainNotExist),
            repo.alias_user_create(
                "example.com",
                &alias("info", &["bob@example.com"])
            )
        );
    }

    #[test]
    fn malformed_index() {
        let repo = populated_repo();
        repo.store()
            .write(Path::new("example.com/.valiases"), b"info\n")
            .unwrap();
        assert_matches!(
            Err(Error::InvalidFormatAliasUsers),
            repo.alias_users("example.com")
        );

        repo.store()
            .write(Path::new("example.com/.valiases"), b"info:\n")
            .unwrap();
        assert_matches!(
            Err(Error::InvalidAliasUserTarget),
            repo.alias_users("example.com")
        );
    }
}
