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

//! The records kept in the repository.
//!
//! All of these are identified by name, and every name is checked against the
//! rules in `support::valid` on construction. References between records
//! (catch-all to user, alias domain to domain) are plain names; they are
//! resolved by the repository when it matters.

use crate::support::error::Error;
use crate::support::valid::*;

/// Stored in place of a password hash when the user has no password.
///
/// Nothing hashes to this, so the user can receive mail but cannot log in.
pub const NEVER_MATCH_HASHED_PASSWORD: &str = "{PLAIN}!!";

/// A virtual mail domain hosted by the repository.
///
/// The collections are only populated when the domain is part of a
/// `MailData` snapshot; the repository otherwise hands out bare domains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    name: String,
    disabled: bool,
    pub users: Vec<User>,
    pub alias_users: Vec<AliasUser>,
    pub catch_all_user: Option<CatchAllUser>,
}

impl Domain {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if !valid_domain_name(&name) {
            return Err(Error::InvalidDomainName);
        }

        Ok(Domain {
            name,
            disabled: false,
            users: vec![],
            alias_users: vec![],
            catch_all_user: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether `user_name` is this domain's catch-all.
    pub fn is_catch_all(&self, user_name: &str) -> bool {
        self.catch_all_user
            .as_ref()
            .map_or(false, |cu| cu.name() == user_name)
    }
}

/// A mailbox-owning account within a domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    name: String,
    hashed_password: String,
    forwards: Vec<String>,
}

impl User {
    pub fn new(
        name: impl Into<String>,
        hashed_password: impl Into<String>,
        forwards: Vec<String>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if !valid_user_name(&name) {
            return Err(Error::InvalidUserName);
        }

        Ok(User {
            name,
            hashed_password: hashed_password.into(),
            forwards,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    pub fn set_hashed_password(&mut self, hashed_password: impl Into<String>) {
        self.hashed_password = hashed_password.into();
    }

    /// Destinations that incoming mail is copied to, in order.
    pub fn forwards(&self) -> &[String] {
        &self.forwards
    }

    pub fn set_forwards(&mut self, forwards: Vec<String>) {
        self.forwards = forwards;
    }
}

/// A local part which redirects to one or more addresses without owning a
/// mailbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasUser {
    name: String,
    targets: Vec<String>,
}

impl AliasUser {
    pub fn new(
        name: impl Into<String>,
        targets: Vec<String>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if !valid_alias_user_name(&name) {
            return Err(Error::InvalidAliasUserName);
        }

        check_alias_user_targets(&targets)?;
        Ok(AliasUser { name, targets })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Replace the targets, subject to the same rules as construction.
    ///
    /// On error, the current targets are left alone.
    pub fn set_targets(&mut self, targets: Vec<String>) -> Result<(), Error> {
        check_alias_user_targets(&targets)?;
        self.targets = targets;
        Ok(())
    }
}

fn check_alias_user_targets(targets: &[String]) -> Result<(), Error> {
    if targets.is_empty() {
        return Err(Error::NotEnoughAliasUserTargets);
    }

    if targets.iter().any(|t| !valid_alias_user_target(t)) {
        return Err(Error::InvalidAliasUserTarget);
    }

    Ok(())
}

/// A domain name whose whole namespace is delivered as if it were `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasDomain {
    name: String,
    target: String,
}

impl AliasDomain {
    pub fn new(
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<Self, Error> {
        let name = name.into();
        let target = target.into();
        if !valid_alias_domain_name(&name) {
            return Err(Error::InvalidAliasDomainName);
        }
        if !valid_alias_domain_target(&target) {
            return Err(Error::InvalidAliasDomainTarget);
        }

        Ok(AliasDomain { name, target })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Names the user of a domain which receives mail for undefined local parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchAllUser {
    name: String,
}

impl CatchAllUser {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if !valid_catch_all_user_name(&name) {
            return Err(Error::InvalidCatchAllUserName);
        }

        Ok(CatchAllUser { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
