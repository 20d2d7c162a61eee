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

use log::{info, warn};

use super::store::Store;
use super::*;
use crate::model::Domain;
use crate::support::valid::valid_domain_name;

impl<S: Store> Repository<S> {
    /// List every domain, enabled or not.
    ///
    /// Directories whose names are not valid domain names are skipped. This
    /// includes the tombstones of removed domains.
    pub fn domains(&self) -> Result<Vec<Domain>, Error> {
        let mut domains = Vec::new();
        for name in self.store.list_dirs(Path::new(""))? {
            if !valid_domain_name(&name) {
                if !name.starts_with('.') {
                    warn!("Ignoring '{}': not a valid domain name", name);
                }
                continue;
            }

            let mut domain = Domain::new(name)?;
            domain.set_disabled(self.domain_disabled(domain.name())?);
            domains.push(domain);
        }

        Ok(domains)
    }

    /// Look up the domain called `name`.
    pub fn domain(&self, name: &str) -> Result<Option<Domain>, Error> {
        if !valid_domain_name(name) {
            return Err(Error::InvalidDomainName);
        }

        if !self.store.is_dir(Path::new(name))? {
            return Ok(None);
        }

        let mut domain = Domain::new(name)?;
        domain.set_disabled(self.domain_disabled(name)?);
        Ok(Some(domain))
    }

    pub(super) fn require_domain(&self, name: &str) -> Result<Domain, Error> {
        self.domain(name)?.ok_or(Error::DomainNotExist)
    }

    fn domain_disabled(&self, name: &str) -> Result<bool, Error> {
        self.store
            .exists(&Path::new(name).join(FILE_NAME_DOMAIN_DISABLE))
    }

    /// Create the storage for `domain`.
    ///
    /// Fails if a domain or an alias domain by that name already exists.
    pub fn domain_create(&self, domain: &Domain) -> Result<(), Error> {
        if self.domain(domain.name())?.is_some() {
            return Err(Error::DomainAlreadyExist);
        }
        if self.alias_domain(domain.name())?.is_some() {
            return Err(Error::AliasDomainAlreadyExist);
        }

        let dir = Path::new(domain.name());
        self.store.create_dir(dir)?;
        self.store.write(&dir.join(FILE_NAME_USERS_PASSWORD), b"")?;
        self.store.write(&dir.join(FILE_NAME_ALIAS_USERS), b"")?;
        self.store.write(&dir.join(FILE_NAME_CATCH_ALL_USER), b"")?;
        if domain.disabled() {
            self.store.write(&dir.join(FILE_NAME_DOMAIN_DISABLE), b"")?;
        }

        info!("Created domain {}", domain.name());
        Ok(())
    }

    /// Persist the disabled state of `domain`, which must already exist.
    pub fn domain_update(&self, domain: &Domain) -> Result<(), Error> {
        self.require_domain(domain.name())?;

        let marker = Path::new(domain.name()).join(FILE_NAME_DOMAIN_DISABLE);
        if domain.disabled() {
            self.store.write(&marker, b"")?;
            info!("Disabled domain {}", domain.name());
        } else {
            self.store.remove(&marker)?;
            info!("Enabled domain {}", domain.name());
        }

        Ok(())
    }

    /// Archive the domain called `name` with everything inside it.
    ///
    /// Fails if any alias domain still points at it.
    pub fn domain_remove(&self, name: &str) -> Result<(), Error> {
        self.require_domain(name)?;

        if self.alias_domains()?.iter().any(|ad| ad.target() == name) {
            return Err(Error::DomainIsAliasDomainTarget);
        }

        self.archive(Path::new(name))?;
        info!("Removed domain {}", name);
        Ok(())
    }
}
