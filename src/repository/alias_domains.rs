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

use log::info;

use super::store::Store;
use super::*;
use crate::model::AliasDomain;
use crate::support::valid::valid_alias_domain_name;

impl<S: Store> Repository<S> {
    /// List every alias domain, in file order.
    pub fn alias_domains(&self) -> Result<Vec<AliasDomain>, Error> {
        self.read_index(Path::new(FILE_NAME_ALIAS_DOMAINS), || {
            Error::InvalidFormatAliasDomain
        })?
        .into_iter()
        .map(|(name, target)| AliasDomain::new(name, target))
        .collect()
    }

    pub fn alias_domain(
        &self,
        name: &str,
    ) -> Result<Option<AliasDomain>, Error> {
        if !valid_alias_domain_name(name) {
            return Err(Error::InvalidAliasDomainName);
        }

        Ok(self
            .alias_domains()?
            .into_iter()
            .find(|ad| ad.name() == name))
    }

    /// Add `alias_domain` to the index.
    ///
    /// The name must not be used by an alias domain or a domain, and the
    /// target domain must exist. The target is not tracked afterwards;
    /// instead, the target domain refuses removal while it is referenced.
    pub fn alias_domain_create(
        &self,
        alias_domain: &AliasDomain,
    ) -> Result<(), Error> {
        let mut alias_domains = self.alias_domains()?;
        if alias_domains.iter().any(|ad| ad.name() == alias_domain.name()) {
            return Err(Error::AliasDomainAlreadyExist);
        }
        if self.domain(alias_domain.name())?.is_some() {
            return Err(Error::DomainAlreadyExist);
        }
        if self.domain(alias_domain.target())?.is_none() {
            return Err(Error::DomainNotExist);
        }

        alias_domains.push(alias_domain.clone());
        self.write_alias_domains(&alias_domains)?;

        info!(
            "Created alias domain {} -> {}",
            alias_domain.name(),
            alias_domain.target()
        );
        Ok(())
    }

    pub fn alias_domain_remove(&self, name: &str) -> Result<(), Error> {
        if self.alias_domain(name)?.is_none() {
            return Err(Error::AliasDomainNotExist);
        }

        let mut alias_domains = self.alias_domains()?;
        alias_domains.retain(|ad| ad.name() != name);
        self.write_alias_domains(&alias_domains)?;

        info!("Removed alias domain {}", name);
        Ok(())
    }

    fn write_alias_domains(
        &self,
        alias_domains: &[AliasDomain],
    ) -> Result<(), Error> {
        self.write_index(
            Path::new(FILE_NAME_ALIAS_DOMAINS),
            alias_domains
                .iter()
                .map(|ad| (ad.name(), ad.target().to_owned()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::super::test::*;
    use super::*;
    use crate::model::Domain;

    fn alias(name: &str, target: &str) -> AliasDomain {
        AliasDomain::new(name, target).unwrap()
    }

    #[test]
    fn create_get_remove() {
        let repo = populated_repo();
        assert_eq!(None, repo.alias_domain("example.net").unwrap());

        repo.alias_domain_create(&alias("example.org", "example.com"))
            .unwrap();
        repo.alias_domain_create(&alias("example.net", "example.com"))
            .unwrap();
        assert_eq!(
            Some(alias("example.net", "example.com")),
            repo.alias_domain("example.net").unwrap()
        );

        // Rewritten sorted regardless of insertion order
        assert_eq!(
            Some(
                b"example.net:example.com\nexample.org:example.com\n".to_vec()
            ),
            repo.store()
                .read(Path::new(FILE_NAME_ALIAS_DOMAINS))
                .unwrap()
        );

        assert_matches!(
            Err(Error::AliasDomainAlreadyExist),
            repo.alias_domain_create(&alias("example.net", "example.com"))
        );

        repo.alias_domain_remove("example.net").unwrap();
        assert_eq!(None, repo.alias_domain("example.net").unwrap());
        assert_eq!(1, repo.alias_domains().unwrap().len());
        assert_matches!(
            Err(Error::AliasDomainNotExist),
            repo.alias_domain_remove("example.net")
        );
    }

    #[test]
    fn name_shadowed_by_domain() {
        let repo = populated_repo();
        repo.domain_create(&Domain::new("example.org").unwrap())
            .unwrap();
        assert_matches!(
            Err(Error::DomainAlreadyExist),
            repo.alias_domain_create(&alias("example.org", "example.com"))
        );
    }

    #[test]
    fn target_must_exist() {
        let repo = populated_repo();
        assert_matches!(
            Err(Error::DomainNotExist),
            repo.alias_domain_create(&alias("example.net", "example.info"))
        );
        assert!(repo.alias_domains().unwrap().is_empty());
    }

    #[test]
    fn target_may_be_disabled() {
        let repo = populated_repo();
        let mut domain = repo.domain("example.com").unwrap().unwrap();
        domain.set_disabled(true);
        repo.domain_update(&domain).unwrap();

        repo.alias_domain_create(&alias("example.net", "example.com"))
            .unwrap();
    }

    #[test]
    fn malformed_index_is_fatal() {
        let repo = populated_repo();
        repo.store()
            .write(
                Path::new(FILE_NAME_ALIAS_DOMAINS),
                b"example.net:example.com\nexample.org\n",
            )
            .unwrap();

        assert_matches!(
            Err(Error::InvalidFormatAliasDomain),
            repo.alias_domains()
        );
        assert_matches!(
            Err(Error::InvalidFormatAliasDomain),
            repo.alias_domain("example.net")
        );
        // Nothing that depends on the alias domain index can proceed either
        assert_matches!(
            Err(Error::InvalidFormatAliasDomain),
            repo.domain_create(&Domain::new("example.info").unwrap())
        );
        assert_matches!(
            Err(Error::InvalidFormatAliasDomain),
            repo.domain_remove("example.com")
        );
    }

    #[test]
    fn invalid_record_is_fatal() {
        let repo = populated_repo();
        repo.store()
            .write(Path::new(FILE_NAME_ALIAS_DOMAINS), b"example.net:x.1\n")
            .unwrap();
        assert_matches!(
            Err(Error::InvalidAliasDomainTarget),
            repo.alias_domains()
        );
    }
}
