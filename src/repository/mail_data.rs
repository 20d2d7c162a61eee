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

use super::store::Store;
use super::*;
use crate::model::{AliasDomain, Domain};

/// Everything the database materializer needs, read in one pass.
///
/// This is a snapshot only in the loosest sense: nothing stops the files from
/// changing while it is being assembled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailData {
    pub domains: Vec<Domain>,
    pub alias_domains: Vec<AliasDomain>,
}

impl MailData {
    /// Put every collection into name order.
    pub fn sort(&mut self) {
        self.domains.sort_by(|a, b| a.name().cmp(b.name()));
        self.alias_domains.sort_by(|a, b| a.name().cmp(b.name()));
        for domain in &mut self.domains {
            domain.users.sort_by(|a, b| a.name().cmp(b.name()));
            domain.alias_users.sort_by(|a, b| a.name().cmp(b.name()));
        }
    }
}

impl<S: Store> Repository<S> {
    /// Read every domain, with its users, alias users and catch-all, plus
    /// every alias domain.
    pub fn mail_data(&self) -> Result<MailData, Error> {
        let mut domains = self.domains()?;
        let alias_domains = self.alias_domains()?;

        for domain in &mut domains {
            domain.users = self.users(domain.name())?;
            domain.alias_users = self.alias_users(domain.name())?;
            domain.catch_all_user = self.catch_all_user(domain.name())?;
        }

        Ok(MailData {
            domains,
            alias_domains,
        })
    }
}

#[cfg(test)]
mod test {
    use super::super::test::*;
    use super::*;
    use crate::model::*;

    #[test]
    fn aggregate_everything() {
        let repo = populated_repo();
        repo.domain_create(&Domain::new("example.org").unwrap())
            .unwrap();
        repo.alias_domain_create(
            &AliasDomain::new("example.net", "example.com").unwrap(),
        )
        .unwrap();
        repo.alias_user_create(
            "example.com",
            &AliasUser::new("info", vec!["alice@example.com".to_owned()])
                .unwrap(),
        )
        .unwrap();
        repo.catch_all_user_set(
            "example.com",
            &CatchAllUser::new("bob").unwrap(),
        )
        .unwrap();

        let md = repo.mail_data().unwrap();
        assert_eq!(2, md.domains.len());
        assert_eq!(1, md.alias_domains.len());

        let com = &md.domains[0];
        assert_eq!("example.com", com.name());
        assert_eq!(2, com.users.len());
        assert_eq!(1, com.alias_users.len());
        assert!(com.is_catch_all("bob"));

        let org = &md.domains[1];
        assert_eq!("example.org", org.name());
        assert!(org.users.is_empty());
        assert!(org.alias_users.is_empty());
        assert_eq!(None, org.catch_all_user);
    }

    #[test]
    fn broken_index_fails_aggregate() {
        let repo = populated_repo();
        repo.store()
            .write(Path::new("example.com/.valiases"), b"garbage\n")
            .unwrap();
        assert_matches!(Err(Error::InvalidFormatAliasUsers), repo.mail_data());
    }

    #[test]
    fn sort_orders_everything() {
        let user = |n: &str| {
            User::new(n, NEVER_MATCH_HASHED_PASSWORD, vec![]).unwrap()
        };
        let mut domain = Domain::new("b.com").unwrap();
        domain.users = vec![user("zed"), user("amy")];
        domain.alias_users = vec![
            AliasUser::new("yy", vec!["ab@b.com".to_owned()]).unwrap(),
            AliasUser::new("xx", vec!["ab@b.com".to_owned()]).unwrap(),
        ];

        let mut md = MailData {
            domains: vec![domain, Domain::new("a.com").unwrap()],
            alias_domains: vec![
                AliasDomain::new("d.com", "b.com").unwrap(),
                AliasDomain::new("c.com", "b.com").unwrap(),
            ],
        };
        md.sort();

        assert_eq!("a.com", md.domains[0].name());
        assert_eq!("amy", md.domains[1].users[0].name());
        assert_eq!("xx", md.domains[1].alias_users[0].name());
        assert_eq!("c.com", md.alias_domains[0].name());
    }
}
