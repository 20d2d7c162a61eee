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

//! Projection of the repository into the lookup tables read by Postfix and
//! Dovecot.
//!
//! Rendering is a pure function of a sorted `MailData`, so two runs over the
//! same repository produce byte-identical files. Disabled domains contribute
//! nothing to any table. Alias domains are listed in `domains` whatever the
//! state of their target, but only gain routes through an enabled target.
//!
//! The "pipe key" of a user is `<underscored domain>|<user>`, where the
//! underscored domain has every `-` replaced with `_`. Users with forwards
//! are routed to their pipe key in `destinations`; `localtable` claims every
//! pipe key of a domain for local delivery, and `forwards` expands the pipe
//! key to the forward list.

use std::path::PathBuf;

use log::info;

use crate::model::Domain;
use crate::repository::MailData;
use crate::support::error::Error;
use crate::support::file_ops;
use crate::support::service_account::ServiceAccount;

pub mod compiler;

use self::compiler::{IndexCompiler, IndexKind};

pub const FILE_NAME_DB_DOMAINS: &str = "domains";
pub const FILE_NAME_DB_DESTINATIONS: &str = "destinations";
pub const FILE_NAME_DB_MAILDIRS: &str = "maildirs";
pub const FILE_NAME_DB_LOCALTABLE: &str = "localtable";
pub const FILE_NAME_DB_FORWARDS: &str = "forwards";
pub const FILE_NAME_DB_PASSWORDS: &str = "vpasswd";

/// Where mail for users without forwards goes in the aliases table.
const DEV_NULL: &str = "/dev/null";

/// The text of every generated table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tables {
    pub domains: String,
    pub destinations: String,
    pub maildirs: String,
    pub localtable: String,
    pub forwards: String,
    pub passwords: String,
}

impl Tables {
    /// Render all tables from `md`, which must already be sorted.
    ///
    /// `service_user` is the UNIX account that owns the mail data; mail
    /// addressed to it locally is discarded.
    pub fn render(md: &MailData, service_user: &str) -> Self {
        let mut tables = Tables::default();

        for domain in md.domains.iter().filter(|d| !d.disabled()) {
            let alias_names = md
                .alias_domains
                .iter()
                .filter(|ad| ad.target() == domain.name())
                .map(|ad| ad.name())
                .collect::<Vec<_>>();

            tables.domains.push_str(&format!("{} virtual\n", domain.name()));
            tables.render_destinations(domain, &alias_names);
            tables.render_maildirs(domain);
            tables.localtable.push_str(&format!(
                "/^{}\\|.*$/ local\n",
                escaped(domain.name())
            ));
            tables.render_forwards(domain);
            tables.render_passwords(domain);
        }

        for alias_domain in &md.alias_domains {
            tables
                .domains
                .push_str(&format!("{} virtual\n", alias_domain.name()));
        }

        tables
            .forwards
            .push_str(&format!("{}:{}\n", service_user, DEV_NULL));

        tables
    }

    fn render_destinations(&mut self, domain: &Domain, alias_names: &[&str]) {
        let underscored = underscored(domain.name());

        for user in &domain.users {
            let local = if domain.is_catch_all(user.name()) {
                ""
            } else {
                user.name()
            };

            let rhs = if user.forwards().is_empty() {
                format!("{}@{}", user.name(), domain.name())
            } else {
                format!("{}|{}", underscored, user.name())
            };

            self.destinations
                .push_str(&format!("{}@{} {}\n", local, domain.name(), rhs));
            for alias_name in alias_names {
                self.destinations.push_str(&format!(
                    "{}@{} {}@{}\n",
                    local,
                    alias_name,
                    user.name(),
                    domain.name()
                ));
            }
        }

        for alias_user in &domain.alias_users {
            let targets = alias_user.targets().join(",");
            self.destinations.push_str(&format!(
                "{}@{} {}\n",
                alias_user.name(),
                domain.name(),
                targets
            ));
            for alias_name in alias_names {
                self.destinations.push_str(&format!(
                    "{name}@{alias} {name}@{domain}\n",
                    name = alias_user.name(),
                    alias = alias_name,
                    domain = domain.name()
                ));
            }
        }
    }

    fn render_maildirs(&mut self, domain: &Domain) {
        for user in &domain.users {
            self.maildirs.push_str(&format!(
                "{user}@{domain} {domain}/{user}/Maildir/\n",
                user = user.name(),
                domain = domain.name()
            ));
        }
    }

    fn render_forwards(&mut self, domain: &Domain) {
        let underscored = underscored(domain.name());
        for user in &domain.users {
            let rhs = if user.forwards().is_empty() {
                DEV_NULL.to_owned()
            } else {
                user.forwards().join(",")
            };
            self.forwards.push_str(&format!(
                "{}|{}:{}\n",
                underscored,
                user.name(),
                rhs
            ));
        }
    }

    fn render_passwords(&mut self, domain: &Domain) {
        for user in &domain.users {
            self.passwords.push_str(&format!(
                "{}@{}:{}\n",
                user.name(),
                domain.name(),
                user.hashed_password()
            ));
        }
    }
}

/// `ho-ge.example.com` -> `ho_ge.example.com`
fn underscored(domain_name: &str) -> String {
    domain_name.replace('-', "_")
}

/// `ho-ge.example.com` -> `ho_ge\.example\.com`
fn escaped(domain_name: &str) -> String {
    underscored(domain_name).replace('.', "\\.")
}

/// Writes the tables into the database directory and compiles them.
pub struct Materializer {
    db_dir: PathBuf,
    service_user: String,
    owner: Option<ServiceAccount>,
    compiler: Box<dyn IndexCompiler>,
}

impl Materializer {
    pub fn new(
        db_dir: impl Into<PathBuf>,
        service_user: impl Into<String>,
        owner: Option<ServiceAccount>,
        compiler: Box<dyn IndexCompiler>,
    ) -> Self {
        Materializer {
            db_dir: db_dir.into(),
            service_user: service_user.into(),
            owner,
            compiler,
        }
    }

    /// Regenerate every table from `md`.
    ///
    /// All files are written before the first one is compiled. A compiler
    /// failure stops the process; tables compiled before it stay as they are.
    pub fn generate(&self, mut md: MailData) -> Result<(), Error> {
        md.sort();
        let tables = Tables::render(&md, &self.service_user);

        let outputs: [(&str, &String, u32, Option<IndexKind>); 6] = [
            (
                FILE_NAME_DB_DOMAINS,
                &tables.domains,
                0o644,
                Some(IndexKind::Map),
            ),
            (
                FILE_NAME_DB_DESTINATIONS,
                &tables.destinations,
                0o644,
                Some(IndexKind::Map),
            ),
            (
                FILE_NAME_DB_MAILDIRS,
                &tables.maildirs,
                0o644,
                Some(IndexKind::Map),
            ),
            (
                FILE_NAME_DB_LOCALTABLE,
                &tables.localtable,
                0o644,
                Some(IndexKind::Map),
            ),
            (
                FILE_NAME_DB_FORWARDS,
                &tables.forwards,
                0o644,
                Some(IndexKind::Alias),
            ),
            // Password hashes are read as plain text by Dovecot
            (FILE_NAME_DB_PASSWORDS, &tables.passwords, 0o640, None),
        ];

        for &(name, data, mode, _) in &outputs {
            let path = self.db_dir.join(name);
            file_ops::spit(&path, mode, data.as_bytes())?;
            if let Some(ref owner) = self.owner {
                owner.chown(&path)?;
            }
        }

        for &(name, _, _, kind) in &outputs {
            if let Some(kind) = kind {
                self.compiler.compile(kind, &self.db_dir.join(name))?;
            }
        }

        info!(
            "Generated databases in {} ({} domains, {} alias domains)",
            self.db_dir.display(),
            md.domains.iter().filter(|d| !d.disabled()).count(),
            md.alias_domains.len()
        );
        Ok(())
    }
}
