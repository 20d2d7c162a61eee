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

use log::debug;

use crate::database::compiler::{CommandCompiler, IndexCompiler};
use crate::database::Materializer;
use crate::repository::store::FsStore;
use crate::repository::Repository;
use crate::support::error::Error;
use crate::support::repository_config::RepositoryConfig;
use crate::support::service_account::ServiceAccount;

/// An opened repository and the means to regenerate its databases.
pub(super) struct Context {
    pub(super) repo: Repository<FsStore>,
    materializer: Materializer,
}

impl Context {
    /// Open the repository described by `config`, whose directories must
    /// already be absolute.
    pub(super) fn open(config: &RepositoryConfig) -> Result<Self, Error> {
        let owner =
            ServiceAccount::resolve_if_root(&config.username, &config.groupname)?;
        let compiler = CommandCompiler {
            postmap: config.postmap.clone(),
            postalias: config.postalias.clone(),
        };
        Ok(Self::with_compiler(config, owner, Box::new(compiler)))
    }

    pub(super) fn with_compiler(
        config: &RepositoryConfig,
        owner: Option<ServiceAccount>,
        compiler: Box<dyn IndexCompiler>,
    ) -> Self {
        Context {
            repo: Repository::new(FsStore::new(&config.dir_maildata, owner)),
            materializer: Materializer::new(
                &config.dir_database,
                &config.username,
                owner,
                compiler,
            ),
        }
    }

    /// Regenerate the databases from the current repository content.
    pub(super) fn commit(&self) -> Result<(), Error> {
        self.materializer.generate(self.repo.mail_data()?)
    }

    /// Called after every mutation.
    pub(super) fn after_change(&self, no_commit: bool) -> Result<(), Error> {
        if no_commit {
            debug!("Not regenerating databases");
            Ok(())
        } else {
            self.commit()
        }
    }
}
