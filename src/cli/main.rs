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

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use structopt::StructOpt;

use super::context::Context;
use crate::support::error::Error;
use crate::support::repository_config::{
    init_repository, open_repository, DIR_NAME_CONFIG, FILE_NAME_LOGGING,
};
use crate::support::sysexits::*;

/// Manage virtual mail domains and the Postfix/Dovecot tables built from
/// them.
///
/// Every command which changes the repository regenerates the tables
/// afterwards unless `--no-commit` is given.
#[derive(StructOpt)]
#[structopt(max_term_width = 80)]
struct Options {
    /// Use the repository containing this directory [default: .]
    #[structopt(long, parse(from_os_str))]
    root: Option<PathBuf>,

    /// Log debug messages when running interactively.
    #[structopt(short, long)]
    verbose: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt)]
pub(super) enum Command {
    /// Turn the current (or --root) directory into a new repository.
    Init,
    /// List all domains.
    Domains,
    /// Create a new domain.
    DomainAdd(DomainSubcommand),
    /// Remove a domain.
    ///
    /// The domain directory is renamed aside, not deleted.
    DomainDel(DomainSubcommand),
    /// Stop routing mail for a domain without removing it.
    DomainDisable(DomainSubcommand),
    /// Resume routing mail for a disabled domain.
    DomainEnable(DomainSubcommand),
    /// List alias domains, optionally only those pointing at one domain.
    AliasDomains(AliasDomainsSubcommand),
    /// Create an alias domain for an existing domain.
    AliasDomainAdd(AliasDomainAddSubcommand),
    /// Remove an alias domain.
    AliasDomainDel(AliasDomainDelSubcommand),
    /// List the users of a domain.
    Users(DomainQuery),
    /// Create a new user, who cannot log in until given a password.
    UserAdd(AddressSubcommand),
    /// Remove a user.
    ///
    /// The user directory is renamed aside, not deleted.
    UserDel(AddressSubcommand),
    /// Set the password of a user.
    ///
    /// An empty password makes logging in impossible.
    UserPasswd(UserPasswdSubcommand),
    /// Check a password against the one stored for a user.
    UserCheckPw(UserCheckPwSubcommand),
    /// List where mail for a user is forwarded.
    UserForwards(AddressQuery),
    /// Replace the forwards of a user.
    ///
    /// Giving no forwards stops forwarding.
    UserForwardsSet(UserForwardsSetSubcommand),
    /// List the alias users of a domain.
    AliasUsers(DomainQuery),
    /// Create an alias user.
    AliasUserAdd(AliasUserSubcommand),
    /// Replace the targets of an alias user.
    AliasUserMod(AliasUserSubcommand),
    /// Remove an alias user.
    AliasUserDel(AddressSubcommand),
    /// Show the catch-all user of a domain, if any.
    Catchall(DomainQuery),
    /// Make a user the catch-all of their domain.
    CatchallSet(CatchallSetSubcommand),
    /// Remove the catch-all user of a domain.
    CatchallUnset(DomainSubcommand),
    /// Regenerate the databases.
    Commit,
}

#[derive(StructOpt)]
pub(super) struct CommitOptions {
    /// Do not regenerate the databases afterwards.
    #[structopt(short, long)]
    pub(super) no_commit: bool,
}

#[derive(StructOpt)]
pub(super) struct DomainQuery {
    pub(super) domain: String,
}

#[derive(StructOpt)]
pub(super) struct DomainSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    pub(super) domain: String,
}

#[derive(StructOpt)]
pub(super) struct AliasDomainsSubcommand {
    /// Only list alias domains of this domain.
    pub(super) target: Option<String>,
}

#[derive(StructOpt)]
pub(super) struct AliasDomainAddSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    pub(super) alias_domain: String,
    /// The existing domain to deliver to.
    pub(super) target: String,
}

#[derive(StructOpt)]
pub(super) struct AliasDomainDelSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    pub(super) alias_domain: String,
}

#[derive(StructOpt)]
pub(super) struct AddressSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    /// The address, as `user@domain`.
    pub(super) address: Address,
}

#[derive(StructOpt)]
pub(super) struct AddressQuery {
    /// The address, as `user@domain`.
    pub(super) address: Address,
}

#[derive(StructOpt)]
pub(super) struct UserForwardsSetSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    /// The address, as `user@domain`.
    pub(super) address: Address,
    /// Addresses to copy incoming mail to.
    pub(super) forwards: Vec<String>,
}

#[derive(StructOpt)]
pub(super) struct UserPasswdSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    /// The address, as `user@domain`.
    pub(super) address: Address,
    /// The new password. Prompted for if not given.
    pub(super) password: Option<String>,
}

#[derive(StructOpt)]
pub(super) struct UserCheckPwSubcommand {
    /// The address, as `user@domain`.
    pub(super) address: Address,
    /// The password to check. Prompted for if not given.
    pub(super) password: Option<String>,
}

#[derive(StructOpt)]
pub(super) struct AliasUserSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    /// The alias address, as `alias@domain`.
    pub(super) address: Address,
    /// Where mail to the alias is delivered.
    #[structopt(required = true)]
    pub(super) targets: Vec<String>,
}

#[derive(StructOpt)]
pub(super) struct CatchallSetSubcommand {
    #[structopt(flatten)]
    pub(super) commit: CommitOptions,

    pub(super) domain: String,
    /// An existing user of the domain.
    pub(super) user: String,
}

/// A `local@domain` pair given on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Address {
    pub(super) local: String,
    pub(super) domain: String,
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let mut parts = s.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) => Ok(Address {
                local: local.to_owned(),
                domain: domain.to_owned(),
            }),
            _ => Err(format!("'{}' is not of the form user@domain", s)),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.local, self.domain)
    }
}

pub fn main() {
    // Clap exits with status 1 instead of EX_USAGE if we use the more concise
    // API
    let options = Options::from_clap(&match Options::clap().get_matches_safe()
    {
        Ok(matches) => matches,
        Err(
            e @ clap::Error {
                kind: clap::ErrorKind::HelpDisplayed,
                ..
            },
        )
        | Err(
            e @ clap::Error {
                kind: clap::ErrorKind::VersionDisplayed,
                ..
            },
        ) => {
            println!("{}", e.message);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.message);
            EX_USAGE.exit()
        }
    });

    let start = options.root.unwrap_or_else(|| PathBuf::from("."));

    if let Command::Init = options.command {
        init_logging(&start.join(DIR_NAME_CONFIG), options.verbose);
        if let Err(e) = init_repository(&start) {
            die!(Sysexit::from(&e), "[ERR] {}", e);
        }
        return;
    }

    let (root, config) = match open_repository(&start) {
        Ok(r) => r,
        Err(e) => die!(Sysexit::from(&e), "[ERR] {}", e),
    };
    init_logging(&root.join(DIR_NAME_CONFIG), options.verbose);

    let ctx = match Context::open(&config) {
        Ok(ctx) => ctx,
        Err(e) => die!(Sysexit::from(&e), "[ERR] {}", e),
    };

    let stdout = io::stdout();
    if let Err(e) = run(&ctx, options.command, &mut stdout.lock()) {
        die!(Sysexit::from(&e), "[ERR] {}", e);
    }
}

fn init_logging(config_dir: &Path, verbose: bool) {
    if Ok(true) == nix::unistd::isatty(2) {
        // Running interactively; ignore logging configuration and just write
        // to stderr.
        crate::init_simple_log(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
        return;
    }

    // A logging.toml replaces syslog entirely; the two are not combined.
    let log_config_file = config_dir.join(FILE_NAME_LOGGING);
    if log_config_file.is_file() {
        if let Err(e) = log4rs::init_file(
            &log_config_file,
            log4rs::file::Deserializers::new(),
        ) {
            die!(EX_CONFIG, "Failed to initialise logging: {}", e);
        }
    } else {
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_MAIL,
            hostname: None,
            process: env!("CARGO_PKG_NAME").to_owned(),
            pid: nix::unistd::getpid().as_raw(),
        };

        // Logging is best-effort when there is no syslog to talk to
        if let Ok(logger) = syslog::unix(formatter) {
            let _ = log::set_boxed_logger(Box::new(syslog::BasicLogger::new(
                logger,
            )))
            .map(|_| log::set_max_level(log::LevelFilter::Info));
        }
    }
}

/// Run any command but `init` against `ctx`, writing listings to `out`.
pub(super) fn run(
    ctx: &Context,
    command: Command,
    out: &mut impl Write,
) -> Result<(), Error> {
    match command {
        // Handled before any repository is opened
        Command::Init => Err(Error::RepositoryExist),
        Command::Domains => super::domain::list(ctx, out),
        Command::DomainAdd(cmd) => super::domain::add(ctx, cmd),
        Command::DomainDel(cmd) => super::domain::del(ctx, cmd),
        Command::DomainDisable(cmd) => {
            super::domain::set_disabled(ctx, cmd, true)
        }
        Command::DomainEnable(cmd) => {
            super::domain::set_disabled(ctx, cmd, false)
        }
        Command::AliasDomains(cmd) => {
            super::domain::list_aliases(ctx, cmd, out)
        }
        Command::AliasDomainAdd(cmd) => super::domain::add_alias(ctx, cmd),
        Command::AliasDomainDel(cmd) => super::domain::del_alias(ctx, cmd),
        Command::Users(cmd) => super::user::list(ctx, cmd, out),
        Command::UserAdd(cmd) => super::user::add(ctx, cmd),
        Command::UserDel(cmd) => super::user::del(ctx, cmd),
        Command::UserPasswd(cmd) => super::user::passwd(ctx, cmd),
        Command::UserCheckPw(cmd) => super::user::check_pw(ctx, cmd, out),
        Command::UserForwards(cmd) => super::user::forwards(ctx, cmd, out),
        Command::UserForwardsSet(cmd) => super::user::forwards_set(ctx, cmd),
        Command::AliasUsers(cmd) => super::alias_user::list(ctx, cmd, out),
        Command::AliasUserAdd(cmd) => super::alias_user::add(ctx, cmd),
        Command::AliasUserMod(cmd) => super::alias_user::modify(ctx, cmd),
        Command::AliasUserDel(cmd) => super::alias_user::del(ctx, cmd),
        Command::Catchall(cmd) => super::user::catch_all(ctx, cmd, out),
        Command::CatchallSet(cmd) => super::user::catch_all_set(ctx, cmd),
        Command::CatchallUnset(cmd) => {
            super::user::catch_all_unset(ctx, cmd)
        }
        Command::Commit => ctx.commit(),
    }
}
