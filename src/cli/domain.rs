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

use std::io::Write;

use super::context::Context;
use super::main::{
    AliasDomainAddSubcommand, AliasDomainDelSubcommand, AliasDomainsSubcommand,
    DomainSubcommand,
};
use crate::model::{AliasDomain, Domain};
use crate::support::error::Error;

pub(super) fn list(ctx: &Context, out: &mut impl Write) -> Result<(), Error> {
    for domain in ctx.repo.domains()? {
        if domain.disabled() {
            writeln!(out, "{} (disabled)", domain.name())?;
        } else {
            writeln!(out, "{}", domain.name())?;
        }
    }
    Ok(())
}

pub(super) fn add(ctx: &Context, cmd: DomainSubcommand) -> Result<(), Error> {
    ctx.repo.domain_create(&Domain::new(cmd.domain)?)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn del(ctx: &Context, cmd: DomainSubcommand) -> Result<(), Error> {
    ctx.repo.domain_remove(&cmd.domain)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn set_disabled(
    ctx: &Context,
    cmd: DomainSubcommand,
    disabled: bool,
) -> Result<(), Error> {
    let mut domain = ctx
        .repo
        .domain(&cmd.domain)?
        .ok_or(Error::DomainNotExist)?;
    domain.set_disabled(disabled);
    ctx.repo.domain_update(&domain)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn list_aliases(
    ctx: &Context,
    cmd: AliasDomainsSubcommand,
    out: &mut impl Write,
) -> Result<(), Error> {
    let mut alias_domains = ctx.repo.alias_domains()?;
    alias_domains.sort_by(|a, b| a.name().cmp(b.name()));

    for alias_domain in alias_domains {
        if cmd
            .target
            .as_ref()
            .map_or(true, |target| target == alias_domain.target())
        {
            writeln!(out, "{}", alias_domain.name())?;
        }
    }
    Ok(())
}

pub(super) fn add_alias(
    ctx: &Context,
    cmd: AliasDomainAddSubcommand,
) -> Result<(), Error> {
    ctx.repo
        .alias_domain_create(&AliasDomain::new(cmd.alias_domain, cmd.target)?)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn del_alias(
    ctx: &Context,
    cmd: AliasDomainDelSubcommand,
) -> Result<(), Error> {
    ctx.repo.alias_domain_remove(&cmd.alias_domain)?;
    ctx.after_change(cmd.commit.no_commit)
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::super::context::test_support::context;
    use super::super::main::CommitOptions;
    use super::*;

    fn domain_cmd(domain: &str, no_commit: bool) -> DomainSubcommand {
        DomainSubcommand {
            commit: CommitOptions { no_commit },
            domain: domain.to_owned(),
        }
    }

    fn listing(ctx: &Context) -> String {
        let mut out = Vec::new();
        list(ctx, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_disable_list_remove() {
        let (_root, config, ctx) = context();

        add(&ctx, domain_cmd("example.com", false)).unwrap();
        add(&ctx, domain_cmd("example.org", true)).unwrap();
        assert_eq!(
            "example.com virtual\n",
            fs::read_to_string(config.dir_database.join("domains")).unwrap()
        );
        ctx.commit().unwrap();
        assert_eq!(
            "example.com virtual\nexample.org virtual\n",
            fs::read_to_string(config.dir_database.join("domains")).unwrap()
        );

        set_disabled(&ctx, domain_cmd("example.org", false), true).unwrap();
        assert_eq!("example.com\nexample.org (disabled)\n", listing(&ctx));
        assert_eq!(
            "example.com virtual\n",
            fs::read_to_string(config.dir_database.join("domains")).unwrap()
        );

        assert_matches!(
            Err(Error::DomainNotExist),
            set_disabled(&ctx, domain_cmd("example.net", false), true)
        );
        assert_matches!(
            Err(Error::InvalidDomainName),
            add(&ctx, domain_cmd("example.123", false))
        );

        del(&ctx, domain_cmd("example.org", false)).unwrap();
        assert_eq!("example.com\n", listing(&ctx));
    }

    #[test]
    fn alias_domains() {
        let (_root, config, ctx) = context();
        add(&ctx, domain_cmd("example.com", true)).unwrap();
        add(&ctx, domain_cmd("example.org", true)).unwrap();

        for (alias, target) in &[
            ("example.net", "example.com"),
            ("example.info", "example.org"),
        ] {
            add_alias(
                &ctx,
                AliasDomainAddSubcommand {
                    commit: CommitOptions { no_commit: false },
                    alias_domain: (*alias).to_owned(),
                    target: (*target).to_owned(),
                },
            )
            .unwrap();
        }

        let list_for = |target: Option<&str>| {
            let mut out = Vec::new();
            list_aliases(
                &ctx,
                AliasDomainsSubcommand {
                    target: target.map(str::to_owned),
                },
                &mut out,
            )
            .unwrap();
            String::from_utf8(out).unwrap()
        };
        assert_eq!("example.info\nexample.net\n", list_for(None));
        assert_eq!("example.net\n", list_for(Some("example.com")));

        assert_matches!(
            Err(Error::DomainIsAliasDomainTarget),
            del(&ctx, domain_cmd("example.com", false))
        );

        del_alias(
            &ctx,
            AliasDomainDelSubcommand {
                commit: CommitOptions { no_commit: false },
                alias_domain: "example.net".to_owned(),
            },
        )
        .unwrap();
        assert_eq!(
            "example.com virtual\nexample.org virtual\nexample.info virtual\n",
            fs::read_to_string(config.dir_database.join("domains")).unwrap()
        );
    }
}
