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
use super::main::{AddressSubcommand, AliasUserSubcommand, DomainQuery};
use crate::model::AliasUser;
use crate::support::error::Error;

pub(super) fn list(
    ctx: &Context,
    cmd: DomainQuery,
    out: &mut impl Write,
) -> Result<(), Error> {
    let mut alias_users = ctx.repo.alias_users(&cmd.domain)?;
    alias_users.sort_by(|a, b| a.name().cmp(b.name()));

    for alias_user in alias_users {
        writeln!(out, "{}", alias_user.name())?;
    }
    Ok(())
}

pub(super) fn add(
    ctx: &Context,
    cmd: AliasUserSubcommand,
) -> Result<(), Error> {
    let alias_user = AliasUser::new(cmd.address.local, cmd.targets)?;
    ctx.repo
        .alias_user_create(&cmd.address.domain, &alias_user)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn modify(
    ctx: &Context,
    cmd: AliasUserSubcommand,
) -> Result<(), Error> {
    let mut alias_user = ctx
        .repo
        .alias_user(&cmd.address.domain, &cmd.address.local)?
        .ok_or(Error::AliasUserNotExist)?;
    alias_user.set_targets(cmd.targets)?;
    ctx.repo
        .alias_user_update(&cmd.address.domain, &alias_user)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn del(ctx: &Context, cmd: AddressSubcommand) -> Result<(), Error> {
    ctx.repo
        .alias_user_remove(&cmd.address.domain, &cmd.address.local)?;
    ctx.after_change(cmd.commit.no_commit)
}
