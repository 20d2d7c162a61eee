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
    AddressQuery, AddressSubcommand, CatchallSetSubcommand, DomainQuery,
    DomainSubcommand, UserCheckPwSubcommand, UserForwardsSetSubcommand,
    UserPasswdSubcommand,
};
use crate::model::{CatchAllUser, User, NEVER_MATCH_HASHED_PASSWORD};
use crate::support::error::Error;
use crate::support::password::{hash_password, verify_password};
use crate::support::sysexits::*;
use crate::support::valid::valid_user_forward;

pub(super) fn list(
    ctx: &Context,
    cmd: DomainQuery,
    out: &mut impl Write,
) -> Result<(), Error> {
    for user in ctx.repo.users(&cmd.domain)? {
        writeln!(out, "{}", user.name())?;
    }
    Ok(())
}

pub(super) fn add(ctx: &Context, cmd: AddressSubcommand) -> Result<(), Error> {
    let user =
        User::new(cmd.address.local, NEVER_MATCH_HASHED_PASSWORD, vec![])?;
    ctx.repo.user_create(&cmd.address.domain, &user)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn del(ctx: &Context, cmd: AddressSubcommand) -> Result<(), Error> {
    ctx.repo
        .user_remove(&cmd.address.domain, &cmd.address.local)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn passwd(
    ctx: &Context,
    cmd: UserPasswdSubcommand,
) -> Result<(), Error> {
    let mut user = ctx
        .repo
        .user(&cmd.address.domain, &cmd.address.local)?
        .ok_or(Error::UserNotExist)?;

    let password = match cmd.password {
        Some(password) => password,
        None => match rpassword::prompt_password_stderr(&format!(
            "Enter new password for {}: ",
            cmd.address
        ))
        .and_then(|a| {
            rpassword::prompt_password_stderr("Retype new password: ")
                .map(|b| (a, b))
        }) {
            Err(e) => die!(EX_NOINPUT, "Failed to read password: {}", e),
            Ok((a, b)) if a != b => die!(EX_DATAERR, "Passwords don't match"),
            Ok((a, _)) => a,
        },
    };

    user.set_hashed_password(hash_password(&password)?);
    ctx.repo.user_update(&cmd.address.domain, &user)?;
    ctx.after_change(cmd.commit.no_commit)
}

/// A mismatch is an `IncorrectPassword` error.
pub(super) fn check_pw(
    ctx: &Context,
    cmd: UserCheckPwSubcommand,
    out: &mut impl Write,
) -> Result<(), Error> {
    let user = ctx
        .repo
        .user(&cmd.address.domain, &cmd.address.local)?
        .ok_or(Error::UserNotExist)?;

    let password = match cmd.password {
        Some(password) => password,
        None => match rpassword::prompt_password_stderr(&format!(
            "Enter password for {}: ",
            cmd.address
        )) {
            Err(e) => die!(EX_NOINPUT, "Failed to read password: {}", e),
            Ok(a) => a,
        },
    };

    if !verify_password(&password, user.hashed_password()) {
        return Err(Error::IncorrectPassword);
    }

    writeln!(out, "The password you entered is correct.")?;
    Ok(())
}

pub(super) fn forwards(
    ctx: &Context,
    cmd: AddressQuery,
    out: &mut impl Write,
) -> Result<(), Error> {
    let user = ctx
        .repo
        .user(&cmd.address.domain, &cmd.address.local)?
        .ok_or(Error::UserNotExist)?;

    for forward in user.forwards() {
        writeln!(out, "{}", forward)?;
    }
    Ok(())
}

pub(super) fn forwards_set(
    ctx: &Context,
    cmd: UserForwardsSetSubcommand,
) -> Result<(), Error> {
    if !cmd.forwards.iter().all(|f| valid_user_forward(f)) {
        return Err(Error::InvalidUserForward);
    }

    let mut user = ctx
        .repo
        .user(&cmd.address.domain, &cmd.address.local)?
        .ok_or(Error::UserNotExist)?;
    user.set_forwards(cmd.forwards);
    ctx.repo.user_update(&cmd.address.domain, &user)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn catch_all(
    ctx: &Context,
    cmd: DomainQuery,
    out: &mut impl Write,
) -> Result<(), Error> {
    if let Some(catch_all_user) = ctx.repo.catch_all_user(&cmd.domain)? {
        writeln!(out, "{}", catch_all_user.name())?;
    }
    Ok(())
}

pub(super) fn catch_all_set(
    ctx: &Context,
    cmd: CatchallSetSubcommand,
) -> Result<(), Error> {
    ctx.repo
        .catch_all_user_set(&cmd.domain, &CatchAllUser::new(cmd.user)?)?;
    ctx.after_change(cmd.commit.no_commit)
}

pub(super) fn catch_all_unset(
    ctx: &Context,
    cmd: DomainSubcommand,
) -> Result<(), Error> {
    ctx.repo.catch_all_user_unset(&cmd.domain)?;
    ctx.after_change(cmd.commit.no_commit)
}
