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

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Domain: name incorrect format")]
    InvalidDomainName,
    #[error("AliasDomain: name incorrect format")]
    InvalidAliasDomainName,
    #[error("AliasDomain: target incorrect format")]
    InvalidAliasDomainTarget,
    #[error("User: name incorrect format")]
    InvalidUserName,
    #[error("AliasUser: name incorrect format")]
    InvalidAliasUserName,
    #[error("AliasUser: target incorrect format")]
    InvalidAliasUserTarget,
    #[error("AliasUser: targets not enough")]
    NotEnoughAliasUserTargets,
    #[error("CatchAllUser: name incorrect format")]
    InvalidCatchAllUserName,
    #[error("User: forward incorrect format")]
    InvalidUserForward,

    #[error("Domain: not exist")]
    DomainNotExist,
    #[error("AliasDomain: not exist")]
    AliasDomainNotExist,
    #[error("User: not exist")]
    UserNotExist,
    #[error("AliasUser: not exist")]
    AliasUserNotExist,

    #[error("Domain: already exist")]
    DomainAlreadyExist,
    #[error("AliasDomain: already exist")]
    AliasDomainAlreadyExist,
    #[error("User: already exist")]
    UserAlreadyExist,
    #[error("AliasUser: already exist")]
    AliasUserAlreadyExist,

    #[error("Domain: is the target of an AliasDomain")]
    DomainIsAliasDomainTarget,
    #[error("User: is the CatchAllUser")]
    UserIsCatchAllUser,

    #[error("User: password file has invalid format")]
    InvalidFormatUsersPassword,
    #[error("AliasDomain: file has invalid format")]
    InvalidFormatAliasDomain,
    #[error("AliasUser: file has invalid format")]
    InvalidFormatAliasUsers,
    #[error("CatchAllUser: file has invalid format")]
    InvalidFormatCatchAllUser,
    #[error("User: forward file has invalid format")]
    InvalidFormatUserForwards,

    #[error("The password you entered is incorrect.")]
    IncorrectPassword,

    #[error("invalid repository")]
    InvalidRepository,
    #[error("not a mailrepo repository (or any of the parent directories)")]
    NotRepository,
    #[error("a mailrepo repository exists")]
    RepositoryExist,

    #[error("service user '{0}' does not exist")]
    NoSuchServiceUser(String),
    #[error("service group '{0}' does not exist")]
    NoSuchServiceGroup(String),
    #[error("{program} failed on '{}': {status}", path.display())]
    IndexCompileFailed {
        program: String,
        path: PathBuf,
        status: std::process::ExitStatus,
    },
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Nix(#[from] nix::Error),
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}
