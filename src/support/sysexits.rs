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

//! Constants from `sysexits.h`
//!
//! The command line tool exits with these so that wrapper scripts can tell a
//! typo apart from a broken repository.

use super::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Sysexit(pub i32);

pub const EX_USAGE: Sysexit = Sysexit(64);
pub const EX_DATAERR: Sysexit = Sysexit(65);
pub const EX_NOINPUT: Sysexit = Sysexit(66);
pub const EX_NOUSER: Sysexit = Sysexit(67);
pub const EX_UNAVAILABLE: Sysexit = Sysexit(69);
pub const EX_SOFTWARE: Sysexit = Sysexit(70);
pub const EX_OSERR: Sysexit = Sysexit(71);
pub const EX_CANTCREAT: Sysexit = Sysexit(73);
pub const EX_IOERR: Sysexit = Sysexit(74);
pub const EX_NOPERM: Sysexit = Sysexit(77);
pub const EX_CONFIG: Sysexit = Sysexit(78);

impl Sysexit {
    pub fn exit(self) -> ! {
        std::process::exit(self.0)
    }
}

impl From<&Error> for Sysexit {
    fn from(e: &Error) -> Self {
        match *e {
            Error::InvalidDomainName
            | Error::InvalidAliasDomainName
            | Error::InvalidAliasDomainTarget
            | Error::InvalidUserName
            | Error::InvalidAliasUserName
            | Error::InvalidAliasUserTarget
            | Error::NotEnoughAliasUserTargets
            | Error::InvalidCatchAllUserName
            | Error::InvalidUserForward => EX_USAGE,

            Error::DomainNotExist
            | Error::AliasDomainNotExist
            | Error::UserNotExist
            | Error::AliasUserNotExist => EX_NOUSER,

            Error::DomainAlreadyExist
            | Error::AliasDomainAlreadyExist
            | Error::UserAlreadyExist
            | Error::AliasUserAlreadyExist
            | Error::DomainIsAliasDomainTarget
            | Error::UserIsCatchAllUser => EX_CANTCREAT,

            Error::InvalidFormatUsersPassword
            | Error::InvalidFormatAliasDomain
            | Error::InvalidFormatAliasUsers
            | Error::InvalidFormatCatchAllUser
            | Error::InvalidFormatUserForwards
            | Error::IncorrectPassword => EX_DATAERR,

            Error::InvalidRepository
            | Error::NotRepository
            | Error::RepositoryExist
            | Error::NoSuchServiceUser(..)
            | Error::NoSuchServiceGroup(..)
            | Error::TomlDe(..)
            | Error::TomlSer(..) => EX_CONFIG,

            Error::IndexCompileFailed { .. } => EX_UNAVAILABLE,
            Error::PasswordHash(..) => EX_SOFTWARE,
            Error::Io(ref e)
                if std::io::ErrorKind::PermissionDenied == e.kind() =>
            {
                EX_NOPERM
            }
            Error::Io(..) => EX_IOERR,
            Error::Nix(..) => EX_OSERR,
        }
    }
}
