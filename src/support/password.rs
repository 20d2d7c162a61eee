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

//! Password hashes in the form Dovecot reads from a `passwd-file`.
//!
//! Hashes are `{SCHEME}` followed by the scheme-specific text. Only
//! `{ARGON2ID}` is produced or verified here; the repository itself treats
//! hashes as opaque strings.

use rand::{rngs::OsRng, Rng};

use crate::model::NEVER_MATCH_HASHED_PASSWORD;
use crate::support::error::Error;

const SCHEME_ARGON2ID: &str = "{ARGON2ID}";

fn config() -> argon2::Config<'static> {
    argon2::Config {
        hash_length: 32,
        lanes: 1,
        mem_cost: 65536,
        thread_mode: argon2::ThreadMode::Sequential,
        time_cost: 3,
        variant: argon2::Variant::Argon2id,
        version: argon2::Version::Version13,
        ..argon2::Config::default()
    }
}

/// Hash `raw` for storage in the password index.
///
/// An empty password yields the hash that never matches anything.
pub fn hash_password(raw: &str) -> Result<String, Error> {
    if raw.is_empty() {
        return Ok(NEVER_MATCH_HASHED_PASSWORD.to_owned());
    }

    let salt: [u8; 16] = OsRng.gen();
    let encoded = argon2::hash_encoded(raw.as_bytes(), &salt, &config())?;
    Ok(format!("{}{}", SCHEME_ARGON2ID, encoded))
}

/// Check `raw` against `hashed`.
///
/// Anything not in a recognised scheme, including the never-matching hash,
/// is a mismatch.
pub fn verify_password(raw: &str, hashed: &str) -> bool {
    if raw.is_empty() {
        return false;
    }

    if !hashed.starts_with(SCHEME_ARGON2ID) {
        return false;
    }

    argon2::verify_encoded(&hashed[SCHEME_ARGON2ID.len()..], raw.as_bytes())
        .unwrap_or(false)
}
