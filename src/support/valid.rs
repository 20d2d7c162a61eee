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

//! Lexical rules for the names stored in the repository.
//!
//! Every entity constructor goes through these; nothing else decides what a
//! legal name looks like.
//!
//! Domain names are dot-separated labels of `[A-Za-z0-9-]`, the last of which
//! must be letters only. This deliberately rejects numeric TLDs, and in
//! particular bare IP addresses.
//!
//! Local parts (user and alias user names) may not begin with `.`, and may not
//! contain whitespace or `@` anywhere. They are at least two characters long.
//! A name with a leading dot would collide with the tombstones left behind by
//! removal.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RX_DOMAIN: Regex =
        Regex::new(r"^([A-Za-z0-9\-]+\.)*[A-Za-z]+$").unwrap();
    static ref RX_LOCAL_PART: Regex = Regex::new(r"^[^.\s@][^\s@]+$").unwrap();
    static ref RX_ADDRESS: Regex =
        Regex::new(r"^[^.\s@][^\s@]+@([A-Za-z0-9\-]+\.)*[A-Za-z]+$").unwrap();
    static ref RX_FORWARD: Regex =
        Regex::new(r"^[^\s@]+@([A-Za-z0-9\-]+\.)*[A-Za-z]+$").unwrap();
}

pub fn valid_domain_name(name: &str) -> bool {
    RX_DOMAIN.is_match(name)
}

pub fn valid_alias_domain_name(name: &str) -> bool {
    RX_DOMAIN.is_match(name)
}

pub fn valid_alias_domain_target(target: &str) -> bool {
    RX_DOMAIN.is_match(target)
}

pub fn valid_user_name(name: &str) -> bool {
    RX_LOCAL_PART.is_match(name)
}

pub fn valid_alias_user_name(name: &str) -> bool {
    RX_LOCAL_PART.is_match(name)
}

/// Alias targets are full `local@domain` addresses.
pub fn valid_alias_user_target(target: &str) -> bool {
    RX_ADDRESS.is_match(target)
}

/// Forwards may point anywhere, so any non-empty local part is accepted.
pub fn valid_user_forward(forward: &str) -> bool {
    RX_FORWARD.is_match(forward)
}

pub fn valid_catch_all_user_name(name: &str) -> bool {
    RX_LOCAL_PART.is_match(name)
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_valid_domain_name() {
        assert!(valid_domain_name("example.com"));
        assert!(valid_domain_name("ho-ge.example.com"));
        assert!(valid_domain_name("123.example.com"));
        assert!(valid_domain_name("localhost"));
        assert!(valid_domain_name("EXAMPLE.Com"));
        assert!(!valid_domain_name("example.123"));
        assert!(!valid_domain_name("192.168.0.1"));
        assert!(!valid_domain_name("exa_mple.com"));
        assert!(!valid_domain_name(".example.com"));
        assert!(!valid_domain_name("example..com"));
        assert!(!valid_domain_name("example.com."));
        assert!(!valid_domain_name("example.c-m"));
        assert!(!valid_domain_name(""));
        assert!(!valid_domain_name("exa mple.com"));
    }

    #[test]
    fn test_valid_user_name() {
        assert!(valid_user_name("alice"));
        assert!(valid_user_name("al"));
        assert!(valid_user_name("a.lice"));
        assert!(valid_user_name("alice."));
        assert!(valid_user_name("info+list"));
        assert!(!valid_user_name("a"));
        assert!(!valid_user_name(""));
        assert!(!valid_user_name(".alice"));
        assert!(!valid_user_name(".alice.deleted.20200101000000"));
        assert!(!valid_user_name("al ice"));
        assert!(!valid_user_name("alice\t"));
        assert!(!valid_user_name("alice@example.com"));
        assert!(!valid_user_name("@alice"));
    }

    #[test]
    fn test_valid_user_forward() {
        assert!(valid_user_forward("x@y.com"));
        assert!(valid_user_forward("alice@example.com"));
        assert!(valid_user_forward(".alice@sub.example.org"));
        assert!(!valid_user_forward("alice"));
        assert!(!valid_user_forward("@example.com"));
        assert!(!valid_user_forward("a b@example.com"));
        assert!(!valid_user_forward("alice@@example.com"));
        assert!(!valid_user_forward("alice@example.123"));
    }

    #[test]
    fn test_valid_alias_user_target() {
        assert!(valid_alias_user_target("alice@example.com"));
        assert!(valid_alias_user_target("a.b@sub.example.org"));
        assert!(!valid_alias_user_target("alice"));
        assert!(!valid_alias_user_target("a@example.com"));
        assert!(!valid_alias_user_target(".alice@example.com"));
        assert!(!valid_alias_user_target("alice@example.123"));
        assert!(!valid_alias_user_target("alice@@example.com"));
        assert!(!valid_alias_user_target("alice@"));
    }

    #[test]
    fn alias_and_catch_all_rules_match_their_counterparts() {
        for name in &["alice", "a", ".x", "x y", "bob@", "ok.ok"] {
            assert_eq!(valid_user_name(name), valid_alias_user_name(name));
            assert_eq!(
                valid_user_name(name),
                valid_catch_all_user_name(name)
            );
        }

        for name in &["example.com", "example.123", "x_y.com", "com"] {
            assert_eq!(
                valid_domain_name(name),
                valid_alias_domain_name(name)
            );
            assert_eq!(
                valid_domain_name(name),
                valid_alias_domain_target(name)
            );
        }
    }

    proptest! {
        #[test]
        fn domain_labels_accepted(
            labels in prop::collection::vec("[A-Za-z0-9-]{1,8}", 0..4),
            tld in "[A-Za-z]{1,6}",
        ) {
            let mut name = labels.join(".");
            if !name.is_empty() {
                name.push('.');
            }
            name.push_str(&tld);
            prop_assert!(valid_domain_name(&name));
        }

        #[test]
        fn numeric_tld_rejected(
            prefix in "[a-z]{1,8}",
            tld in "[0-9][A-Za-z0-9]{0,4}",
        ) {
            let name = format!("{}.{}", prefix, tld);
            prop_assert!(!valid_domain_name(&name));
        }

        #[test]
        fn local_part_never_starts_with_dot(rest in "[a-z.]{1,10}") {
            let dotted = format!(".{}", rest);
            prop_assert!(!valid_user_name(&dotted));
        }
    }
}
