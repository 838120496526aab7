//! Server address extraction from panel text.
//!
//! The provisioning panel shows the address inside free text (badges, labels,
//! copy buttons). These helpers pull the first real IP address out of it.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::AddressError;

static IPV4_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b").expect("valid regex")
});

static IPV6_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[a-fA-F0-9:]+:[a-fA-F0-9:]+").expect("valid regex")
});

/// Address family to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    fn name(self) -> &'static str {
        match self {
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        }
    }
}

/// Return the first candidate in `text` that parses as an address of `family`.
///
/// Regex hits that are not valid addresses (`999.1.1.1`, clock times such as
/// `12:30`) are skipped.
///
/// # Errors
///
/// Returns [`AddressError::NotFound`] when no valid address is present.
pub fn extract_host(text: &str, family: IpFamily) -> Result<String, AddressError> {
    let found = match family {
        IpFamily::V4 => IPV4_RE
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|s| s.parse::<Ipv4Addr>().is_ok()),
        IpFamily::V6 => IPV6_RE
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|s| s.parse::<Ipv6Addr>().is_ok()),
    };
    found.map(str::to_string).ok_or_else(|| AddressError::NotFound {
        family: family.name(),
        text: text.to_string(),
    })
}
