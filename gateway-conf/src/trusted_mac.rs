//! Trusted MAC address list

use serde::Serialize;
use tracing::debug;

/// Longest text accepted for one MAC address (`aa:bb:cc:dd:ee:ff`)
const MAC_TEXT_LEN: usize = 17;

/// Duplicate-free list of trusted MAC addresses in first-seen order.
///
/// Addresses are stored lower-cased, so `AA:BB:..` and `aa:bb:..` are the
/// same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrustedMacList {
    macs: Vec<String>,
}

impl TrustedMacList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of MAC addresses separated by commas and/or spaces and
    /// append the new ones. Tokens that do not start with a hex digit or a
    /// colon are skipped; duplicates are skipped. Returns how many
    /// addresses were added.
    pub fn parse_and_extend(&mut self, value: &str) -> usize {
        debug!("Parsing string [{}] for trusted MAC addresses", value);

        let mut added = 0;
        for token in value.split(|c: char| c == ',' || c == ' ') {
            let Some(mac) = extract_mac(token) else {
                continue;
            };
            if self.insert(mac) {
                added += 1;
            }
        }
        added
    }

    /// Append one address unless it is already present. Returns true if it
    /// was added.
    pub fn insert(&mut self, mac: &str) -> bool {
        let mac = mac.to_ascii_lowercase();
        if self.contains(&mac) {
            debug!("MAC address [{}] already trusted, skipping", mac);
            return false;
        }

        debug!("Adding MAC address [{}] to trusted list", mac);
        self.macs.push(mac);
        true
    }

    pub fn contains(&self, mac: &str) -> bool {
        self.macs.iter().any(|m| m.eq_ignore_ascii_case(mac))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.macs
    }

    pub fn len(&self) -> usize {
        self.macs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macs.is_empty()
    }
}

/// Leading run (at most 17 chars) of hex digits and colons, after skipping
/// whitespace. `None` if the run is empty.
fn extract_mac(token: &str) -> Option<&str> {
    let token = token.trim_start();
    let len = token
        .bytes()
        .take(MAC_TEXT_LEN)
        .take_while(|b| b.is_ascii_hexdigit() || *b == b':')
        .count();

    (len > 0).then(|| &token[..len])
}
