//! Firewall rule grammar
//!
//! ```text
//! rule     := target [protocol] ["port" PORT] ["to" MASK]
//! target   := block | drop | allow | log | ulog
//! protocol := tcp | udp | icmp
//! ```

use crate::error::RuleError;
use ipnet::Ipv4Net;
use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Mask used when a rule has no `to` clause
pub const DEFAULT_MASK: &str = "0.0.0.0/0";

/// What the firewall does with matching traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FirewallTarget {
    Accept,
    Reject,
    Drop,
    Log,
    Ulog,
}

impl FirewallTarget {
    /// Map a rule keyword to its target. Expects lower case.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "block" => Some(FirewallTarget::Reject),
            "drop" => Some(FirewallTarget::Drop),
            "allow" => Some(FirewallTarget::Accept),
            "log" => Some(FirewallTarget::Log),
            "ulog" => Some(FirewallTarget::Ulog),
            _ => None,
        }
    }
}

impl fmt::Display for FirewallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FirewallTarget::Accept => write!(f, "accept"),
            FirewallTarget::Reject => write!(f, "reject"),
            FirewallTarget::Drop => write!(f, "drop"),
            FirewallTarget::Log => write!(f, "log"),
            FirewallTarget::Ulog => write!(f, "ulog"),
        }
    }
}

/// One parsed firewall rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallRule {
    pub target: FirewallTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Digits only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Digits, dots and slashes only
    pub mask: String,
}

fn is_protocol(word: &str) -> bool {
    word.starts_with("tcp") || word.starts_with("udp") || word.starts_with("icmp")
}

fn is_mask_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || c == '/'
}

impl FirewallRule {
    /// Parse the value of a `FirewallRule` line. Matching is case-insensitive.
    /// An empty rule blocks everything.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let text = text.to_lowercase();
        let mut words = text.split_whitespace().peekable();

        let target = match words.next() {
            None => FirewallTarget::Reject,
            Some(word) => FirewallTarget::from_keyword(word)
                .ok_or_else(|| RuleError::InvalidTarget(word.to_string()))?,
        };

        let protocol = words.next_if(|word| is_protocol(word)).map(str::to_string);

        let port = match words.next_if(|word| word.starts_with("port")) {
            Some(_) => {
                let port = words.next().ok_or(RuleError::MissingPort)?;
                if !port.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(RuleError::InvalidPort(port.to_string()));
                }
                Some(port.to_string())
            }
            None => None,
        };

        let mask = match words.next() {
            None => DEFAULT_MASK.to_string(),
            Some("to") => {
                let mask = words.next().ok_or(RuleError::MissingMask)?;
                if !mask.chars().all(is_mask_char) {
                    return Err(RuleError::InvalidMask(mask.to_string()));
                }
                mask.to_string()
            }
            Some(other) => return Err(RuleError::UnexpectedKeyword(other.to_string())),
        };

        Ok(Self {
            target,
            protocol,
            port,
            mask,
        })
    }

    /// The mask as a network. A bare address is a /32. `None` if the text
    /// is not a valid IPv4 network (e.g. `10.0.0.0/99`).
    pub fn mask_net(&self) -> Option<Ipv4Net> {
        self.mask
            .parse::<Ipv4Net>()
            .ok()
            .or_else(|| self.mask.parse::<Ipv4Addr>().ok().map(Ipv4Net::from))
    }
}

impl FromStr for FirewallRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.target)?;
        if let Some(protocol) = &self.protocol {
            write!(f, " {}", protocol)?;
        }
        if let Some(port) = &self.port {
            write!(f, " port {}", port)?;
        }
        write!(f, " to {}", self.mask)
    }
}
