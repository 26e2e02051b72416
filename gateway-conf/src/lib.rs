//! Configuration engine for the captive portal gateway
//!
//! Turns the line-oriented gateway configuration file into a [`Config`]:
//! gateway identity, upstream server pools, firewall rulesets and the
//! trusted MAC list.

pub mod config;
pub mod error;
pub mod firewall;
pub mod pool;
pub mod resolver;
pub mod trusted_mac;

// Re-export commonly used types
pub use config::{Config, ConfigLoader, ConfigValidator, Directive, PoolKind, ServerEntry};
pub use error::{ConfigError, Result, RuleError};
pub use firewall::{FirewallRule, FirewallTarget, RulesetCollection};
pub use pool::ServerPool;
pub use resolver::{HostResolver, NoResolver, SystemResolver};
pub use trusted_mac::TrustedMacList;
