//! Firewall rulesets declared in the configuration

pub mod rule;
pub mod ruleset;

pub use rule::{FirewallRule, FirewallTarget, DEFAULT_MASK};
pub use ruleset::{parse_ruleset, RulesetCollection};
