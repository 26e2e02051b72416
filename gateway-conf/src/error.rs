//! Error types for configuration parsing

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal configuration errors. Any of these must stop the gateway before it
/// serves traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not open configuration file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{file}: line {line}: failed to read: {source}")]
    Read {
        file: String,
        line: usize,
        source: std::io::Error,
    },

    #[error("{file}: line {line}: Bad configuration option: {keyword}")]
    UnknownDirective {
        file: String,
        line: usize,
        keyword: String,
    },

    #[error("{file}: line {line}: option {keyword} is not allowed inside a {block} block")]
    UnexpectedDirective {
        file: String,
        line: usize,
        keyword: String,
        block: &'static str,
    },

    #[error("{file}: line {line}: FirewallRuleSet requires a name")]
    MissingRulesetName { file: String, line: usize },

    #[error("HTTPDUserName requires a HTTPDPassword to be set")]
    MissingHttpdPassword,

    #[error("Configuration is not complete, missing: {}", .missing.join(", "))]
    Incomplete { missing: Vec<&'static str> },
}

/// A single firewall rule that could not be parsed. Rule errors are never
/// fatal; the ruleset parser logs them and drops the rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Invalid rule type {0}, expecting \"block\",\"drop\",\"allow\",\"log\" or \"ulog\"")]
    InvalidTarget(String),

    #[error("Invalid port {0}")]
    InvalidPort(String),

    #[error("Missing port after \"port\"")]
    MissingPort,

    #[error("Invalid or unexpected keyword {0}, expecting \"to\"")]
    UnexpectedKeyword(String),

    #[error("Missing mask after \"to\"")]
    MissingMask,

    #[error("Invalid mask {0}")]
    InvalidMask(String),
}
