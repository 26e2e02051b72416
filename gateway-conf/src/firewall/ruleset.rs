//! Named firewall rulesets and the `FirewallRuleSet` block parser

use super::rule::FirewallRule;
use crate::config::directive::Directive;
use crate::config::tokenizer::{is_block_close, is_brace, tokenize, LineReader};
use crate::error::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::io::BufRead;
use tracing::{debug, error};

/// Rulesets by name, in the order they were first referenced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RulesetCollection {
    sets: IndexMap<String, Vec<FirewallRule>>,
}

impl RulesetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules of the named set, creating an empty set on first reference
    pub fn entry(&mut self, name: &str) -> &mut Vec<FirewallRule> {
        self.sets.entry(name.to_string()).or_default()
    }

    /// Append a rule to the tail of the named set
    pub fn append(&mut self, name: &str, rule: FirewallRule) {
        self.entry(name).push(rule);
    }

    /// Rules of the named set; empty if the set does not exist
    pub fn get(&self, name: &str) -> &[FirewallRule] {
        self.sets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sets.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FirewallRule])> {
        self.sets
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Read the body of a `FirewallRuleSet` block up to its closing brace.
///
/// Every inner line must be a `FirewallRule`. A rule that fails to parse is
/// logged and dropped; any other keyword is fatal.
pub fn parse_ruleset<R: BufRead>(
    name: &str,
    reader: &mut LineReader<R>,
    rulesets: &mut RulesetCollection,
) -> Result<()> {
    debug!("Adding Firewall Rule Set {}", name);
    rulesets.entry(name);

    while let Some(raw) = reader.next_line()? {
        if is_block_close(&raw) {
            break;
        }
        let Some(line) = tokenize(&raw) else {
            continue;
        };
        if is_brace(line.keyword) {
            continue;
        }

        match Directive::from_keyword(line.keyword) {
            Some(Directive::FirewallRule) => match FirewallRule::parse(line.value) {
                Ok(rule) => {
                    debug!("Adding Firewall Rule {} to {}", rule, name);
                    rulesets.append(name, rule);
                }
                Err(e) => {
                    error!(
                        "{}: line {}: {}, rule dropped",
                        reader.file(),
                        reader.line_number(),
                        e
                    );
                }
            },
            Some(_) => return Err(reader.bad_option(line.keyword, Some("FirewallRuleSet"))),
            None => return Err(reader.bad_option(line.keyword, None)),
        }
    }

    debug!("Firewall Rule Set {} added", name);
    Ok(())
}
