//! Server block parser for `AuthServer`, `PortalServer`, `PlatformServer`
//! and `LogServer`

use super::directive::Directive;
use super::schema::{Config, ServerEntry};
use super::tokenizer::{is_block_close, is_brace, parse_bool, parse_int, tokenize, LineReader};
use crate::error::Result;
use crate::resolver::HostResolver;
use std::io::BufRead;
use tracing::{debug, warn};

/// Which pool a server block feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Auth,
    Portal,
    Platform,
    /// Parsed for validity only; the log pool keeps its built-in entry
    Log,
}

impl PoolKind {
    /// Block keyword as written in the file
    pub fn block_name(self) -> &'static str {
        match self {
            PoolKind::Auth => "AuthServer",
            PoolKind::Portal => "PortalServer",
            PoolKind::Platform => "PlatformServer",
            PoolKind::Log => "LogServer",
        }
    }

    /// Portal and platform hosts get their address cached at load time
    fn resolves(self) -> bool {
        matches!(self, PoolKind::Portal | PoolKind::Platform)
    }
}

/// Ports use `atoi` semantics: anything unparsable becomes 0
fn parse_port(value: &str) -> u16 {
    parse_int(value)
        .and_then(|n| u16::try_from(n).ok())
        .unwrap_or(0)
}

/// Read one server block up to its closing brace. Returns `None` when the
/// block has no hostname.
pub fn read_server_block<R: BufRead>(
    reader: &mut LineReader<R>,
    kind: PoolKind,
) -> Result<Option<ServerEntry>> {
    let mut entry = ServerEntry::new(String::new());
    let mut hostname = None;

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
            Some(Directive::Hostname) => {
                hostname = Some(line.value.trim_end().to_string());
            }
            Some(Directive::Path) => entry.path = line.value.to_string(),
            Some(Directive::LoginScriptPathFragment) => {
                entry.login_script_path_fragment = line.value.to_string();
            }
            Some(Directive::PortalScriptPathFragment) => {
                entry.portal_script_path_fragment = line.value.to_string();
            }
            Some(Directive::MsgScriptPathFragment) => {
                entry.msg_script_path_fragment = line.value.to_string();
            }
            Some(Directive::PingScriptPathFragment) => {
                entry.ping_script_path_fragment = line.value.to_string();
            }
            Some(Directive::AuthScriptPathFragment) => {
                entry.auth_script_path_fragment = line.value.to_string();
            }
            Some(Directive::SslPort) => entry.ssl_port = parse_port(line.value),
            Some(Directive::HttpPort) => entry.http_port = parse_port(line.value),
            Some(Directive::SslAvailable) => {
                entry.use_ssl = parse_bool(line.value).unwrap_or(false);
            }
            Some(Directive::LogPort) => {}
            Some(_) => return Err(reader.bad_option(line.keyword, Some(kind.block_name()))),
            None => return Err(reader.bad_option(line.keyword, None)),
        }
    }

    // A `Hostname` line without a value counts as no hostname
    Ok(hostname.filter(|h| !h.is_empty()).map(|hostname| ServerEntry {
        hostname,
        ..entry
    }))
}

/// Parse a server block and append the result to the pool of `kind`.
///
/// A block without a hostname is dropped. Portal and platform hosts are
/// resolved once; a failed lookup leaves the address cache empty.
pub fn parse_server<R: BufRead>(
    reader: &mut LineReader<R>,
    kind: PoolKind,
    config: &mut Config,
    resolver: &dyn HostResolver,
) -> Result<()> {
    let start = reader.line_number();
    let Some(mut entry) = read_server_block(reader, kind)? else {
        debug!(
            "{} block at line {} has no hostname, ignored",
            kind.block_name(),
            start
        );
        return Ok(());
    };

    debug!(
        "Adding {}:{} (SSL: {}) {} to the {} list",
        entry.hostname,
        entry.http_port,
        entry.ssl_port,
        entry.path,
        kind.block_name()
    );

    if kind.resolves() {
        match resolver.resolve_ipv4(&entry.hostname) {
            Some(addr) => {
                if entry.cache_address(addr) {
                    debug!("{} resolved to {}", entry.hostname, addr);
                }
            }
            None => debug!("Could not resolve {}, address not cached", entry.hostname),
        }
    }

    let pool = match kind {
        PoolKind::Auth => &mut config.auth_servers,
        PoolKind::Portal => &mut config.portal_servers,
        PoolKind::Platform => &mut config.platform_servers,
        PoolKind::Log => {
            warn!(
                "{}: LogServer block at line {} ignored, the log server is built in",
                reader.file(),
                start
            );
            return Ok(());
        }
    };
    pool.push(entry);
    debug!("{} added", kind.block_name());

    Ok(())
}
