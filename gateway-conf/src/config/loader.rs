//! Configuration file loading: the top-level directive parser

use super::directive::Directive;
use super::schema::Config;
use super::server::{parse_server, PoolKind};
use super::tokenizer::{is_brace, parse_bool, parse_int, tokenize, Line, LineReader, BLOCK_OPEN};
use super::validator::ConfigValidator;
use crate::error::{ConfigError, Result};
use crate::firewall::parse_ruleset;
use crate::resolver::{HostResolver, SystemResolver};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Reads a configuration file into a [`Config`].
///
/// ```no_run
/// use gateway_conf::ConfigLoader;
///
/// let config = ConfigLoader::new().with_daemon(false).load("/etc/gateway.conf")?;
/// println!("{:?}", config.auth_server());
/// # Ok::<(), gateway_conf::ConfigError>(())
/// ```
pub struct ConfigLoader {
    resolver: Box<dyn HostResolver>,
    daemon: Option<bool>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            resolver: Box::new(SystemResolver),
            daemon: None,
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `resolver` for portal and platform server lookups
    pub fn with_resolver(mut self, resolver: impl HostResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Fix daemon mode. Takes precedence over a `Daemon` line in the file.
    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = Some(daemon);
        self
    }

    /// Parse and validate a configuration file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let config = self.parse_file(path)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Parse a configuration file without the final completeness check
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();
        info!("Reading configuration file '{}'", path.display());

        let file = File::open(path).map_err(|source| {
            error!(
                "Could not open configuration file '{}', exiting...",
                path.display()
            );
            ConfigError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let mut config = self.parse_reader(BufReader::new(file), path.display().to_string())?;
        config.config_file = path.to_path_buf();
        Ok(config)
    }

    /// Parse configuration text; `name` is used in diagnostics
    pub fn parse_str(&self, text: &str, name: &str) -> Result<Config> {
        self.parse_reader(text.as_bytes(), name)
    }

    /// Parse configuration from any buffered reader
    pub fn parse_reader<R: BufRead>(&self, input: R, name: impl Into<String>) -> Result<Config> {
        let mut config = Config {
            daemon: self.daemon,
            ..Config::default()
        };
        let mut reader = LineReader::new(input, name);

        while let Some(raw) = reader.next_line()? {
            let Some(line) = tokenize(&raw) else {
                continue;
            };

            if is_brace(line.keyword) {
                debug!("Skipping stray brace on line {}", reader.line_number());
                continue;
            }

            let Some(directive) = Directive::from_keyword(line.keyword) else {
                return Err(reader.bad_option(line.keyword, None));
            };

            debug!("Parsing token: {}, value: {}", line.keyword, line.value);
            self.apply(directive, line, &mut reader, &mut config)?;
        }

        ConfigValidator::check_httpd_credentials(&config)?;
        Ok(config)
    }

    fn apply<R: BufRead>(
        &self,
        directive: Directive,
        line: Line<'_>,
        reader: &mut LineReader<R>,
        config: &mut Config,
    ) -> Result<()> {
        let resolver = self.resolver.as_ref();
        let value = line.first_word();

        match directive {
            Directive::AuthServer => parse_server(reader, PoolKind::Auth, config, resolver)?,
            Directive::PortalServer => parse_server(reader, PoolKind::Portal, config, resolver)?,
            Directive::PlatformServer => {
                parse_server(reader, PoolKind::Platform, config, resolver)?
            }
            Directive::LogServer => parse_server(reader, PoolKind::Log, config, resolver)?,
            Directive::FirewallRuleSet => {
                let name = value.trim_end_matches(BLOCK_OPEN);
                if name.is_empty() {
                    error!(
                        "{}: line {}: FirewallRuleSet without a name",
                        reader.file(),
                        reader.line_number()
                    );
                    return Err(ConfigError::MissingRulesetName {
                        file: reader.file().to_string(),
                        line: reader.line_number(),
                    });
                }
                parse_ruleset(name, reader, &mut config.rulesets)?;
            }
            Directive::TrustedMacList => {
                config.trusted_macs.parse_and_extend(line.value);
            }
            d if d == Directive::FirewallRule || d.is_server_key() => {
                warn!(
                    "{}: line {}: {} is only valid inside a block, ignored",
                    reader.file(),
                    reader.line_number(),
                    line.keyword
                );
            }
            _ if value.is_empty() => {
                debug!("{} has no value, ignored", line.keyword);
            }
            Directive::Daemon => {
                if self.daemon.is_none() {
                    match parse_bool(value) {
                        Some(daemon) => config.daemon = Some(daemon),
                        None => warn!("Invalid Daemon value {}, ignored", value),
                    }
                }
            }
            Directive::DebugLevel => set_int(&mut config.debug_level, value, directive),
            Directive::ExternalInterface => config.external_interface = Some(value.to_string()),
            Directive::GatewayId => config.gateway_id = Some(value.to_string()),
            Directive::DevId => config.dev_id = Some(value.to_string()),
            Directive::GatewayInterface => config.gateway_interface = Some(value.to_string()),
            Directive::GatewayAddress => config.gateway_address = Some(value.to_string()),
            Directive::GatewayPort => set_int(&mut config.gateway_port, value, directive),
            Directive::HttpdMaxConn => set_int(&mut config.httpd_max_conn, value, directive),
            Directive::HttpdName => config.httpd_name = Some(value.to_string()),
            Directive::HttpdRealm => config.httpd_realm = value.to_string(),
            Directive::HttpdUsername => config.httpd_username = Some(value.to_string()),
            Directive::HttpdPassword => config.httpd_password = Some(value.to_string()),
            Directive::ClientTimeout => set_int(&mut config.client_timeout, value, directive),
            Directive::CheckInterval => set_int(&mut config.check_interval, value, directive),
            Directive::AuthInterval => set_int(&mut config.auth_interval, value, directive),
            Directive::SyslogFacility => set_int(&mut config.syslog_facility, value, directive),
            Directive::WdctlSocket => config.wdctl_socket = PathBuf::from(value),
            Directive::HtmlMessageFile => config.html_message_file = PathBuf::from(value),
            Directive::ProxyPort => set_int(&mut config.proxy_port, value, directive),
            // Handled by the guarded arms above
            Directive::FirewallRule
            | Directive::Hostname
            | Directive::SslAvailable
            | Directive::SslPort
            | Directive::HttpPort
            | Directive::LogPort
            | Directive::Path
            | Directive::LoginScriptPathFragment
            | Directive::PortalScriptPathFragment
            | Directive::MsgScriptPathFragment
            | Directive::PingScriptPathFragment
            | Directive::AuthScriptPathFragment => {}
        }

        Ok(())
    }
}

/// Store a permissively parsed integer; the field keeps its value when the
/// text has no leading number or the number does not fit.
fn set_int<T: TryFrom<i64>>(field: &mut T, value: &str, directive: Directive) {
    match parse_int(value).and_then(|n| T::try_from(n).ok()) {
        Some(n) => *field = n,
        None => debug!("{}: no usable number in {:?}, keeping previous value", directive, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firewall::FirewallTarget;
    use crate::resolver::NoResolver;
    use std::io::Write;
    use std::net::Ipv4Addr;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# Gateway configuration
GatewayID office-1
GatewayInterface br-lan
ExternalInterface eth0
GatewayAddress 192.168.1.1
GatewayPort 2060
HTTPDMaxConn 50
ClientTimeout 10
CheckInterval 30
TrustedMACList 00:00:DE:AD:BE:AF,00:00:C0:1D:F0:0D

AuthServer {
    Hostname auth.example.com
    SSLAvailable yes
    Path /
}

AuthServer {
    Hostname backup.example.com
}

FirewallRuleSet global {
    FirewallRule allow tcp port 80
    FirewallRule block to 10.0.0.0/8
}

FirewallRuleSet known-users {
    FirewallRule allow to 0.0.0.0/0
}
";

    fn loader() -> ConfigLoader {
        ConfigLoader::new().with_resolver(NoResolver)
    }

    #[test]
    fn test_parse_sample() {
        let config = loader().parse_str(SAMPLE, "sample.conf").unwrap();

        assert_eq!(config.gateway_id.as_deref(), Some("office-1"));
        assert_eq!(config.gateway_interface.as_deref(), Some("br-lan"));
        assert_eq!(config.external_interface.as_deref(), Some("eth0"));
        assert_eq!(config.gateway_address.as_deref(), Some("192.168.1.1"));
        assert_eq!(config.gateway_port, 2060);
        assert_eq!(config.httpd_max_conn, 50);
        assert_eq!(config.client_timeout, 10);
        assert_eq!(config.check_interval, 30);
        assert_eq!(config.trusted_macs().len(), 2);

        assert_eq!(config.auth_servers.len(), 2);
        let auth = config.auth_server().unwrap();
        assert_eq!(auth.hostname, "auth.example.com");
        assert!(auth.use_ssl);
        assert_eq!(auth.path, "/");

        assert_eq!(config.ruleset("global").len(), 2);
        assert_eq!(config.ruleset("known-users")[0].target, FirewallTarget::Accept);
        assert!(config.ruleset("unknown-users").is_empty());

        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let config = loader()
            .parse_str("gatewayinterface wlan0\nGATEWAYPORT 8080\n", "t")
            .unwrap();
        assert_eq!(config.gateway_interface.as_deref(), Some("wlan0"));
        assert_eq!(config.gateway_port, 8080);
    }

    #[test]
    fn test_unknown_directive_is_fatal() {
        let err = loader()
            .parse_str("GatewayInterface br-lan\nGatewayIntreface eth0\n", "t.conf")
            .unwrap_err();

        match err {
            ConfigError::UnknownDirective { file, line, keyword } => {
                assert_eq!(file, "t.conf");
                assert_eq!(line, 2);
                assert_eq!(keyword, "GatewayIntreface");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_directive_without_value_is_fatal() {
        let err = loader().parse_str("Typo\n", "t").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDirective { line: 1, .. }));
    }

    #[test]
    fn test_line_numbers_continue_after_blocks() {
        let text = "AuthServer {\n  Hostname a\n}\nBogus value\n";
        let err = loader().parse_str(text, "t").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDirective { line: 4, .. }));
    }

    #[test]
    fn test_permissive_integers() {
        let config = loader()
            .parse_str("GatewayPort abc\nClientTimeout 7minutes\nCheckInterval -5\n", "t")
            .unwrap();

        // Non-numeric keeps the default
        assert_eq!(config.gateway_port, 2060);
        assert_eq!(config.client_timeout, 7);
        // Does not fit an unsigned interval
        assert_eq!(config.check_interval, 60);
    }

    #[test]
    fn test_scalar_takes_first_word() {
        let config = loader()
            .parse_str("HTTPDName My Gateway\nGatewayID  gw-1   # trailing comment\n", "t")
            .unwrap();
        assert_eq!(config.httpd_name.as_deref(), Some("My"));
        assert_eq!(config.gateway_id.as_deref(), Some("gw-1"));
    }

    #[test]
    fn test_crlf_input() {
        let config = loader()
            .parse_str("GatewayInterface br-lan\r\nAuthServer {\r\n Hostname a.example.com\r\n}\r\n", "t")
            .unwrap();
        assert_eq!(config.gateway_interface.as_deref(), Some("br-lan"));
        assert_eq!(config.auth_server().unwrap().hostname, "a.example.com");
    }

    #[test]
    fn test_daemon_override_wins() {
        let text = "Daemon 1\n";
        assert_eq!(loader().parse_str(text, "t").unwrap().daemon, Some(true));

        let config = loader().with_daemon(false).parse_str(text, "t").unwrap();
        assert_eq!(config.daemon, Some(false));
        assert!(!config.daemon());
    }

    #[test]
    fn test_daemon_last_line_wins() {
        let config = loader().parse_str("Daemon yes\nDaemon no\n", "t").unwrap();
        assert_eq!(config.daemon, Some(false));
    }

    #[test]
    fn test_daemon_invalid_value_ignored() {
        let config = loader().parse_str("Daemon sometimes\n", "t").unwrap();
        assert_eq!(config.daemon, None);
        assert!(config.daemon());
    }

    #[test]
    fn test_misplaced_keys_ignored() {
        let config = loader()
            .parse_str("Hostname stray.example.com\nFirewallRule allow\n", "t")
            .unwrap();
        assert!(config.auth_servers.is_empty());
        assert!(config.rulesets.is_empty());
    }

    #[test]
    fn test_stray_braces_skipped() {
        let config = loader()
            .parse_str("AuthServer\n{\n Hostname a.example.com\n}\n}\n", "t")
            .unwrap();
        // Opening brace on its own line, closing brace repeated
        assert_eq!(config.auth_server().unwrap().hostname, "a.example.com");
    }

    #[test]
    fn test_ruleset_without_name_is_fatal() {
        let err = loader().parse_str("FirewallRuleSet {\n}\n", "t").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRulesetName { line: 1, .. }));
    }

    #[test]
    fn test_ruleset_reopened_accumulates() {
        let text = "\
FirewallRuleSet global {
    FirewallRule allow tcp port 22
}
FirewallRuleSet global {
    FirewallRule drop
}
";
        let config = loader().parse_str(text, "t").unwrap();
        let rules = config.ruleset("global");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].port.as_deref(), Some("22"));
        assert_eq!(rules[1].target, FirewallTarget::Drop);
    }

    #[test]
    fn test_trusted_mac_list_full_value() {
        let config = loader()
            .parse_str(
                "TrustedMACList AA:BB:CC:DD:EE:FF, aa:bb:cc:dd:ee:ff, 11:22:33:44:55:66\n",
                "t",
            )
            .unwrap();
        assert_eq!(config.trusted_macs(), ["aa:bb:cc:dd:ee:ff", "11:22:33:44:55:66"]);
    }

    #[test]
    fn test_log_server_block_consumed() {
        let text = "LogServer {\n Hostname log.example.com\n LogPort 514\n}\nGatewayInterface br0\n";
        let config = loader().parse_str(text, "t").unwrap();
        assert_eq!(config.log_servers.len(), 1);
        assert_eq!(config.gateway_interface.as_deref(), Some("br0"));
    }

    #[test]
    fn test_username_without_password_is_fatal() {
        let err = loader().parse_str("HTTPDUserName admin\n", "t").unwrap_err();
        assert!(matches!(err, ConfigError::MissingHttpdPassword));

        let config = loader()
            .parse_str("HTTPDUserName admin\nHTTPDPassword secret\n", "t")
            .unwrap();
        assert_eq!(config.httpd_password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_portal_server_resolved_through_loader() {
        struct Fixed;
        impl HostResolver for Fixed {
            fn resolve_ipv4(&self, _host: &str) -> Option<Ipv4Addr> {
                Some(Ipv4Addr::new(198, 51, 100, 7))
            }
        }

        let config = ConfigLoader::new()
            .with_resolver(Fixed)
            .parse_str("PortalServer {\n Hostname portal.example.com\n}\n", "t")
            .unwrap();
        assert_eq!(
            config.portal_server().unwrap().last_ip,
            Some(Ipv4Addr::new(198, 51, 100, 7))
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = loader().load(file.path()).unwrap();
        assert_eq!(config.config_file, file.path());
        assert_eq!(config.auth_servers.len(), 2);
    }

    #[test]
    fn test_load_incomplete_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"GatewayID lonely\n").unwrap();

        let err = loader().load(file.path()).unwrap_err();
        match err {
            ConfigError::Incomplete { missing } => {
                assert_eq!(missing, ["GatewayInterface", "AuthServer"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader().load(dir.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::Open { .. }));
    }

    #[test]
    fn test_every_directive_maps_to_its_field() {
        let text = "\
Daemon no
DebugLevel 7
ExternalInterface eth1
GatewayID gw-9
DevID dev-42
GatewayInterface br-guest
GatewayAddress 10.10.0.1
GatewayPort 2061
HTTPDMaxConn 25
HTTPDName guestd
HTTPDRealm Lobby
HTTPDUserName admin
HTTPDPassword secret
ClientTimeout 11
CheckInterval 12
AuthInterval 13
SyslogFacility 17
WdctlSocket /run/wdctl.sock
TrustedMACList 00:11:22:33:44:55
HtmlMessageFile /srv/msg.html
ProxyPort 8080
AuthServer {
    Hostname auth.example.com
}
PortalServer {
    Hostname portal.example.com
}
PlatformServer {
    Hostname platform.example.com
    HTTPPort 8000
}
LogServer {
    Hostname log.example.com
}
FirewallRuleSet validating-users {
    FirewallRule allow to 0.0.0.0/0
}
";
        let config = loader().parse_str(text, "full.conf").unwrap();

        assert_eq!(config.daemon, Some(false));
        assert_eq!(config.debug_level, 7);
        assert_eq!(config.external_interface.as_deref(), Some("eth1"));
        assert_eq!(config.gateway_id.as_deref(), Some("gw-9"));
        assert_eq!(config.dev_id.as_deref(), Some("dev-42"));
        assert_eq!(config.gateway_interface.as_deref(), Some("br-guest"));
        assert_eq!(config.gateway_address.as_deref(), Some("10.10.0.1"));
        assert_eq!(config.gateway_port, 2061);
        assert_eq!(config.httpd_max_conn, 25);
        assert_eq!(config.httpd_name.as_deref(), Some("guestd"));
        assert_eq!(config.httpd_realm, "Lobby");
        assert_eq!(config.httpd_username.as_deref(), Some("admin"));
        assert_eq!(config.httpd_password.as_deref(), Some("secret"));
        assert_eq!(config.client_timeout, 11);
        assert_eq!(config.check_interval, 12);
        assert_eq!(config.auth_interval, 13);
        assert_eq!(config.syslog_facility, 17);
        assert_eq!(config.wdctl_socket, PathBuf::from("/run/wdctl.sock"));
        assert_eq!(config.trusted_macs(), ["00:11:22:33:44:55"]);
        assert_eq!(config.html_message_file, PathBuf::from("/srv/msg.html"));
        assert_eq!(config.proxy_port, 8080);

        assert_eq!(config.auth_server().unwrap().hostname, "auth.example.com");
        assert_eq!(config.portal_server().unwrap().hostname, "portal.example.com");
        let platform = config.platform_server().unwrap();
        assert_eq!(platform.hostname, "platform.example.com");
        assert_eq!(platform.http_port, 8000);
        // LogServer blocks leave the built-in entry alone
        assert_eq!(config.log_servers.len(), 1);
        assert_ne!(config.log_server().unwrap().hostname, "log.example.com");
        assert_eq!(config.ruleset("validating-users").len(), 1);

        assert!(ConfigValidator::validate(&config).is_ok());
    }

    #[test]
    fn test_only_interface_and_auth_are_mandatory() {
        let ok = "GatewayInterface br-lan\nAuthServer {\n Hostname a\n}\n";
        let config = loader().parse_str(ok, "t").unwrap();
        assert!(ConfigValidator::validate(&config).is_ok());

        let no_auth = loader().parse_str("GatewayInterface br-lan\n", "t").unwrap();
        assert!(ConfigValidator::validate(&no_auth).is_err());

        let no_iface = loader().parse_str("AuthServer {\n Hostname a\n}\n", "t").unwrap();
        assert!(ConfigValidator::validate(&no_iface).is_err());
    }
}
