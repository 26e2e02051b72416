//! Configuration data model and defaults

use crate::firewall::{FirewallRule, RulesetCollection};
use crate::pool::ServerPool;
use crate::trusted_mac::TrustedMacList;
use serde::Serialize;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_CONFIG_FILE: &str = "/etc/gateway.conf";
pub const DEFAULT_HTML_MESSAGE_FILE: &str = "/etc/gateway-msg.html";
/// syslog `LOG_INFO`
pub const DEFAULT_DEBUG_LEVEL: i32 = 6;
pub const DEFAULT_HTTPD_MAX_CONN: u32 = 10;
pub const DEFAULT_GATEWAY_PORT: u16 = 2060;
pub const DEFAULT_HTTPD_REALM: &str = "Gateway";
pub const DEFAULT_CLIENT_TIMEOUT: u32 = 5;
pub const DEFAULT_CHECK_INTERVAL: u32 = 60;
pub const DEFAULT_AUTH_INTERVAL: u32 = 60;
/// syslog `LOG_DAEMON`
pub const DEFAULT_SYSLOG_FACILITY: i32 = 3 << 3;
pub const DEFAULT_DAEMON: bool = true;
pub const DEFAULT_LOG_SYSLOG: bool = false;
pub const DEFAULT_WDCTL_SOCKET: &str = "/tmp/wdctl.sock";
pub const DEFAULT_INTERNAL_SOCKET: &str = "/tmp/gateway.sock";

pub const DEFAULT_SERVER_PATH: &str = "/gateway/";
pub const DEFAULT_LOGIN_PATH_FRAGMENT: &str = "login/?";
pub const DEFAULT_PORTAL_PATH_FRAGMENT: &str = "portal/?";
pub const DEFAULT_MSG_PATH_FRAGMENT: &str = "gw_message.php?";
pub const DEFAULT_PING_PATH_FRAGMENT: &str = "ping/?";
pub const DEFAULT_AUTH_PATH_FRAGMENT: &str = "auth/?";
pub const DEFAULT_SERVER_HTTP_PORT: u16 = 80;
pub const DEFAULT_SERVER_SSL_PORT: u16 = 443;
pub const DEFAULT_SERVER_SSL_AVAILABLE: bool = false;

pub const DEFAULT_LOG_SERVER: &str = "localhost";
pub const DEFAULT_UPDATE_SERVER: &str = "localhost";
pub const DEFAULT_UPDATE_SERVER_PATH: &str = "/update/";
pub const DEFAULT_UPDATE_PATH_FRAGMENT: &str = "update?";

/// One upstream server of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerEntry {
    pub hostname: String,
    pub use_ssl: bool,
    pub path: String,
    pub login_script_path_fragment: String,
    pub portal_script_path_fragment: String,
    pub msg_script_path_fragment: String,
    pub ping_script_path_fragment: String,
    pub auth_script_path_fragment: String,
    /// Only set on update servers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_script_path_fragment: Option<String>,
    pub http_port: u16,
    pub ssl_port: u16,
    /// Last address the hostname resolved to. A cache, never authoritative.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ip: Option<Ipv4Addr>,
}

impl ServerEntry {
    /// An entry with every field at its default
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            use_ssl: DEFAULT_SERVER_SSL_AVAILABLE,
            path: DEFAULT_SERVER_PATH.to_string(),
            login_script_path_fragment: DEFAULT_LOGIN_PATH_FRAGMENT.to_string(),
            portal_script_path_fragment: DEFAULT_PORTAL_PATH_FRAGMENT.to_string(),
            msg_script_path_fragment: DEFAULT_MSG_PATH_FRAGMENT.to_string(),
            ping_script_path_fragment: DEFAULT_PING_PATH_FRAGMENT.to_string(),
            auth_script_path_fragment: DEFAULT_AUTH_PATH_FRAGMENT.to_string(),
            update_script_path_fragment: None,
            http_port: DEFAULT_SERVER_HTTP_PORT,
            ssl_port: DEFAULT_SERVER_SSL_PORT,
            last_ip: None,
        }
    }

    /// The implicit entry of the log pool
    pub fn default_log_server() -> Self {
        Self::new(DEFAULT_LOG_SERVER)
    }

    /// The implicit entry of the update pool
    pub fn default_update_server() -> Self {
        Self {
            path: DEFAULT_UPDATE_SERVER_PATH.to_string(),
            update_script_path_fragment: Some(DEFAULT_UPDATE_PATH_FRAGMENT.to_string()),
            ..Self::new(DEFAULT_UPDATE_SERVER)
        }
    }

    /// Store a freshly resolved address. Returns true if the cache changed.
    pub fn cache_address(&mut self, addr: Ipv4Addr) -> bool {
        if self.last_ip == Some(addr) {
            return false;
        }
        self.last_ip = Some(addr);
        true
    }
}

/// Complete gateway configuration.
///
/// Built once by [`crate::ConfigLoader`], then shared read-only (usually as
/// `Arc<Config>`). The only mutation after parsing is auth server failover,
/// see [`Config::mark_auth_server_bad`].
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub config_file: PathBuf,
    pub html_message_file: PathBuf,
    pub debug_level: i32,
    pub httpd_max_conn: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_address: Option<String>,
    pub gateway_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub httpd_name: Option<String>,
    pub httpd_realm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub httpd_username: Option<String>,
    #[serde(skip)]
    pub httpd_password: Option<String>,
    pub client_timeout: u32,
    pub check_interval: u32,
    pub auth_interval: u32,
    pub syslog_facility: i32,
    /// `None` until set by the command line or the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daemon: Option<bool>,
    pub log_syslog: bool,
    pub wdctl_socket: PathBuf,
    pub internal_socket: PathBuf,
    pub proxy_port: u16,
    pub trusted_macs: TrustedMacList,
    pub auth_servers: ServerPool,
    pub portal_servers: ServerPool,
    pub platform_servers: ServerPool,
    pub log_servers: ServerPool,
    pub update_servers: ServerPool,
    pub rulesets: RulesetCollection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            html_message_file: PathBuf::from(DEFAULT_HTML_MESSAGE_FILE),
            debug_level: DEFAULT_DEBUG_LEVEL,
            httpd_max_conn: DEFAULT_HTTPD_MAX_CONN,
            external_interface: None,
            gateway_id: None,
            dev_id: None,
            gateway_interface: None,
            gateway_address: None,
            gateway_port: DEFAULT_GATEWAY_PORT,
            httpd_name: None,
            httpd_realm: DEFAULT_HTTPD_REALM.to_string(),
            httpd_username: None,
            httpd_password: None,
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            check_interval: DEFAULT_CHECK_INTERVAL,
            auth_interval: DEFAULT_AUTH_INTERVAL,
            syslog_facility: DEFAULT_SYSLOG_FACILITY,
            daemon: None,
            log_syslog: DEFAULT_LOG_SYSLOG,
            wdctl_socket: PathBuf::from(DEFAULT_WDCTL_SOCKET),
            internal_socket: PathBuf::from(DEFAULT_INTERNAL_SOCKET),
            proxy_port: 0,
            trusted_macs: TrustedMacList::default(),
            auth_servers: ServerPool::default(),
            portal_servers: ServerPool::default(),
            platform_servers: ServerPool::default(),
            log_servers: ServerPool::from_entries([ServerEntry::default_log_server()]),
            update_servers: ServerPool::from_entries([ServerEntry::default_update_server()]),
            rulesets: RulesetCollection::default(),
        }
    }
}

impl Config {
    /// Effective daemon mode, falling back to the default when neither the
    /// command line nor the file set it
    pub fn daemon(&self) -> bool {
        self.daemon.unwrap_or(DEFAULT_DAEMON)
    }

    /// Current (first) auth server
    pub fn auth_server(&self) -> Option<Arc<ServerEntry>> {
        self.auth_servers.head()
    }

    pub fn portal_server(&self) -> Option<Arc<ServerEntry>> {
        self.portal_servers.head()
    }

    pub fn platform_server(&self) -> Option<Arc<ServerEntry>> {
        self.platform_servers.head()
    }

    pub fn log_server(&self) -> Option<Arc<ServerEntry>> {
        self.log_servers.head()
    }

    pub fn update_server(&self) -> Option<Arc<ServerEntry>> {
        self.update_servers.head()
    }

    /// Demote `bad` to the end of the auth pool if it is the current head.
    /// Returns true if the pool was rotated.
    pub fn mark_auth_server_bad(&self, bad: &Arc<ServerEntry>) -> bool {
        self.auth_servers.mark_bad(bad)
    }

    /// Rules of a named ruleset; unknown names give an empty slice
    pub fn ruleset(&self, name: &str) -> &[FirewallRule] {
        self.rulesets.get(name)
    }

    pub fn trusted_macs(&self) -> &[String] {
        self.trusted_macs.as_slice()
    }

    /// Render the configuration as TOML. The HTTP daemon password is never
    /// included.
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
