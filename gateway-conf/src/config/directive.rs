//! Configuration keywords
//!
//! Keywords are matched case-insensitively against a fixed table. The table
//! is built once on first use and cached in a `LazyLock`.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Every keyword the configuration file understands, top-level and
/// block-only alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    Daemon,
    DebugLevel,
    ExternalInterface,
    GatewayId,
    DevId,
    GatewayInterface,
    GatewayAddress,
    GatewayPort,
    AuthServer,
    PortalServer,
    PlatformServer,
    LogServer,
    HttpdMaxConn,
    HttpdName,
    HttpdRealm,
    HttpdUsername,
    HttpdPassword,
    ClientTimeout,
    CheckInterval,
    AuthInterval,
    SyslogFacility,
    WdctlSocket,
    TrustedMacList,
    HtmlMessageFile,
    ProxyPort,
    FirewallRuleSet,
    FirewallRule,
    // Server block only
    Hostname,
    SslAvailable,
    SslPort,
    HttpPort,
    LogPort,
    Path,
    LoginScriptPathFragment,
    PortalScriptPathFragment,
    MsgScriptPathFragment,
    PingScriptPathFragment,
    AuthScriptPathFragment,
}

/// Every directive; the keyword table is built from this list
const ALL: [Directive; 38] = [
    Directive::Daemon,
    Directive::DebugLevel,
    Directive::ExternalInterface,
    Directive::GatewayId,
    Directive::DevId,
    Directive::GatewayInterface,
    Directive::GatewayAddress,
    Directive::GatewayPort,
    Directive::AuthServer,
    Directive::PortalServer,
    Directive::PlatformServer,
    Directive::LogServer,
    Directive::HttpdMaxConn,
    Directive::HttpdName,
    Directive::HttpdRealm,
    Directive::HttpdUsername,
    Directive::HttpdPassword,
    Directive::ClientTimeout,
    Directive::CheckInterval,
    Directive::AuthInterval,
    Directive::SyslogFacility,
    Directive::WdctlSocket,
    Directive::TrustedMacList,
    Directive::HtmlMessageFile,
    Directive::ProxyPort,
    Directive::FirewallRuleSet,
    Directive::FirewallRule,
    Directive::Hostname,
    Directive::SslAvailable,
    Directive::SslPort,
    Directive::HttpPort,
    Directive::LogPort,
    Directive::Path,
    Directive::LoginScriptPathFragment,
    Directive::PortalScriptPathFragment,
    Directive::MsgScriptPathFragment,
    Directive::PingScriptPathFragment,
    Directive::AuthScriptPathFragment,
];

static KEYWORD_TABLE: LazyLock<HashMap<&'static str, Directive>> =
    LazyLock::new(|| ALL.iter().map(|d| (d.keyword(), *d)).collect());

impl Directive {
    /// Look up a keyword, ignoring ASCII case. Returns `None` for anything
    /// not in the table.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        KEYWORD_TABLE
            .get(keyword.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Canonical (lower-case) spelling of the keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Directive::Daemon => "daemon",
            Directive::DebugLevel => "debuglevel",
            Directive::ExternalInterface => "externalinterface",
            Directive::GatewayId => "gatewayid",
            Directive::DevId => "devid",
            Directive::GatewayInterface => "gatewayinterface",
            Directive::GatewayAddress => "gatewayaddress",
            Directive::GatewayPort => "gatewayport",
            Directive::AuthServer => "authserver",
            Directive::PortalServer => "portalserver",
            Directive::PlatformServer => "platformserver",
            Directive::LogServer => "logserver",
            Directive::HttpdMaxConn => "httpdmaxconn",
            Directive::HttpdName => "httpdname",
            Directive::HttpdRealm => "httpdrealm",
            Directive::HttpdUsername => "httpdusername",
            Directive::HttpdPassword => "httpdpassword",
            Directive::ClientTimeout => "clienttimeout",
            Directive::CheckInterval => "checkinterval",
            Directive::AuthInterval => "authinterval",
            Directive::SyslogFacility => "syslogfacility",
            Directive::WdctlSocket => "wdctlsocket",
            Directive::TrustedMacList => "trustedmaclist",
            Directive::HtmlMessageFile => "htmlmessagefile",
            Directive::ProxyPort => "proxyport",
            Directive::FirewallRuleSet => "firewallruleset",
            Directive::FirewallRule => "firewallrule",
            Directive::Hostname => "hostname",
            Directive::SslAvailable => "sslavailable",
            Directive::SslPort => "sslport",
            Directive::HttpPort => "httpport",
            Directive::LogPort => "logport",
            Directive::Path => "path",
            Directive::LoginScriptPathFragment => "loginscriptpathfragment",
            Directive::PortalScriptPathFragment => "portalscriptpathfragment",
            Directive::MsgScriptPathFragment => "msgscriptpathfragment",
            Directive::PingScriptPathFragment => "pingscriptpathfragment",
            Directive::AuthScriptPathFragment => "authscriptpathfragment",
        }
    }

    /// Keys that are only meaningful inside a server block
    pub fn is_server_key(self) -> bool {
        matches!(
            self,
            Directive::Hostname
                | Directive::SslAvailable
                | Directive::SslPort
                | Directive::HttpPort
                | Directive::LogPort
                | Directive::Path
                | Directive::LoginScriptPathFragment
                | Directive::PortalScriptPathFragment
                | Directive::MsgScriptPathFragment
                | Directive::PingScriptPathFragment
                | Directive::AuthScriptPathFragment
        )
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        assert_eq!(Directive::from_keyword("GatewayInterface"), Some(Directive::GatewayInterface));
        assert_eq!(Directive::from_keyword("GATEWAYINTERFACE"), Some(Directive::GatewayInterface));
        assert_eq!(Directive::from_keyword("firewallRuleSet"), Some(Directive::FirewallRuleSet));
        assert_eq!(Directive::from_keyword("FirewallRule"), Some(Directive::FirewallRule));
    }

    #[test]
    fn test_unknown_keyword() {
        assert_eq!(Directive::from_keyword("gatewayinterfaces"), None);
        assert_eq!(Directive::from_keyword(""), None);
        assert_eq!(Directive::from_keyword("}"), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        for directive in ALL {
            assert_eq!(Directive::from_keyword(directive.keyword()), Some(directive));
            assert_eq!(
                Directive::from_keyword(&directive.keyword().to_ascii_uppercase()),
                Some(directive)
            );
        }
        assert_eq!(KEYWORD_TABLE.len(), ALL.len());
    }

    #[test]
    fn test_display_uses_keyword() {
        assert_eq!(Directive::HttpdMaxConn.to_string(), "httpdmaxconn");
        assert_eq!(Directive::AuthScriptPathFragment.to_string(), "authscriptpathfragment");
    }

    #[test]
    fn test_server_keys() {
        assert!(Directive::Hostname.is_server_key());
        assert!(Directive::LogPort.is_server_key());
        assert!(!Directive::AuthServer.is_server_key());
        assert!(!Directive::FirewallRule.is_server_key());
    }
}
