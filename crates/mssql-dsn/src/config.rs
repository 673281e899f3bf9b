//! Resolved connection parameters.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bitflags::bitflags;

use crate::error::DsnError;

/// Port used when the DSN does not name one.
pub const DEFAULT_SERVER_PORT: u16 = 1433;

/// Default TDS packet size.
pub const DEFAULT_PACKET_SIZE: u16 = 4096;

/// Smallest packet size the server accepts.
pub const MIN_PACKET_SIZE: u16 = 512;

/// Largest packet size the server accepts.
///
/// Encrypted connections are capped at 16383 bytes by the server, which
/// answers a larger request with an ENVCHANGE.
pub const MAX_PACKET_SIZE: u16 = 32767;

/// Default TCP dial timeout.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(15);

/// Default TCP keep-alive interval.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(30);

bitflags! {
    /// LOGIN7 type flags requested by the DSN.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u8 {
        /// Route the connection to a read-only replica.
        const READ_ONLY_INTENT = 0x20;
    }
}

bitflags! {
    /// Driver logging categories selected with the `log` parameter.
    ///
    /// Bits without a name are kept as given.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct LogFlags: u64 {
        /// Log errors.
        const ERRORS = 1;
        /// Log server messages.
        const MESSAGES = 2;
        /// Log rows affected.
        const ROWS = 4;
        /// Log SQL statements.
        const SQL = 8;
        /// Log statement parameters.
        const PARAMS = 16;
        /// Log transaction begin/end.
        const TRANSACTION = 32;
        /// Log debug details.
        const DEBUG = 64;
    }
}

/// Key store used to unwrap column encryption keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyStoreAuthentication {
    /// PKCS#12 file.
    Pfx,
}

impl KeyStoreAuthentication {
    /// The DSN spelling of this method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pfx => "pfx",
        }
    }
}

impl fmt::Display for KeyStoreAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStoreAuthentication {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pfx") {
            Ok(Self::Pfx)
        } else {
            Err(DsnError::UnknownKeyStoreAuthentication(s.to_string()))
        }
    }
}

/// Federated authentication library announced in LOGIN7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FedAuthLibrary {
    /// Live ID compact token.
    LiveId = 0x00,
    /// Security token supplied by the client.
    SecurityToken = 0x01,
    /// Token acquired through ADAL.
    Adal = 0x02,
    /// No federated authentication.
    Reserved = 0x7F,
}

/// Connection parameters resolved from a DSN.
///
/// Produced by [`crate::Resolver::resolve`] or [`crate::parse_connect_params`]
/// and never modified afterwards. Fields are read by the network, TLS,
/// authentication and column-encryption layers.
#[derive(Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ConnectParams {
    /// Server hostname or IP address. Never empty.
    pub host: String,
    /// Named instance, empty when not given.
    pub instance: String,
    /// Database name, empty when not given.
    pub database: String,
    /// SQL login name, empty for integrated or federated auth.
    pub user: String,
    /// SQL login password.
    pub password: String,
    /// TCP dial timeout (default: 15s).
    pub dial_timeout: Duration,
    /// Overall connection timeout; zero means none (default: 0).
    pub conn_timeout: Duration,
    /// TCP keep-alive interval (default: 30s).
    pub keep_alive: Duration,
    /// Server port; 0 means not given, see [`ConnectParams::resolved_port`].
    pub port: u16,
    /// TDS packet size, always within 512..=32767 (default: 4096).
    pub packet_size: u16,
    /// Whether TLS was requested.
    pub encrypt: bool,
    /// Whether encryption was explicitly disabled with `encrypt=disable`.
    pub disable_encryption: bool,
    /// Whether to skip server certificate validation.
    pub trust_server_certificate: bool,
    /// Path to a CA certificate for validating the server.
    pub certificate: String,
    /// Host name expected in the server certificate. Never empty.
    pub host_in_certificate: String,
    /// Whether `host_in_certificate` came from the DSN.
    pub host_in_certificate_provided: bool,
    /// Service principal name for integrated authentication.
    pub server_spn: String,
    /// Client workstation name.
    pub workstation: String,
    /// Application name sent to the server.
    pub app_name: String,
    /// LOGIN7 type flags.
    pub type_flags: TypeFlags,
    /// Database mirroring failover partner.
    pub fail_over_partner: String,
    /// Database mirroring failover port.
    pub fail_over_port: u16,
    /// Federated authentication library.
    pub fed_auth_library: FedAuthLibrary,
    /// ADAL workflow, meaningful only with [`FedAuthLibrary::Adal`].
    pub fed_auth_adal_workflow: u8,
    /// Whether Always Encrypted is enabled.
    pub column_encryption: bool,
    /// Key store method for column encryption keys.
    pub key_store_authentication: Option<KeyStoreAuthentication>,
    /// Key store path; existed when the DSN was resolved.
    pub key_store_location: String,
    /// Key store password.
    pub key_store_secret: String,
    /// Driver logging categories.
    pub log_flags: LogFlags,
}

impl ConnectParams {
    /// The port to dial, substituting 1433 when none was given.
    #[must_use]
    pub fn resolved_port(&self) -> u16 {
        resolve_server_port(self.port)
    }

    /// Check whether read-only application intent was requested.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.type_flags.contains(TypeFlags::READ_ONLY_INTENT)
    }

    /// Check whether a failover partner is configured.
    #[must_use]
    pub fn has_fail_over_partner(&self) -> bool {
        !self.fail_over_partner.is_empty()
    }
}

impl FromStr for ConnectParams {
    type Err = DsnError;

    fn from_str(dsn: &str) -> Result<Self, Self::Err> {
        crate::parse_connect_params(dsn)
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never expose secrets in debug output
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("instance", &self.instance)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("dial_timeout", &self.dial_timeout)
            .field("conn_timeout", &self.conn_timeout)
            .field("keep_alive", &self.keep_alive)
            .field("port", &self.port)
            .field("packet_size", &self.packet_size)
            .field("encrypt", &self.encrypt)
            .field("disable_encryption", &self.disable_encryption)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("certificate", &self.certificate)
            .field("host_in_certificate", &self.host_in_certificate)
            .field(
                "host_in_certificate_provided",
                &self.host_in_certificate_provided,
            )
            .field("server_spn", &self.server_spn)
            .field("workstation", &self.workstation)
            .field("app_name", &self.app_name)
            .field("type_flags", &self.type_flags)
            .field("fail_over_partner", &self.fail_over_partner)
            .field("fail_over_port", &self.fail_over_port)
            .field("fed_auth_library", &self.fed_auth_library)
            .field("fed_auth_adal_workflow", &self.fed_auth_adal_workflow)
            .field("column_encryption", &self.column_encryption)
            .field("key_store_authentication", &self.key_store_authentication)
            .field("key_store_location", &self.key_store_location)
            .field("key_store_secret", &"[REDACTED]")
            .field("log_flags", &self.log_flags)
            .finish()
    }
}

/// Substitute the default server port for 0.
#[must_use]
pub fn resolve_server_port(port: u16) -> u16 {
    if port == 0 { DEFAULT_SERVER_PORT } else { port }
}

/// Build the service principal name for a host and port.
#[must_use]
pub fn generate_spn(host: &str, port: u16) -> String {
    format!("MSSQLSvc/{host}:{port}")
}
