//! Parameter resolution.
//!
//! Turns a [`RawParams`] map into [`ConnectParams`], applying defaults,
//! unit conversions, clamping and the checks that involve several fields.
//! Resolution stops at the first invalid parameter.

use std::time::Duration;

use crate::config::{
    ConnectParams, DEFAULT_DIAL_TIMEOUT, DEFAULT_KEEP_ALIVE, DEFAULT_PACKET_SIZE, FedAuthLibrary,
    KeyStoreAuthentication, LogFlags, MAX_PACKET_SIZE, MIN_PACKET_SIZE, TypeFlags, generate_spn,
    resolve_server_port,
};
use crate::error::{DsnError, Result};
use crate::params::RawParams;
use crate::value::{Radix, parse_bool, parse_secs, parse_u16, parse_uint};

/// Application name used when the DSN does not set `app name`.
pub const DEFAULT_APP_NAME: &str = "mssql-dsn";

/// Parameter names the resolver understands.
pub const KNOWN_KEYS: &[&str] = &[
    "server",
    "port",
    "database",
    "user id",
    "password",
    "log",
    "packet size",
    "connection timeout",
    "dial timeout",
    "keepalive",
    "encrypt",
    "trustservercertificate",
    "certificate",
    "hostnameincertificate",
    "serverspn",
    "workstation id",
    "app name",
    "applicationintent",
    "failoverpartner",
    "failoverport",
    "columnencryption",
    "keystoreauthentication",
    "keystorelocation",
    "keystoresecret",
];

/// Values the resolver starts from before reading the DSN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveDefaults {
    /// Application name when `app name` is absent (default: `mssql-dsn`).
    pub app_name: String,
    /// Workstation name when `workstation id` is absent (default: none).
    pub workstation: Option<String>,
    /// Federated authentication library (default: reserved).
    pub fed_auth_library: FedAuthLibrary,
    /// ADAL workflow sent with [`FedAuthLibrary::Adal`] (default: 0).
    pub fed_auth_adal_workflow: u8,
}

impl Default for ResolveDefaults {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            workstation: None,
            fed_auth_library: FedAuthLibrary::Reserved,
            fed_auth_adal_workflow: 0,
        }
    }
}

impl ResolveDefaults {
    /// Create defaults with no workstation name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create defaults using the local hostname as workstation name.
    #[must_use]
    pub fn from_system() -> Self {
        Self {
            workstation: system_hostname(),
            ..Self::default()
        }
    }

    /// Set the fallback application name.
    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Set the fallback workstation name.
    #[must_use]
    pub fn workstation(mut self, workstation: impl Into<String>) -> Self {
        self.workstation = Some(workstation.into());
        self
    }

    /// Set the federated authentication library.
    #[must_use]
    pub fn fed_auth_library(mut self, library: FedAuthLibrary) -> Self {
        self.fed_auth_library = library;
        self
    }

    /// Set the ADAL workflow.
    #[must_use]
    pub fn fed_auth_adal_workflow(mut self, workflow: u8) -> Self {
        self.fed_auth_adal_workflow = workflow;
        self
    }
}

fn system_hostname() -> Option<String> {
    gethostname::gethostname()
        .into_string()
        .ok()
        .filter(|name| !name.is_empty())
}

/// Resolves raw parameters into [`ConnectParams`].
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    defaults: ResolveDefaults,
}

impl Resolver {
    /// Create a resolver starting from `defaults`.
    #[must_use]
    pub fn new(defaults: ResolveDefaults) -> Self {
        Self { defaults }
    }

    /// The starting values of this resolver.
    #[must_use]
    pub fn defaults(&self) -> &ResolveDefaults {
        &self.defaults
    }

    /// Resolve a parameter map.
    pub fn resolve(&self, params: &RawParams) -> Result<ConnectParams> {
        for key in params.keys() {
            if !KNOWN_KEYS.contains(&key) {
                tracing::debug!(key = key, "ignoring unknown connection string option");
            }
        }

        let log_flags = match params.get("log") {
            Some(v) => LogFlags::from_bits_retain(parse_uint("log", v, Radix::Decimal, u64::MAX)?),
            None => LogFlags::empty(),
        };

        let (host, instance) = split_server(params.get("server").unwrap_or_default());
        let database = owned(params.get("database"));
        let user = owned(params.get("user id"));
        let password = owned(params.get("password"));

        let port = match params.get("port") {
            Some(v) => parse_u16("port", v, Radix::Decimal)?,
            None => 0,
        };

        let packet_size = match params.get("packet size") {
            Some(v) => clamp_packet_size(parse_uint("packet size", v, Radix::Auto, u64::MAX)?),
            None => DEFAULT_PACKET_SIZE,
        };

        let conn_timeout =
            optional_secs(params, "connection timeout")?.unwrap_or(Duration::ZERO);
        let dial_timeout = optional_secs(params, "dial timeout")?.unwrap_or(DEFAULT_DIAL_TIMEOUT);
        let keep_alive = optional_secs(params, "keepalive")?.unwrap_or(DEFAULT_KEEP_ALIVE);

        let mut encrypt = false;
        let mut disable_encryption = false;
        let mut trust_server_certificate = false;
        match params.get("encrypt") {
            Some(v) if v.eq_ignore_ascii_case("disable") => disable_encryption = true,
            Some(v) => encrypt = parse_bool("encrypt", v)?,
            None => trust_server_certificate = true,
        }

        let column_encryption = match params.get("columnencryption") {
            Some(v) if v.eq_ignore_ascii_case("true") => true,
            Some(v) => parse_bool("columnencryption", v)?,
            None => false,
        };

        let key_store_authentication = params
            .get("keystoreauthentication")
            .map(str::parse::<KeyStoreAuthentication>)
            .transpose()?;

        let key_store_location = match params.get("keystorelocation") {
            Some(path) => check_key_store(path)?,
            None => String::new(),
        };
        let key_store_secret = owned(params.get("keystoresecret"));

        if let Some(v) = params.get("trustservercertificate") {
            trust_server_certificate = parse_bool("trustservercertificate", v)?;
        }
        let certificate = owned(params.get("certificate"));
        let (host_in_certificate, host_in_certificate_provided) =
            match params.get("hostnameincertificate") {
                Some(v) if !v.is_empty() => (v.to_string(), true),
                _ => (host.clone(), false),
            };

        let server_spn = match params.get("serverspn") {
            Some(v) => v.to_string(),
            None => generate_spn(&host, resolve_server_port(port)),
        };

        let workstation = match params.get("workstation id") {
            Some(v) => v.to_string(),
            None => match &self.defaults.workstation {
                Some(default) => {
                    tracing::debug!(
                        workstation = %default,
                        "workstation id not set, using default workstation"
                    );
                    default.clone()
                }
                None => {
                    tracing::debug!("workstation id not set and no default, leaving it empty");
                    String::new()
                }
            },
        };

        let app_name = params
            .get("app name")
            .map_or_else(|| self.defaults.app_name.clone(), str::to_string);

        let mut type_flags = TypeFlags::empty();
        if params.get("applicationintent") == Some("ReadOnly") {
            if database.is_empty() {
                return Err(DsnError::MissingDatabaseForReadOnly);
            }
            type_flags |= TypeFlags::READ_ONLY_INTENT;
        }

        let fail_over_partner = owned(params.get("failoverpartner"));
        let fail_over_port = match params.get("failoverport") {
            Some(v) => parse_u16("failoverport", v, Radix::Auto)?,
            None => 0,
        };

        Ok(ConnectParams {
            host,
            instance,
            database,
            user,
            password,
            dial_timeout,
            conn_timeout,
            keep_alive,
            port,
            packet_size,
            encrypt,
            disable_encryption,
            trust_server_certificate,
            certificate,
            host_in_certificate,
            host_in_certificate_provided,
            server_spn,
            workstation,
            app_name,
            type_flags,
            fail_over_partner,
            fail_over_port,
            fed_auth_library: self.defaults.fed_auth_library,
            fed_auth_adal_workflow: self.defaults.fed_auth_adal_workflow,
            column_encryption,
            key_store_authentication,
            key_store_location,
            key_store_secret,
            log_flags,
        })
    }
}

fn owned(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn optional_secs(params: &RawParams, key: &'static str) -> Result<Option<Duration>> {
    params.get(key).map(|v| parse_secs(key, v)).transpose()
}

/// Split `host\instance`, mapping local aliases to `localhost`.
fn split_server(server: &str) -> (String, String) {
    let (host, instance) = server.split_once('\\').unwrap_or((server, ""));
    let host = if host.is_empty() || host == "." || host.eq_ignore_ascii_case("(local)") {
        "localhost"
    } else {
        host
    };
    (host.to_string(), instance.to_string())
}

fn clamp_packet_size(requested: u64) -> u16 {
    let clamped = requested.clamp(u64::from(MIN_PACKET_SIZE), u64::from(MAX_PACKET_SIZE));
    if clamped != requested {
        tracing::debug!(requested, clamped, "packet size out of range, clamping");
    }
    // clamped is at most MAX_PACKET_SIZE
    u16::try_from(clamped).unwrap_or(MAX_PACKET_SIZE)
}

fn check_key_store(path: &str) -> Result<String> {
    if path.is_empty() {
        return Err(DsnError::EmptyKeyStoreLocation);
    }
    std::fs::metadata(path).map_err(|source| DsnError::KeyStoreNotFound {
        path: path.to_string(),
        source,
    })?;
    Ok(path.to_string())
}
