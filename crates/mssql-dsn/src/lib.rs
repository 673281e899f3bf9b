//! # mssql-dsn
//!
//! Parsing and validation of SQL Server connection strings.
//!
//! A DSN is accepted in one of three syntaxes, chosen by its literal prefix:
//!
//! | Prefix | Syntax | Example |
//! |--------|--------|---------|
//! | `odbc:` | ODBC, with `{}`-braced values | `odbc:server=db;password={a;b}}c}` |
//! | `sqlserver://` | URL | `sqlserver://sa:pw@db:1433/inst?database=app` |
//! | anything else | `key=value;` pairs | `server=db;database=app` |
//!
//! Every syntax is tokenized into the same [`RawParams`] map of lower-cased
//! names to string values, which the [`Resolver`] turns into typed,
//! validated [`ConnectParams`].
//!
//! ## Example
//!
//! ```rust
//! use mssql_dsn::parse_connect_params;
//!
//! let params = parse_connect_params("server=myhost\\inst1;database=app;packet size=100")?;
//! assert_eq!(params.host, "myhost");
//! assert_eq!(params.instance, "inst1");
//! assert_eq!(params.packet_size, 512);
//! # Ok::<(), mssql_dsn::DsnError>(())
//! ```
//!
//! Resolution does no I/O beyond checking that a configured key store path
//! exists.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod ado;
pub mod config;
pub mod error;
pub mod format;
pub mod odbc;
pub mod params;
pub mod resolve;
pub mod serialize;
pub mod uri;
pub mod value;

pub use config::{
    ConnectParams, DEFAULT_SERVER_PORT, FedAuthLibrary, KeyStoreAuthentication, LogFlags,
    TypeFlags,
};
pub use error::{DsnError, Result};
pub use format::{DsnFormat, split_dsn};
pub use params::RawParams;
pub use resolve::{ResolveDefaults, Resolver};

/// Parse and resolve a DSN of any supported syntax.
///
/// Uses [`ResolveDefaults::from_system`], so the workstation name falls back
/// to the local hostname.
pub fn parse_connect_params(dsn: &str) -> Result<ConnectParams> {
    parse_connect_params_with(dsn, &Resolver::new(ResolveDefaults::from_system()))
}

/// Parse a DSN and resolve it with `resolver`.
pub fn parse_connect_params_with(dsn: &str, resolver: &Resolver) -> Result<ConnectParams> {
    let params = split_dsn(dsn)?;
    resolver.resolve(&params)
}
