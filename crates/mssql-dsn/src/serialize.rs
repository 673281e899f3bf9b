//! Canonical URL form of resolved parameters.
//!
//! Only host, instance, credentials, database, log flags and the column
//! encryption settings are written. Resolving the output again reproduces
//! those fields; everything else falls back to its default.

use std::collections::BTreeMap;
use std::net::Ipv6Addr;

use url::form_urlencoded;

use crate::config::ConnectParams;
use crate::uri::SCHEME;

impl ConnectParams {
    /// Express these parameters as a `sqlserver://` URL.
    ///
    /// Credentials are always present in the user-info part, even when
    /// empty. Query parameters are written only when they differ from their
    /// default and are sorted by key.
    #[must_use]
    pub fn to_url(&self) -> String {
        let mut query = BTreeMap::new();
        if !self.database.is_empty() {
            query.insert("database", self.database.clone());
        }
        if !self.log_flags.is_empty() {
            query.insert("log", self.log_flags.bits().to_string());
        }
        if self.column_encryption {
            query.insert("columnEncryption", "true".to_string());
        }
        if let Some(auth) = self.key_store_authentication {
            query.insert("keyStoreAuthentication", auth.to_string());
        }
        if !self.key_store_location.is_empty() {
            query.insert("keyStoreLocation", self.key_store_location.clone());
        }
        if !self.key_store_secret.is_empty() {
            query.insert("keyStoreSecret", self.key_store_secret.clone());
        }

        let mut url = format!(
            "{SCHEME}://{}:{}@{}",
            urlencoding::encode(&self.user),
            urlencoding::encode(&self.password),
            encode_host(&self.host),
        );

        if !self.instance.is_empty() {
            url.push('/');
            url.push_str(&urlencoding::encode(&self.instance));
        }

        if !query.is_empty() {
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for (key, value) in &query {
                serializer.append_pair(key, value);
            }
            url.push('?');
            url.push_str(&serializer.finish());
        }

        url
    }
}

/// Bracket canonical IPv6 literals, percent-encode every other host.
///
/// Hosts such as `host:1433`, `[::1]` or `fe80::1%eth0` are not IPv6
/// literals the URL parser accepts, so they are written encoded and decode
/// back to the same string.
fn encode_host(host: &str) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(addr) if addr.to_string() == host => format!("[{host}]"),
        _ => urlencoding::encode(host).into_owned(),
    }
}
