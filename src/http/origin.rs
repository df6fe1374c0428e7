//! Origin parsing and same-origin checks
//!
//! An origin is `scheme://host[:port]`. Scheme and host compare
//! case-insensitively and the scheme's default port is dropped, so
//! `HTTPS://Example.com:443` and `https://example.com` are the same origin.

use crate::error::{SwcacheError, SwcacheResult};
use std::fmt;
use ureq::http::Uri;

/// A parsed web origin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

impl Origin {
    /// Parse the origin of an absolute `http(s)` URL
    pub fn parse(url: &str) -> SwcacheResult<Self> {
        let invalid = |reason: &str| SwcacheError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri: Uri = url.trim().parse().map_err(|e| SwcacheError::InvalidUrl {
            url: url.to_string(),
            reason: format!("{}", e),
        })?;

        let scheme = uri
            .scheme_str()
            .ok_or_else(|| invalid("missing scheme"))?
            .to_ascii_lowercase();
        if default_port(&scheme).is_none() {
            return Err(invalid("only http and https are supported"));
        }

        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| invalid("missing host"))?
            .to_ascii_lowercase();

        let port = uri
            .port_u16()
            .filter(|p| Some(*p) != default_port(&scheme));

        Ok(Self { scheme, host, port })
    }

    /// Scheme (`http` or `https`)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host name, lowercased
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit non-default port, if any
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Whether `url` belongs to this origin. Unparseable URLs never do.
    pub fn is_same_origin(&self, url: &str) -> bool {
        Origin::parse(url).is_ok_and(|other| &other == self)
    }

    /// Resolve a root-relative path against this origin.
    ///
    /// Absolute URLs are returned unchanged.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self, path)
        } else {
            format!("{}/{}", self, path)
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}
