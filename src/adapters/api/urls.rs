//! API URL resolution
//!
//! Every request path and every resource URL returned by the server goes
//! through [`UrlResolver::normalize`]. Resolution rules, in order:
//!
//! 1. An absolute URL (one that starts with a scheme) is returned unchanged.
//! 2. A path that already begins with the API prefix (the path part of the
//!    base URL, e.g. `/api`) is resolved against the origin, so the prefix is
//!    never duplicated.
//! 3. Anything else is joined to the base URL with exactly one slash.
//!
//! The result is always absolute, so normalizing twice gives the same URL.

use crate::domain::{GodwitError, Result};
use url::Url;

/// Resolves request paths and server-returned URLs against the API base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResolver {
    /// Absolute base, no trailing slash (e.g. `http://localhost:8080/api`)
    base: String,
    /// Scheme, host and port (e.g. `http://localhost:8080`)
    origin: String,
    /// Path part of the base, no trailing slash; empty when the base is the origin
    prefix: String,
}

impl UrlResolver {
    /// Builds a resolver from a base URL and a document origin
    ///
    /// `base_url` may be absolute (`https://host/api`) or relative (`/api`).
    /// A relative base is anchored at `origin`; an absolute base carries its
    /// own origin and `origin` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base or the origin is not a
    /// valid http(s) URL.
    pub fn new(base_url: &str, origin: &str) -> Result<Self> {
        let base_url = base_url.trim();

        let absolute = if has_scheme(base_url) {
            parse_http(base_url, "API base URL")?
        } else {
            let origin = parse_http(origin.trim(), "API origin")?;
            let path = format!("/{}", base_url.trim_start_matches('/'));
            origin.join(&path).map_err(|e| {
                GodwitError::Configuration(format!("Invalid API base URL '{base_url}': {e}"))
            })?
        };

        let origin = absolute.origin().ascii_serialization();
        let prefix = absolute.path().trim_end_matches('/').to_string();
        let base = format!("{origin}{prefix}");

        Ok(Self {
            base,
            origin,
            prefix,
        })
    }

    /// Absolute base URL, no trailing slash
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Origin used for prefix-carrying paths
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// API path prefix, empty when the API lives at the origin root
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolves a path or URL to an absolute URL
    ///
    /// # Example
    ///
    /// ```
    /// use godwit::adapters::api::UrlResolver;
    ///
    /// let urls = UrlResolver::new("/api", "https://care.example").unwrap();
    /// assert_eq!(urls.normalize("registrations/7"), "https://care.example/api/registrations/7");
    /// assert_eq!(urls.normalize("/api/doctor/prescriptions/9/pdf"), "https://care.example/api/doctor/prescriptions/9/pdf");
    /// assert_eq!(urls.normalize("https://cdn.example/x.pdf"), "https://cdn.example/x.pdf");
    /// ```
    pub fn normalize(&self, path: &str) -> String {
        let path = path.trim();
        if path.is_empty() {
            return self.base.clone();
        }
        if has_scheme(path) {
            return path.to_string();
        }

        let rooted = format!("/{}", path.trim_start_matches('/'));
        if self.carries_prefix(&rooted) {
            return format!("{}{}", self.origin, rooted);
        }

        format!("{}{}", self.base, rooted)
    }

    fn carries_prefix(&self, rooted: &str) -> bool {
        if self.prefix.is_empty() {
            return false;
        }
        match rooted.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
            None => false,
        }
    }
}

/// True when `s` starts with a URL scheme (`letter *(letter / digit / "+" / "-" / ".") ":"`)
pub fn has_scheme(s: &str) -> bool {
    let Some((scheme, _)) = s.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn parse_http(raw: &str, what: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| GodwitError::Configuration(format!("Invalid {what} '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(GodwitError::Configuration(format!(
            "Invalid {what} '{raw}': scheme must be http or https, got '{other}'"
        ))),
    }
}
