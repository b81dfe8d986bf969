//! Caller identity from trusted reverse-proxy headers.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use leaflet_app::IdentityProvider;
use leaflet_core::config::AuthConfig;
use leaflet_core::{IdGenerator, Ident, RandomIdGenerator};
use std::sync::Arc;
use tracing::Instrument;

/// Maximum length for trace IDs.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    pub fn new() -> Self {
        Self(RandomIdGenerator.generate())
    }

    /// Trace ID supplied by the client, reduced to printable ASCII.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .filter(|c| c.is_ascii_graphic())
            .take(MAX_TRACE_ID_LEN)
            .collect();
        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity reported by the authenticating proxy in front of the server.
///
/// Both the provider and the subject header must be present and non-empty;
/// otherwise the caller is anonymous.
#[derive(Clone, Debug)]
pub struct HeaderIdentityProvider {
    ident: Option<Ident>,
    admin: bool,
    login_url: String,
    logout_url: String,
}

impl HeaderIdentityProvider {
    pub fn from_headers(config: &AuthConfig, headers: &HeaderMap) -> Self {
        let provider = header_value(headers, &config.provider_header);
        let subject = header_value(headers, &config.subject_header);
        let ident = provider
            .zip(subject)
            .map(|(provider, subject)| Ident::new(provider, subject));
        let admin = ident.as_ref().is_some_and(|ident| {
            let key = ident.to_string();
            config.admins.iter().any(|admin| *admin == key)
        });

        Self {
            ident,
            admin,
            login_url: config.login_url.clone(),
            logout_url: config.logout_url.clone(),
        }
    }
}

impl IdentityProvider for HeaderIdentityProvider {
    fn current_ident(&self) -> Option<Ident> {
        self.ident.clone()
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn login_url(&self, return_path: &str) -> String {
        fill_return(&self.login_url, return_path)
    }

    fn logout_url(&self, return_path: &str) -> String {
        fill_return(&self.logout_url, return_path)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn fill_return(template: &str, return_path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_path.as_bytes()).collect();
    template.replace("{return}", &encoded)
}

/// The identity of the current request's caller.
#[derive(Clone)]
pub struct Caller(pub Arc<dyn IdentityProvider>);

impl Caller {
    pub fn ident(&self) -> Option<Ident> {
        self.0.current_ident()
    }
}

/// Resolve the caller from request headers and run the request in a span.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let trace_id = req
        .headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_default();

    let provider = HeaderIdentityProvider::from_headers(&state.config.auth, req.headers());
    let caller = provider
        .current_ident()
        .map(|ident| ident.to_string())
        .unwrap_or_default();

    req.extensions_mut().insert(trace_id.clone());
    req.extensions_mut().insert(Caller(Arc::new(provider)));

    next.run(req)
        .instrument(tracing::info_span!("request", trace_id = %trace_id, caller = %caller))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_missing_headers_are_anonymous() {
        let config = AuthConfig::for_testing();
        let provider = HeaderIdentityProvider::from_headers(&config, &HeaderMap::new());
        assert!(provider.current_ident().is_none());
        assert!(!provider.is_admin());

        let only_subject = headers(&[("x-leaflet-subject", "alice")]);
        let provider = HeaderIdentityProvider::from_headers(&config, &only_subject);
        assert!(provider.current_ident().is_none());

        let blank = headers(&[("x-leaflet-provider", " "), ("x-leaflet-subject", "alice")]);
        let provider = HeaderIdentityProvider::from_headers(&config, &blank);
        assert!(provider.current_ident().is_none());
    }

    #[test]
    fn test_headers_produce_ident() {
        let config = AuthConfig::for_testing();
        let map = headers(&[("x-leaflet-provider", "github"), ("x-leaflet-subject", "42")]);
        let provider = HeaderIdentityProvider::from_headers(&config, &map);
        assert_eq!(provider.current_ident(), Some(Ident::new("github", "42")));
        assert!(!provider.is_admin());
    }

    #[test]
    fn test_configured_admins() {
        let config = AuthConfig::for_testing();
        let map = headers(&[("x-leaflet-provider", "test"), ("x-leaflet-subject", "admin")]);
        assert!(HeaderIdentityProvider::from_headers(&config, &map).is_admin());
    }

    #[test]
    fn test_login_urls_encode_return_path() {
        let config = AuthConfig::default();
        let provider = HeaderIdentityProvider::from_headers(&config, &HeaderMap::new());
        assert_eq!(
            provider.login_url("/users/alice/pages/blog?x=1"),
            "/auth/login?return=%2Fusers%2Falice%2Fpages%2Fblog%3Fx%3D1"
        );
        assert_eq!(provider.logout_url("/"), "/auth/logout?return=%2F");
    }

    #[test]
    fn test_trace_id_sanitized() {
        assert_eq!(TraceId::from_client("abc\n\u{7f}def").0, "abcdef");
        assert_eq!(TraceId::from_client(&"x".repeat(500)).0.len(), MAX_TRACE_ID_LEN);
        assert_eq!(TraceId::from_client("\n").0.len(), leaflet_core::ID_LENGTH);
    }
}
