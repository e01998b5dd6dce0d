//! Authentication credentials.
//!
//! The backend accepts either a bearer JWT or an API key paired with the
//! website URL it was issued for. When both are configured, the JWT wins.

/// Credentials applied to HTTP requests and the realtime handshake.
///
/// All fields are optional; an empty value means the request goes out
/// unauthenticated. The API key is only honored together with
/// `website_url` — the backend validates the pair as a unit.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Bearer JWT. Takes precedence over the API key pair.
    pub jwt: Option<String>,
    /// API key issued by the backend.
    pub api_key: Option<String>,
    /// Website URL the API key was issued for.
    pub website_url: Option<String>,
}

impl Credentials {
    /// Creates credentials from a bearer JWT.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            jwt: Some(token.into()),
            ..Self::default()
        }
    }

    /// Creates credentials from an API key and its website URL.
    #[must_use]
    pub fn api_key(key: impl Into<String>, website_url: impl Into<String>) -> Self {
        Self {
            jwt: None,
            api_key: Some(key.into()),
            website_url: Some(website_url.into()),
        }
    }

    /// Returns `true` if no usable credential is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.header_pairs().is_empty()
    }

    /// Resolves the credentials into header name/value pairs.
    ///
    /// A JWT yields `Authorization: Bearer <token>`; otherwise a complete
    /// API key pair yields `X-API-Key` and `X-Website-Url`. A lone API
    /// key without its website URL yields nothing.
    #[must_use]
    pub fn header_pairs(&self) -> Vec<(&'static str, String)> {
        if let Some(token) = &self.jwt {
            return vec![("Authorization", format!("Bearer {token}"))];
        }
        if let (Some(key), Some(url)) = (&self.api_key, &self.website_url) {
            return vec![("X-API-Key", key.clone()), ("X-Website-Url", url.clone())];
        }
        Vec::new()
    }
}
