// ABOUTME: OAuth1 signing credentials for the AtomPub endpoint
// ABOUTME: Signing itself is delegated to oauth1-request (HMAC-SHA1)

use oauth1_request as oauth;
use std::fmt;
use url::Url;

/// Consumer and access-token credentials. The destination URL is not part of
/// this and is never signed as a parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecrets {
    pub client_key: String,
    pub client_secret: String,
    pub resource_owner_key: String,
    pub resource_owner_secret: String,
}

impl fmt::Debug for SigningSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecrets")
            .field("client_key", &redact(&self.client_key))
            .field("client_secret", &"[redacted]")
            .field("resource_owner_key", &redact(&self.resource_owner_key))
            .field("resource_owner_secret", &"[redacted]")
            .finish()
    }
}

/// Show only the first few characters of a credential
pub fn redact(value: &str) -> String {
    let prefix: String = value.chars().take(4).collect();
    if value.chars().count() > 4 {
        format!("{}…", prefix)
    } else {
        "[redacted]".to_string()
    }
}

impl SigningSecrets {
    pub fn new(
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
        resource_owner_key: impl Into<String>,
        resource_owner_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_key: client_key.into(),
            client_secret: client_secret.into(),
            resource_owner_key: resource_owner_key.into(),
            resource_owner_secret: resource_owner_secret.into(),
        }
    }

    /// `Authorization` header for a POST to `url` with a non-form body, so
    /// only the oauth_* parameters are signed
    pub fn post_authorization(&self, url: &Url) -> String {
        let token = oauth::Token::from_parts(
            self.client_key.as_str(),
            self.client_secret.as_str(),
            self.resource_owner_key.as_str(),
            self.resource_owner_secret.as_str(),
        );
        oauth::post(url.as_str(), &(), &token, oauth::HMAC_SHA1)
    }
}
