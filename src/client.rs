// ABOUTME: Hatena Blog AtomPub HTTP client
// ABOUTME: Sends one OAuth1-signed POST per entry and parses the Atom response

use reqwest::{header, Client as HttpClient};
use tracing::{debug, info, warn};
use url::Url;

use crate::entry::BlogEntry;
use crate::error::{Error, Result};
use crate::oauth::SigningSecrets;
use crate::response::{parse_response, HttpResponse, PostResult, STATUS_CREATED};

pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

pub struct HatenaClient {
    http_client: HttpClient,
    endpoint: String,
    secrets: SigningSecrets,
}

impl HatenaClient {
    /// `endpoint` is the collection URI, e.g.
    /// `https://blog.hatena.ne.jp/{user}/{blog}/atom/entry`
    pub fn new(endpoint: String, secrets: SigningSecrets) -> Self {
        Self {
            http_client: HttpClient::new(),
            endpoint,
            secrets,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST an entry document. Any status code is returned as-is; only a
    /// failure to get a response at all is an error.
    pub async fn send(&self, xml: String) -> Result<HttpResponse> {
        let url = Url::parse(&self.endpoint).map_err(|source| Error::InvalidEndpoint {
            url: self.endpoint.clone(),
            source,
        })?;
        let authorization = self.secrets.post_authorization(&url);

        debug!("POST {} ({} bytes)", self.endpoint, xml.len());

        let transport_error = |source: reqwest::Error| Error::Transport {
            url: self.endpoint.clone(),
            source,
        };

        let response = self
            .http_client
            .post(url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::CONTENT_TYPE, XML_CONTENT_TYPE)
            .body(xml)
            .send()
            .await
            .map_err(transport_error)?;

        let status_code = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        debug!("Status: {}", status_code);
        if status_code == STATUS_CREATED {
            info!("Entry created at {}", self.endpoint);
        } else {
            warn!("Entry was not created: HTTP {}", status_code);
        }

        Ok(HttpResponse { status_code, body })
    }

    /// Serialize, send and parse one entry
    pub async fn post(&self, entry: &BlogEntry) -> Result<PostResult> {
        let xml = entry.to_xml()?;
        let response = self.send(xml).await?;
        parse_response(&response)
    }
}
