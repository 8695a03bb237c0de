// ABOUTME: Error types for entry serialization, transport, and response parsing
// ABOUTME: A non-201 status is not an error; only broken XML, timestamps, or network failures are

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The XML writer rejected the entry document
    #[error("failed to serialize entry: {0}")]
    Serialize(String),

    #[error("invalid entry URL {url:?}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request never produced an HTTP response
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body is not well-formed XML
    #[error("malformed response body: {0}")]
    Parse(String),

    /// Unparsable, or outside the representable range once an offset is applied
    #[error("invalid timestamp {value:?}")]
    Timestamp {
        value: String,
        #[source]
        source: Option<chrono::ParseError>,
    },
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}
