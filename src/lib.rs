// ABOUTME: Main library file for hatenapost
// ABOUTME: Exports the entry serializer, response parser, signed client, and CLI support modules

pub mod client;
pub mod config;
pub mod draft;
pub mod entry;
pub mod error;
pub mod oauth;
pub mod publish;
pub mod response;
pub mod xml;

pub use client::HatenaClient;
pub use entry::{BlogEntry, Timestamp};
pub use error::{Error, Result};
pub use oauth::SigningSecrets;
pub use response::{parse_response, HttpResponse, PostResult};
