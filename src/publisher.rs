//! Publication of the finished document.
//!
//! The publisher never caches: each call renders the current state of the document it
//! borrows, with `host` taken from the URL root of the request being answered.

use crate::error::{Error, Result};
use crate::swagger_builder::SchemaDocument;
use log::debug;
use url::Url;

/// Path at which the document is served.
pub const SWAGGER_JSON_PATH: &str = "/swagger.json";

/// A rendered publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub content_type: &'static str,
    pub body: String,
}

/// Serves a [`SchemaDocument`] at [`SWAGGER_JSON_PATH`].
pub struct SchemaPublisher<'a> {
    document: &'a SchemaDocument,
}

impl<'a> SchemaPublisher<'a> {
    pub fn new(document: &'a SchemaDocument) -> Self {
        Self { document }
    }

    /// Returns a copy of the document whose `host` is the origin of `url_root`.
    pub fn publish(&self, url_root: &str) -> Result<SchemaDocument> {
        let mut published = self.document.clone();
        published.host = Some(host_of(url_root)?);
        Ok(published)
    }

    /// Answers a request for `request_path`.
    ///
    /// Returns `None` for any path other than [`SWAGGER_JSON_PATH`].
    pub fn respond(&self, request_path: &str, url_root: &str) -> Option<Result<Publication>> {
        if request_path.trim_end_matches('/') != SWAGGER_JSON_PATH {
            return None;
        }

        debug!("Publishing document for {}", url_root);
        let rendered = self.publish(url_root).and_then(|document| {
            Ok(Publication {
                content_type: "application/json",
                body: serde_json::to_string(&document)?,
            })
        });
        Some(rendered)
    }
}

/// The `host[:port]` part of a URL root such as `https://example.com:8443/`.
pub fn host_of(url_root: &str) -> Result<String> {
    let url = Url::parse(url_root)?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidArgument(format!("no host in {}", url_root)))?;

    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
