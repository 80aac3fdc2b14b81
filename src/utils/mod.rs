//! Utility modules supporting the search client.
//!
//! - [`Transport`]: the GET seam the client talks through
//! - [`HttpTransport`]: reqwest-backed transport with configurable timeouts
//! - [`decode`] / [`XmlValue`]: generic XML decoding into a navigable tree
//! - [`reference_stream`]: lazily walk every page of a search as a `Stream`
//! - [`display`]: table and plain-text rendering for the CLI
//!
//! # Walking every page
//!
//! ```rust,no_run
//! use futures_util::StreamExt;
//! use likeminded::client::LikeMindedClient;
//! use likeminded::models::SearchRequest;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LikeMindedClient::new("my-api-key")?;
//! let mut references = client.stream(&SearchRequest::new("garden"), Some(5));
//! while let Some(reference) = references.next().await {
//!     println!("{}", reference?.name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod display;
mod http;
pub mod streaming;
mod xml;

pub use http::{HttpTransport, Transport, DEFAULT_BASE_URL};
pub use streaming::{reference_stream, reference_stream_from, ReferenceStream};
pub use xml::{decode, XmlValue};
