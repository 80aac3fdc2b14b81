//! # likeminded
//!
//! A client for the Likeminded search API, which finds civic projects and
//! resources. Responses are XML; this crate decodes them into plain
//! [`Reference`] records grouped into [`SearchResultPage`]s, each carrying
//! the server's total count and a lazy handle to the following page.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`client`]: [`LikeMindedClient`], the search entry point, and its error type
//! - [`models`]: Search requests, references and result pages
//! - [`utils`]: HTTP transport, XML decoding, streaming and display helpers
//! - [`config`]: Configuration management

pub mod client;
pub mod config;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use client::{ClientError, LikeMindedClient};
pub use models::{Reference, ReferenceKind, SearchRequest, SearchResultPage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
