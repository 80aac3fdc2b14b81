//! Data models for search requests, results and references.

mod reference;
mod search;

pub use reference::{make_reference, make_references, Reference, ReferenceKind};
pub use search::{
    IdList, NextPage, ProjectStatus, SearchRequest, SearchResultPage, SearchType, SortOrder,
};
