//! Search request and result page models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::{ClientError, PageFetcher};
use crate::models::Reference;

/// Wire value meaning "no filter"
const ALL: &str = "All";

/// Entity type filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchType {
    Project,
    Resource,
    #[default]
    All,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Project => "Project",
            SearchType::Resource => "Resource",
            SearchType::All => ALL,
        }
    }
}

/// Project status filter. Only meaningful when searching projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    StartingUp,
    Ongoing,
    Completed,
    #[default]
    All,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::StartingUp => "0",
            ProjectStatus::Ongoing => "1",
            ProjectStatus::Completed => "2",
            ProjectStatus::All => ALL,
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Relevance,
    Recent,
    #[default]
    All,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "Relevance",
            SortOrder::Recent => "Recent",
            SortOrder::All => ALL,
        }
    }
}

macro_rules! wire_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

wire_display!(SearchType, ProjectStatus, SortOrder);

impl FromStr for SearchType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "project" => Ok(SearchType::Project),
            "resource" => Ok(SearchType::Resource),
            "all" => Ok(SearchType::All),
            _ => Err(ClientError::InvalidRequest(format!("unknown search type: {}", s))),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "starting" | "starting_up" => Ok(ProjectStatus::StartingUp),
            "1" | "ongoing" => Ok(ProjectStatus::Ongoing),
            "2" | "completed" => Ok(ProjectStatus::Completed),
            "all" => Ok(ProjectStatus::All),
            _ => Err(ClientError::InvalidRequest(format!("unknown project status: {}", s))),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relevance" => Ok(SortOrder::Relevance),
            "recent" => Ok(SortOrder::Recent),
            "all" => Ok(SortOrder::All),
            _ => Err(ClientError::InvalidRequest(format!("unknown sort order: {}", s))),
        }
    }
}

/// One or more category or subcategory identifiers.
///
/// Sent as a comma-separated list in the order given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdList(Vec<String>);

impl IdList {
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn to_wire(&self) -> String {
        self.0.join(",")
    }
}

impl From<&str> for IdList {
    fn from(id: &str) -> Self {
        IdList(vec![id.to_string()])
    }
}

impl From<String> for IdList {
    fn from(id: String) -> Self {
        IdList(vec![id])
    }
}

macro_rules! scalar_id {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for IdList {
                fn from(id: $ty) -> Self {
                    IdList(vec![id.to_string()])
                }
            }
        )*
    };
}

scalar_id!(u16, u32, u64, usize, i16, i32, i64, isize);

impl<T: ToString> From<Vec<T>> for IdList {
    fn from(ids: Vec<T>) -> Self {
        IdList(ids.iter().map(ToString::to_string).collect())
    }
}

impl<T: ToString> From<&[T]> for IdList {
    fn from(ids: &[T]) -> Self {
        IdList(ids.iter().map(ToString::to_string).collect())
    }
}

/// Search parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search terms; empty matches everything
    pub query: String,

    /// Category filter
    pub category: Option<IdList>,

    /// Subcategory filter
    pub subcategory: Option<IdList>,

    /// Project or resource filter
    pub search_type: Option<SearchType>,

    /// Project status filter
    pub status: Option<ProjectStatus>,

    /// Sort order
    pub sort: Option<SortOrder>,
}

impl SearchRequest {
    /// Create a new search request
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set category filter
    pub fn category(mut self, category: impl Into<IdList>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set subcategory filter
    pub fn subcategory(mut self, subcategory: impl Into<IdList>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    /// Set entity type filter
    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    /// Set project status filter
    pub fn status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set sort order
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Query parameters for `page`, in wire order.
    pub fn to_params(&self, page: u32, api_key: &str) -> Vec<(String, String)> {
        let ids = |list: &Option<IdList>| list.as_ref().map(IdList::to_wire).unwrap_or_default();

        vec![
            ("query".to_string(), self.query.clone()),
            ("category".to_string(), ids(&self.category)),
            ("subcategory".to_string(), ids(&self.subcategory)),
            (
                "type".to_string(),
                self.search_type.unwrap_or_default().as_str().to_string(),
            ),
            (
                "status".to_string(),
                self.status.unwrap_or_default().as_str().to_string(),
            ),
            (
                "sort".to_string(),
                self.sort.unwrap_or_default().as_str().to_string(),
            ),
            ("page".to_string(), page.to_string()),
            ("apikey".to_string(), api_key.to_string()),
        ]
    }
}

/// A page of search results that has not been fetched yet.
///
/// Calling [`NextPage::fetch`] performs a request every time; results are not
/// memoized.
#[derive(Debug, Clone)]
pub struct NextPage {
    fetcher: PageFetcher,
    page: u32,
}

impl NextPage {
    pub(crate) fn new(fetcher: PageFetcher, page: u32) -> Self {
        Self { fetcher, page }
    }

    /// Page number this handle will request
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Request the page from the server
    pub async fn fetch(&self) -> Result<SearchResultPage, ClientError> {
        self.fetcher.fetch(self.page).await
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultPage {
    /// Total references available across all pages
    available: u64,

    /// 1-based page number
    page: u32,

    /// Projects first, then resources
    references: Vec<Reference>,

    #[serde(skip_serializing)]
    next_page: NextPage,
}

impl SearchResultPage {
    pub(crate) fn new(
        available: u64,
        page: u32,
        references: Vec<Reference>,
        next_page: NextPage,
    ) -> Self {
        Self {
            available,
            page,
            references,
            next_page,
        }
    }

    /// Server-reported total across all pages
    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }

    pub fn projects(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.is_project())
    }

    pub fn resources(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.is_resource())
    }

    /// Deferred handle for the following page
    pub fn next_page(&self) -> &NextPage {
        &self.next_page
    }

    /// Split into the references and the next-page handle
    pub fn into_parts(self) -> (Vec<Reference>, NextPage) {
        (self.references, self.next_page)
    }
}

impl IntoIterator for SearchResultPage {
    type Item = Reference;
    type IntoIter = std::vec::IntoIter<Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResultPage {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.references.iter()
    }
}
