//! Assembly of decoded search responses into result pages.

use crate::client::ClientError;
use crate::models::{make_references, NextPage, ReferenceKind, SearchResultPage};
use crate::utils::XmlValue;

/// Normalize an optional node set to an ordered sequence.
///
/// Absent yields nothing, a list yields its items, and anything else is a
/// single node. The decoder does not wrap a lone child in a list.
fn nodes(value: Option<&XmlValue>) -> Vec<&XmlValue> {
    match value {
        None => Vec::new(),
        Some(XmlValue::List(items)) => items.iter().collect(),
        Some(node) => vec![node],
    }
}

fn parse_available(tree: &XmlValue) -> Result<u64, ClientError> {
    let text = tree
        .get("available")
        .ok_or_else(|| ClientError::Decode("response is missing <available>".to_string()))?
        .text()
        .ok_or_else(|| ClientError::Decode("<available> is not a text element".to_string()))?;

    text.trim()
        .parse()
        .map_err(|_| ClientError::Decode(format!("<available> is not a count: {:?}", text)))
}

/// Build a [`SearchResultPage`] from a decoded search response.
///
/// Projects come first, followed by resources, each in document order.
pub fn make_search_result_page(
    tree: &XmlValue,
    page: u32,
    next_page: NextPage,
) -> Result<SearchResultPage, ClientError> {
    let available = parse_available(tree)?;
    let results = tree
        .get("results")
        .ok_or_else(|| ClientError::Decode("response is missing <results>".to_string()))?;

    let mut references = Vec::new();
    for kind in ReferenceKind::ALL {
        let tag = kind.tag();
        references.extend(make_references(&nodes(results.get(tag)), tag)?);
    }

    Ok(SearchResultPage::new(available, page, references, next_page))
}
