//! Project and resource references returned by search.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::client::ClientError;
use crate::utils::XmlValue;

/// The kind of entity a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Project,
    Resource,
}

impl ReferenceKind {
    /// Every kind, in the order results are merged
    pub const ALL: [ReferenceKind; 2] = [ReferenceKind::Project, ReferenceKind::Resource];

    /// Element name used for this kind in search responses
    pub fn tag(&self) -> &'static str {
        match self {
            ReferenceKind::Project => "project",
            ReferenceKind::Resource => "resource",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReferenceKind {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(ReferenceKind::Project),
            "resource" => Ok(ReferenceKind::Resource),
            other => Err(ClientError::InvalidReferenceKind(other.to_string())),
        }
    }
}

/// A lightweight pointer to a project or resource found by search.
///
/// This is not the full entity; follow [`Reference::url`] for details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    kind: ReferenceKind,
    name: String,
    id: i64,
    url: String,
    location: String,
}

impl Reference {
    pub fn new(
        kind: ReferenceKind,
        name: impl Into<String>,
        id: i64,
        url: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            id,
            url: url.into(),
            location: location.into(),
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Site-relative URL of the entity (no scheme or host)
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_project(&self) -> bool {
        self.kind == ReferenceKind::Project
    }

    pub fn is_resource(&self) -> bool {
        self.kind == ReferenceKind::Resource
    }
}

/// Text of an optional child element, or "" when absent or not a leaf.
fn optional_text<'a>(node: &'a XmlValue, field: &str) -> &'a str {
    node.get(field).and_then(XmlValue::text).unwrap_or("")
}

fn required_id(node: &XmlValue) -> Result<i64, ClientError> {
    let text = node
        .get("id")
        .and_then(XmlValue::text)
        .ok_or_else(|| ClientError::Decode("reference is missing <id>".to_string()))?;

    text.trim()
        .parse()
        .map_err(|_| ClientError::Decode(format!("reference <id> is not an integer: {:?}", text)))
}

/// Build a [`Reference`] from a decoded `project` or `resource` node.
///
/// `kind` is the element tag; anything other than `project` or `resource`
/// fails with [`ClientError::InvalidReferenceKind`] before the node is read.
pub fn make_reference(node: &XmlValue, kind: &str) -> Result<Reference, ClientError> {
    let kind: ReferenceKind = kind.parse()?;
    let id = required_id(node)?;

    Ok(Reference::new(
        kind,
        optional_text(node, "name"),
        id,
        optional_text(node, "likeminded_url"),
        optional_text(node, "location"),
    ))
}

/// Build references for a sequence of nodes, preserving order.
pub fn make_references(nodes: &[&XmlValue], kind: &str) -> Result<Vec<Reference>, ClientError> {
    nodes.iter().map(|node| make_reference(node, kind)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food_bank() -> XmlValue {
        XmlValue::element([
            ("id", XmlValue::text_node("42")),
            ("name", XmlValue::text_node("Food Bank")),
            ("likeminded_url", XmlValue::text_node("/r/42")),
            ("location", XmlValue::text_node("Oakland")),
        ])
    }

    #[test]
    fn test_make_reference() {
        let reference = make_reference(&food_bank(), "resource").unwrap();
        assert_eq!(
            reference,
            Reference::new(ReferenceKind::Resource, "Food Bank", 42, "/r/42", "Oakland")
        );
        assert!(reference.is_resource());
        assert!(!reference.is_project());
    }

    #[test]
    fn test_optional_fields_default_to_empty() {
        let node = XmlValue::element([
            ("id", XmlValue::text_node(" 7 ")),
            ("name", XmlValue::text_node("")),
        ]);

        let reference = make_reference(&node, "project").unwrap();
        assert_eq!(reference.id(), 7);
        assert_eq!(reference.name(), "");
        assert_eq!(reference.url(), "");
        assert_eq!(reference.location(), "");
    }

    #[test]
    fn test_id_is_required() {
        let missing = XmlValue::element([("name", XmlValue::text_node("x"))]);
        assert!(matches!(
            make_reference(&missing, "project"),
            Err(ClientError::Decode(_))
        ));

        let garbage = XmlValue::element([("id", XmlValue::text_node("forty-two"))]);
        assert!(matches!(
            make_reference(&garbage, "project"),
            Err(ClientError::Decode(_))
        ));

        // <project/> decodes to empty text
        assert!(matches!(
            make_reference(&XmlValue::text_node(""), "project"),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = make_reference(&food_bank(), "event").unwrap_err();
        assert!(matches!(err, ClientError::InvalidReferenceKind(kind) if kind == "event"));

        // Checked before the node, so a bad node still reports the kind
        let err = make_reference(&XmlValue::text_node(""), "Project").unwrap_err();
        assert!(matches!(err, ClientError::InvalidReferenceKind(_)));
    }

    #[test]
    fn test_make_references_preserves_order() {
        let nodes = [
            XmlValue::element([("id", XmlValue::text_node("3"))]),
            XmlValue::element([("id", XmlValue::text_node("1"))]),
            XmlValue::element([("id", XmlValue::text_node("2"))]),
        ];
        let refs: Vec<&XmlValue> = nodes.iter().collect();

        let ids: Vec<i64> = make_references(&refs, "project")
            .unwrap()
            .iter()
            .map(Reference::id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_kind_round_trip_and_serde() {
        for kind in ReferenceKind::ALL {
            assert_eq!(kind.tag().parse::<ReferenceKind>().unwrap(), kind);
        }

        let json = serde_json::to_value(make_reference(&food_bank(), "resource").unwrap()).unwrap();
        assert_eq!(json["kind"], "resource");
        assert_eq!(json["id"], 42);
        assert_eq!(json["url"], "/r/42");
    }
}
