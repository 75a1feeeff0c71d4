//! JSON:API document types.
//!
//! Planning Center responses follow the JSON:API specification: a top-level
//! envelope of `{data, included, links, meta}` where `data` is a resource
//! object or an array of resource objects. These types cover the subset of
//! the specification the client consumes; resource-specific attribute shapes
//! are left as raw [`serde_json::Value`] for per-resource modules to decode.

use serde::{Deserialize, Serialize};

/// A JSON:API resource object: `{id, type, attributes, relationships}`.
///
/// # Example
///
/// ```rust
/// use pco_api::jsonapi::ResourceObject;
///
/// let resource: ResourceObject = serde_json::from_value(serde_json::json!({
///     "type": "Person",
///     "id": "123",
///     "attributes": {"first_name": "Jean"}
/// }))
/// .unwrap();
///
/// assert_eq!(resource.id, "123");
/// assert_eq!(resource.resource_type, "Person");
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResourceObject {
    /// The resource identifier.
    pub id: String,
    /// The resource type (e.g., `"Person"`, `"Household"`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The resource attributes, left undecoded for the caller.
    #[serde(default)]
    pub attributes: serde_json::Value,
    /// Relationship linkage, when requested via `include`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<serde_json::Value>,
}

/// Primary data of a document: a single resource or a collection.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PrimaryData {
    /// A collection of resources (list endpoints).
    Many(Vec<ResourceObject>),
    /// A single resource (show endpoints).
    One(ResourceObject),
}

impl Default for PrimaryData {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Pagination links from a JSON:API document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Links {
    /// Link to the current page.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Link to the next page; absent on the final page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

/// Document metadata. `total_count` drives pagination accounting.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Meta {
    /// Total number of resources in the collection, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// Number of resources in this page, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// A JSON:API error object from an error response's `errors` array.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorObject {
    /// Short human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer human-readable explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// HTTP status code as a string, per the JSON:API convention.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Application-specific error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Pointer to the offending part of the request document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<serde_json::Value>,
}

/// A JSON:API document envelope: `{data, included, links, meta}`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Document {
    /// The primary data.
    #[serde(default)]
    pub data: PrimaryData,
    /// Side-loaded related resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceObject>>,
    /// Pagination links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Document metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Document {
    /// Returns the `links.next` URL, if present.
    #[must_use]
    pub fn next_link(&self) -> Option<&str> {
        self.links.as_ref().and_then(|links| links.next.as_deref())
    }

    /// Returns `meta.total_count`, defaulting to 0 when absent.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.meta
            .as_ref()
            .and_then(|meta| meta.total_count)
            .unwrap_or(0)
    }

    /// Consumes the document, normalizing primary data to a vector.
    ///
    /// A single-resource document becomes a one-element vector; a missing
    /// or empty collection becomes an empty vector.
    #[must_use]
    pub fn into_resources(self) -> Vec<ResourceObject> {
        match self.data {
            PrimaryData::Many(resources) => resources,
            PrimaryData::One(resource) => vec![resource],
        }
    }
}
