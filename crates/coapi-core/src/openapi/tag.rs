//! Tag entity for organizing operations.

use super::external_docs::ExternalDocs;

/// Organizes operations into logical groups, optionally hierarchical.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tag {
    /// The name of the tag.
    pub name: String,

    /// A short summary of the tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// A description for the tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The name of the parent tag in a tag hierarchy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// The kind of tag (e.g., "nav", "badge", "audience").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// External documentation for the tag.
    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl Tag {
    /// Creates a new `Tag` with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: None,
            description: None,
            parent: None,
            kind: None,
            external_docs: None,
        }
    }

    /// Sets the summary for the tag.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description for the tag.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the parent tag name.
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the tag kind.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the external documentation.
    pub fn external_docs(mut self, external_docs: ExternalDocs) -> Self {
        self.external_docs = Some(external_docs);
        self
    }
}
