//! Server entity and server variables.

use super::map::Map;

/// A server hosting the API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Server {
    /// The URL of the server. Must not contain a query string or fragment.
    pub url: String,

    /// A description of the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A short name for the server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Variables used for URL template substitution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, ServerVariable>>,
}

impl Server {
    /// Creates a new `Server` with the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            description: None,
            name: None,
            variables: None,
        }
    }

    /// Sets the description for the server.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the short name for the server.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the URL template variables.
    pub fn variables(mut self, variables: Map<String, ServerVariable>) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// A variable for server URL template substitution.
///
/// A default value is mandatory; when an enum list is present the default must
/// appear in it. Both rules are enforced by the aggregator.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct ServerVariable {
    /// The default value to use for substitution.
    pub default: String,

    /// An enumeration of allowed values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    /// A description of the variable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ServerVariable {
    /// Creates a new `ServerVariable` with the given default value.
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            enum_values: None,
            description: None,
        }
    }

    /// Sets the allowed values.
    pub fn enum_values(mut self, enum_values: Vec<String>) -> Self {
        self.enum_values = Some(enum_values);
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
