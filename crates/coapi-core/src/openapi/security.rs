//! Security scheme and security requirement entities.

use super::map::Map;

/// A security requirement: scheme name to the scopes the operation needs.
///
/// An empty scope list means the scheme is required without any scope.
pub type SecurityRequirement = Map<String, Vec<String>>;

/// A security scheme definition.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SecurityScheme {
    /// The type of the scheme.
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    /// A description of the scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// The name of the header, query or cookie parameter (apiKey only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The location of the API key (apiKey only).
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_: Option<ApiKeyLocation>,

    /// The HTTP authorization scheme (http only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    /// A hint on how the bearer token is formatted (http bearer only).
    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    /// The OAuth flow configurations (oauth2 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OauthFlows>,

    /// The OpenID Connect discovery URL (openIdConnect only).
    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
}

impl SecurityScheme {
    /// Creates a new scheme of the given type.
    pub fn new(scheme_type: SecuritySchemeType) -> Self {
        Self {
            scheme_type,
            description: None,
            name: None,
            in_: None,
            scheme: None,
            bearer_format: None,
            flows: None,
            open_id_connect_url: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the API key parameter name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the API key location.
    pub fn in_(mut self, in_: ApiKeyLocation) -> Self {
        self.in_ = Some(in_);
        self
    }

    /// Sets the HTTP authorization scheme.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Sets the bearer format hint.
    pub fn bearer_format(mut self, bearer_format: impl Into<String>) -> Self {
        self.bearer_format = Some(bearer_format.into());
        self
    }

    /// Sets the OAuth flow configurations.
    pub fn flows(mut self, flows: OauthFlows) -> Self {
        self.flows = Some(flows);
        self
    }

    /// Sets the OpenID Connect discovery URL.
    pub fn open_id_connect_url(mut self, url: impl Into<String>) -> Self {
        self.open_id_connect_url = Some(url.into());
        self
    }
}

/// The type of a security scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    /// API key in a header, query parameter or cookie.
    ApiKey,
    /// HTTP authentication (basic, bearer, ...).
    Http,
    /// Mutual TLS.
    #[serde(rename = "mutualTLS")]
    MutualTls,
    /// OAuth 2 flows.
    Oauth2,
    /// OpenID Connect discovery.
    OpenIdConnect,
}

impl SecuritySchemeType {
    /// Parses a scheme type from its wire spelling.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "apiKey" => Some(Self::ApiKey),
            "http" => Some(Self::Http),
            "mutualTLS" => Some(Self::MutualTls),
            "oauth2" => Some(Self::Oauth2),
            "openIdConnect" => Some(Self::OpenIdConnect),
            _ => None,
        }
    }
}

/// The location of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    /// A query parameter.
    Query,
    /// A header.
    Header,
    /// A cookie.
    Cookie,
}

/// The OAuth flow configurations of an oauth2 scheme.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct OauthFlows {
    /// The implicit flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OauthFlow>,

    /// The resource-owner password flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OauthFlow>,

    /// The client-credentials flow.
    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OauthFlow>,

    /// The authorization-code flow.
    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OauthFlow>,

    /// The device-authorization flow.
    #[serde(rename = "deviceAuthorization", skip_serializing_if = "Option::is_none")]
    pub device_authorization: Option<OauthFlow>,
}

impl OauthFlows {
    /// Creates an empty flow set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the flow slot for the given flow type.
    pub fn slot_mut(&mut self, flow_type: OauthFlowType) -> &mut Option<OauthFlow> {
        match flow_type {
            OauthFlowType::Implicit => &mut self.implicit,
            OauthFlowType::Password => &mut self.password,
            OauthFlowType::ClientCredentials => &mut self.client_credentials,
            OauthFlowType::AuthorizationCode => &mut self.authorization_code,
            OauthFlowType::DeviceAuthorization => &mut self.device_authorization,
        }
    }
}

/// The kind of an OAuth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OauthFlowType {
    /// Implicit grant.
    Implicit,
    /// Resource-owner password grant.
    Password,
    /// Client-credentials grant.
    ClientCredentials,
    /// Authorization-code grant.
    AuthorizationCode,
    /// Device-authorization grant.
    DeviceAuthorization,
}

impl OauthFlowType {
    /// Parses a flow type from its directive spelling.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "implicit" => Some(Self::Implicit),
            "password" => Some(Self::Password),
            "clientCredentials" => Some(Self::ClientCredentials),
            "authorizationCode" => Some(Self::AuthorizationCode),
            "deviceAuthorization" => Some(Self::DeviceAuthorization),
            _ => None,
        }
    }
}

/// A single OAuth flow configuration.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct OauthFlow {
    /// The authorization endpoint (implicit and authorizationCode).
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    /// The token endpoint.
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    /// The refresh endpoint.
    #[serde(rename = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,

    /// The device-authorization endpoint (deviceAuthorization only).
    #[serde(
        rename = "deviceAuthorizationUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub device_authorization_url: Option<String>,

    /// The available scopes: scope name to short description.
    pub scopes: Map<String, String>,
}

impl OauthFlow {
    /// Creates a new empty flow.
    pub fn new() -> Self {
        Self::default()
    }
}
