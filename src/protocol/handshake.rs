//! Read-only view of the opening handshake.
//!
//! The upgrade itself is performed elsewhere; this module only records what
//! was requested and what was agreed so bindings can inspect it through the
//! session.

/// Case-insensitive lookup in a list of header pairs.
fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// The client's upgrade request as seen by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// The request path (e.g., "/chat").
    pub path: String,
    /// The Host header value.
    pub host: String,
    /// The Origin header value (optional).
    pub origin: Option<String>,
    /// Decoded query parameters, in request order.
    pub query: Vec<(String, String)>,
    /// All request headers, in request order.
    pub headers: Vec<(String, String)>,
    /// The Sec-WebSocket-Protocol values offered by the client.
    pub protocols: Vec<String>,
    /// The Sec-WebSocket-Extensions values offered by the client.
    pub extensions: Vec<String>,
}

impl HandshakeRequest {
    /// Create a request view for `path` on `host`.
    #[must_use]
    pub fn new(path: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set the Origin header.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add an offered subprotocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Look up a header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// First value of a query parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The server's upgrade response as seen by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeResponse {
    /// The selected Sec-WebSocket-Protocol (optional).
    pub protocol: Option<String>,
    /// The negotiated Sec-WebSocket-Extensions.
    pub extensions: Vec<String>,
    /// Additional response headers.
    pub headers: Vec<(String, String)>,
}

impl HandshakeResponse {
    /// Create an empty response view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the selected subprotocol.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Look up a header, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Immutable pair of request and response, fixed before the endpoint opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeMetadata {
    pub request: HandshakeRequest,
    pub response: HandshakeResponse,
}

impl HandshakeMetadata {
    #[must_use]
    pub fn new(request: HandshakeRequest, response: HandshakeResponse) -> Self {
        Self { request, response }
    }
}
