//! HTTP request types for the Planning Center API client.
//!
//! This module provides the [`HttpRequest`] descriptor and its builder for
//! constructing requests, plus the query-parameter model used to serialize
//! JSON:API filters and `include` lists.

use std::collections::HashMap;
use std::fmt;

use crate::clients::errors::InvalidRequestError;

/// HTTP methods supported by the Planning Center API.
///
/// Planning Center uses `PATCH` for resource updates; `PUT` is kept for
/// endpoints that still accept full replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method for retrieving resources.
    Get,
    /// HTTP POST method for creating resources.
    Post,
    /// HTTP PATCH method for updating resources.
    Patch,
    /// HTTP PUT method for full resource replacement.
    Put,
    /// HTTP DELETE method for removing resources.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A query parameter value.
///
/// JSON:API list endpoints take three shapes of parameter: plain scalars,
/// comma-joined lists (`include=emails,phone_numbers`), and filter objects
/// flattened to `where[field]=value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// A scalar value serialized as-is.
    Value(String),
    /// A list serialized as a single comma-joined value.
    List(Vec<String>),
    /// A filter object flattened to `where[key]=value` pairs.
    Filter(Vec<(String, String)>),
}

impl ParamValue {
    /// Creates a scalar parameter value.
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    /// Creates a list parameter value.
    #[must_use]
    pub fn list(values: Vec<String>) -> Self {
        Self::List(values)
    }

    /// Creates a filter parameter value from key/value pairs.
    #[must_use]
    pub fn filter(pairs: Vec<(String, String)>) -> Self {
        Self::Filter(pairs)
    }
}

/// Serializes named parameters into flat query pairs.
///
/// `List` values join with commas under the parameter's own name; `Filter`
/// values flatten each pair to `name[key]=value`.
#[must_use]
pub fn serialize_params(params: &[(String, ParamValue)]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (name, value) in params {
        match value {
            ParamValue::Value(scalar) => pairs.push((name.clone(), scalar.clone())),
            ParamValue::List(values) => pairs.push((name.clone(), values.join(","))),
            ParamValue::Filter(filters) => {
                for (key, filter_value) in filters {
                    pairs.push((format!("{name}[{key}]"), filter_value.clone()));
                }
            }
        }
    }
    pairs
}

/// A request descriptor for the Planning Center API.
///
/// The `endpoint` may be a path (joined to the configured base URL) or an
/// absolute URL (used verbatim, as pagination `links.next` URLs are).
/// Descriptors are immutable once dispatched.
///
/// # Example
///
/// ```rust
/// use pco_api::clients::{HttpMethod, HttpRequest, ParamValue};
/// use serde_json::json;
///
/// // GET with an include list and a filter
/// let get = HttpRequest::builder(HttpMethod::Get, "/people/v2/people")
///     .param("include", ParamValue::list(vec!["emails".into()]))
///     .param(
///         "where",
///         ParamValue::filter(vec![("last_name".into(), "Doe".into())]),
///     )
///     .build()
///     .unwrap();
///
/// // POST with a JSON:API body
/// let post = HttpRequest::builder(HttpMethod::Post, "/people/v2/people")
///     .body(json!({"data": {"type": "Person", "attributes": {"first_name": "Jean"}}}))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// The HTTP method for this request.
    pub method: HttpMethod,
    /// A path relative to the base URL, or an absolute URL.
    pub endpoint: String,
    /// Named query parameters, serialized via [`serialize_params`].
    pub params: Vec<(String, ParamValue)>,
    /// The JSON request body, if any.
    pub body: Option<serde_json::Value>,
    /// Additional headers merged over the client defaults.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequest {
    /// Creates a new builder for constructing an `HttpRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, endpoint: impl Into<String>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(method, endpoint)
    }

    /// Returns `true` if the endpoint is an absolute URL.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")
    }

    /// Validates the request before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError::EmptyEndpoint`] if the endpoint is
    /// empty or whitespace.
    pub fn verify(&self) -> Result<(), InvalidRequestError> {
        if self.endpoint.trim().is_empty() {
            return Err(InvalidRequestError::EmptyEndpoint);
        }
        Ok(())
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    method: HttpMethod,
    endpoint: String,
    params: Vec<(String, ParamValue)>,
    body: Option<serde_json::Value>,
    extra_headers: Option<HashMap<String, String>>,
}

impl HttpRequestBuilder {
    fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: Vec::new(),
            body: None,
            extra_headers: None,
        }
    }

    /// Adds a named query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.push((name.into(), value));
        self
    }

    /// Adds a scalar query parameter.
    #[must_use]
    pub fn query_param(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.param(name, ParamValue::Value(value.into()))
    }

    /// Sets the JSON request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<serde_json::Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a single extra header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets all extra headers at once.
    #[must_use]
    pub fn extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Builds the [`HttpRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError`] if the request fails validation.
    pub fn build(self) -> Result<HttpRequest, InvalidRequestError> {
        let request = HttpRequest {
            method: self.method,
            endpoint: self.endpoint,
            params: self.params,
            body: self.body,
            extra_headers: self.extra_headers,
        };
        request.verify()?;
        Ok(request)
    }
}
