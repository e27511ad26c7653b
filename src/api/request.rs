//! Request description passed to a [`Transport`](super::Transport).

use std::collections::BTreeMap;

use reqwest::Method;
use serde_json::Value;

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON document, sent as `application/json`.
    Json(Value),
    /// URL-encoded form, sent as `application/x-www-form-urlencoded`.
    Form(BTreeMap<String, String>),
    /// Pre-encoded text sent with an explicit content type.
    Raw { content_type: String, data: String },
}

/// A single HTTP request.
///
/// Built fresh for every call with the consuming builder methods and never
/// mutated afterwards. `path` is relative to the API base URL unless it is
/// an absolute `http(s)://` URL. Query parameters and headers are kept in
/// sorted maps, so the same request always serializes the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    path: String,
    query: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    body: Option<Body>,
}

impl Request {
    /// Create a request with the given method and path.
    pub fn new<S: Into<String>>(method: Method, path: S) -> Self {
        Self {
            method,
            path: path.into(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get<S: Into<String>>(path: S) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post<S: Into<String>>(path: S) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put<S: Into<String>>(path: S) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete<S: Into<String>>(path: S) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a query parameter, replacing any previous value for the key.
    pub fn query<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }

    /// Set a query parameter only when a value is given.
    pub fn query_opt<K: Into<String>, V: ToString>(self, key: K, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Set a header, replacing any previous value for the name.
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Attach a form body.
    pub fn form<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let form = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(Body::Form(form));
        self
    }

    /// Attach a pre-encoded body sent as `content_type`.
    pub fn raw<C: Into<String>, D: Into<String>>(mut self, content_type: C, data: D) -> Self {
        self.body = Some(Body::Raw {
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    /// Copy of this request with a bearer token attached.
    pub fn authorized(&self, access_token: &str) -> Self {
        self.clone()
            .header("Authorization", format!("Bearer {}", access_token))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// Value of one query parameter.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Whether `path` is a full URL rather than an API-relative path.
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}
