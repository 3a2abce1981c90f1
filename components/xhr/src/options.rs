//! Request options.
//!
//! The option record mirrors the one jQuery-style helpers accept, so it can
//! be deserialized straight from JSON:
//!
//! ```
//! use xhr::{DataType, Method, RequestOptions};
//!
//! let options = RequestOptions::from_json(
//!     r#"{ "url": "/api", "type": "post", "dataType": "json", "data": "{}", "async": false }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(options.url.as_deref(), Some("/api"));
//! assert_eq!(options.method, Method::Post);
//! assert_eq!(options.data_type, DataType::Json);
//! assert!(!options.is_async);
//! ```

use core_types::Value;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP request method.
///
/// Parsed case-insensitively, printed upper-case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// GET
    #[default]
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
}

impl Method {
    /// The canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl TryFrom<String> for Method {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(format!("unsupported request method `{}`", name)),
        }
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the response body is turned into the resolution value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// The body as a string
    #[default]
    Text,
    /// The body parsed as JSON; `null` when it does not parse
    Json,
}

impl DataType {
    /// Converts a response body according to this data type.
    pub fn interpret(&self, body: String) -> Value {
        match self {
            DataType::Text => Value::String(body),
            DataType::Json => match serde_json::from_str(&body) {
                Ok(json) => Value::from_json(json),
                Err(e) => {
                    debug!("response body is not valid JSON: {}", e);
                    Value::Null
                }
            },
        }
    }
}

/// Options for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
    /// Target URL; the transport's current location when absent
    pub url: Option<String>,
    /// Request method
    #[serde(rename = "type")]
    pub method: Method,
    /// Response interpretation
    pub data_type: DataType,
    /// Request body
    pub data: Option<String>,
    /// Whether the request completes on a later task rather than inline
    #[serde(rename = "async")]
    pub is_async: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            url: None,
            method: Method::Get,
            data_type: DataType::Text,
            data: None,
            is_async: true,
        }
    }
}

impl RequestOptions {
    /// Options for an asynchronous GET of `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Parses an option record. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sets the request method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the response interpretation.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Sets the request body.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Completes the request inline instead of on a later task.
    pub fn synchronous(mut self) -> Self {
        self.is_async = false;
        self
    }
}
