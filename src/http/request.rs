//! `HttpRequest` and the small `Method` enum it carries.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
    Head,
    Put,
    Options,
}

impl Method {
    pub fn from_str(s: &str) -> Option<Method> {
        match s {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "DELETE" => Some(Method::Delete),
            "HEAD" => Some(Method::Head),
            "PUT" => Some(Method::Put),
            "OPTIONS" => Some(Method::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Options => "OPTIONS",
        }
    }
}

/// A fully-decoded HTTP/1.1 request. `method` is kept as the raw token
/// rather than the `Method` enum when the token isn't one we recognise,
/// since the request parser itself (§4.7) never rejects an unknown method
/// — only the response pipeline would.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn get_header(&self, name: &str) -> Option<&String> {
        let needle = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| key.to_ascii_lowercase() == needle)
            .map(|(_, value)| value)
    }

    pub fn content_length(&self) -> Option<usize> {
        self.get_header("content-length").and_then(|v| v.parse().ok())
    }

    pub fn host(&self) -> Option<&String> {
        self.get_header("Host")
    }

    pub fn method(&self) -> Option<Method> {
        Method::from_str(&self.method)
    }
}
