use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde_json::Value;
use url::Url;

use super::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Multipart upload with a single `file` part.
    File {
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

/// Backend request, relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    /// Refresh-and-retry applies; off for the auth endpoints themselves.
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP exchange. The client layers auth handling on top.
pub trait HttpTransport: Send {
    fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError>;
}

/// Blocking reqwest transport rooted at the API base URL.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    base: Url,
    http: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(base: Url) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { base, http })
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(request)?;
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        let mut builder = self.http.request(method, url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::File {
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime)
                    .map_err(ApiError::Transport)?;
                builder.multipart(Form::new().part("file", part))
            }
        };

        let response = builder.send().map_err(ApiError::Transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(ApiError::Transport)?.to_vec();
        Ok(ApiResponse { status, body })
    }
}
