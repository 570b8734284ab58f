use appserver_core::{extract_error_message, QueryPairs};
use log::{debug, error};
use reqwest_middleware::{
    reqwest::{
        header::{HeaderMap, HeaderName, HeaderValue},
        Method, StatusCode,
    },
    ClientWithMiddleware,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::config::ServiceSettings;

pub const API_KEY_HEADER: &str = "api_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Listing,
    Users,
    Auth,
    Payments,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => write!(f, "listing service"),
            Self::Users => write!(f, "user service"),
            Self::Auth => write!(f, "auth service"),
            Self::Payments => write!(f, "payment service"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// The service answered with a status the caller did not expect
    #[error("{message}")]
    Status {
        service: Service,
        status: StatusCode,
        message: String,
    },
    #[error("problem sending request to {0}: {1}")]
    Send(Service, #[source] reqwest_middleware::Error),
    #[error("problem reading response from {0}: {1}")]
    Read(Service, #[source] reqwest_middleware::reqwest::Error),
    #[error("unexpected payload from {service}: {source}")]
    Shape {
        service: Service,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid request to {0}: {1}")]
    Request(Service, String),
}

impl Error {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One request to a downstream service.
///
/// Defaults to expecting `201 Created` for POST and `200 OK` for every other verb.
#[derive(Debug)]
pub struct ServiceCall {
    method: Method,
    path: String,
    expected: Vec<StatusCode>,
    payload: Option<Value>,
    invalid_payload: Option<serde_json::Error>,
    query: QueryPairs,
    headers: Vec<(&'static str, String)>,
}

impl ServiceCall {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let expected = if method == Method::POST {
            vec![StatusCode::CREATED]
        } else {
            vec![StatusCode::OK]
        };
        Self {
            method,
            path: path.into(),
            expected,
            payload: None,
            invalid_payload: None,
            query: QueryPairs::new(),
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn expect(mut self, statuses: &[StatusCode]) -> Self {
        self.expected = statuses.to_vec();
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => self.payload = Some(value),
            Err(e) => self.invalid_payload = Some(e),
        }
        self
    }

    pub fn query(mut self, pairs: QueryPairs) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Extra headers take precedence over the service api key.
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

/// Client of a single downstream service, distinguished only by base url and api key.
#[derive(Clone)]
pub struct ServiceClient {
    pub service: Service,
    base_url: String,
    api_key: SecretString,
    client: ClientWithMiddleware,
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ServiceClient {
    pub fn new(service: Service, client: ClientWithMiddleware, settings: &ServiceSettings) -> Self {
        Self {
            service,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: SecretString::from(settings.api_key.clone()),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, extra: &[(&'static str, String)]) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|e| Error::Request(self.service, format!("invalid api key: {}", e)))?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), api_key);

        for (name, value) in extra {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::Request(self.service, format!("invalid header {}: {}", name, e))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                Error::Request(self.service, format!("invalid header {}: {}", name, e))
            })?;
            headers.insert(header_name, value);
        }
        Ok(headers)
    }

    /// Performs the call without looking at the status.
    ///
    /// An empty body is returned as `null`, a non json body as a string.
    pub async fn send(&self, call: ServiceCall) -> Result<(Value, StatusCode), Error> {
        if let Some(e) = call.invalid_payload {
            return Err(Error::Request(
                self.service,
                format!("payload is not valid json: {}", e),
            ));
        }
        let url = format!("{}{}", self.base_url, call.path);
        debug!("{} {} {}", self.service, call.method, url);

        let mut request = self
            .client
            .request(call.method, &url)
            .headers(self.headers(&call.headers)?);
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(payload) = &call.payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|e| {
            error!("error sending to {}: {}", self.service, e);
            Error::Send(self.service, e)
        })?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Read(self.service, e))?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok((body, status))
    }

    /// Performs the call and fails with [`Error::Status`] on any status not expected by the caller.
    pub async fn call(&self, call: ServiceCall) -> Result<(Value, StatusCode), Error> {
        let expected = call.expected.clone();
        let (body, status) = self.send(call).await?;

        if !expected.contains(&status) {
            let message = extract_error_message(&body);
            error!(
                "{} answered {} (expected {:?}): {}",
                self.service, status, expected, message
            );
            return Err(Error::Status {
                service: self.service,
                status,
                message,
            });
        }
        Ok((body, status))
    }

    /// Performs the call and decodes the body into the service's payload type.
    pub async fn fetch<T: DeserializeOwned>(&self, call: ServiceCall) -> Result<T, Error> {
        let (body, _) = self.call(call).await?;
        serde_json::from_value(body).map_err(|source| Error::Shape {
            service: self.service,
            source,
        })
    }
}
