use std::fmt::Debug;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::domain::DateRange;
use crate::config::{ApiCredential, HiringApiConfig};

const OPENING_LIST_PATH: &str = "opening/list";
const CANDIDATE_LIST_PATH: &str = "candidate/list";
/// Stands in for an error body that could not be read.
const UNREADABLE_BODY: &str = "<unreadable body>";

#[derive(Debug, thiserror::Error)]
pub enum HiringApiError {
    #[error("BASE_API_KEY is not configured")]
    MissingCredential,
    #[error("hiring API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("hiring API did not answer within {0:?}")]
    Timeout(Duration),
    #[error("hiring API request failed: {0}")]
    Transport(String),
    #[error("hiring API response could not be decoded: {0}")]
    Decode(String),
}

impl HiringApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Read-only view of the hiring API. Each call is a single exchange.
pub trait HiringGateway: Debug + Send + Sync {
    /// Raw opening objects, active or not.
    fn list_openings(&self) -> Result<Vec<Value>, HiringApiError>;

    /// Raw candidate objects of one opening within `range`.
    fn list_candidates(
        &self,
        opening_id: &str,
        range: &DateRange,
    ) -> Result<Vec<Value>, HiringApiError>;
}

/// Hands out a gateway per unit of work.
///
/// The blocking client owns a runtime of its own, so it is created and
/// dropped on the thread that performs the collection.
pub trait GatewayProvider: Send + Sync {
    type Gateway: HiringGateway;

    fn connect(&self) -> Result<Self::Gateway, HiringApiError>;
}

impl GatewayProvider for HiringApiConfig {
    type Gateway = BaseHiringClient;

    fn connect(&self) -> Result<Self::Gateway, HiringApiError> {
        BaseHiringClient::new(self)
    }
}

/// Client for the Base Hiring public API (v2).
pub struct BaseHiringClient {
    http: Client,
    base_url: String,
    credential: ApiCredential,
    timeout: Duration,
}

impl BaseHiringClient {
    pub fn new(config: &HiringApiConfig) -> Result<Self, HiringApiError> {
        let credential = config
            .api_key
            .clone()
            .ok_or(HiringApiError::MissingCredential)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hiring-reviews/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| HiringApiError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credential,
            timeout: config.timeout,
        })
    }

    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, HiringApiError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .map_err(|err| self.map_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| UNREADABLE_BODY.to_string());
            return Err(HiringApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .map_err(|err| HiringApiError::Decode(err.to_string()))
    }

    fn map_error(&self, err: reqwest::Error) -> HiringApiError {
        if err.is_timeout() {
            HiringApiError::Timeout(self.timeout)
        } else {
            HiringApiError::Transport(err.to_string())
        }
    }
}

impl Debug for BaseHiringClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseHiringClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HiringGateway for BaseHiringClient {
    fn list_openings(&self) -> Result<Vec<Value>, HiringApiError> {
        let body = self.post_form(
            OPENING_LIST_PATH,
            &[("access_token", self.credential.expose())],
        )?;
        Ok(list_field(body, "openings"))
    }

    fn list_candidates(
        &self,
        opening_id: &str,
        range: &DateRange,
    ) -> Result<Vec<Value>, HiringApiError> {
        let start_date = range.start_param();
        let end_date = range.end_param();
        let body = self.post_form(
            CANDIDATE_LIST_PATH,
            &[
                ("access_token", self.credential.expose()),
                ("opening_id", opening_id),
                ("start_date", start_date.as_str()),
                ("end_date", end_date.as_str()),
            ],
        )?;
        Ok(list_field(body, "candidates"))
    }
}

/// The list stored under `key`; a missing, null or non-list value is empty.
fn list_field(body: Value, key: &str) -> Vec<Value> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers a single request with `response` verbatim, then closes.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let read = stream.read(&mut buf).expect("read request");
                request.extend_from_slice(&buf[..read]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            if name.eq_ignore_ascii_case("content-length") {
                                value.trim().parse::<usize>().ok()
                            } else {
                                None
                            }
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if read == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).expect("write response");
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> BaseHiringClient {
        let config = HiringApiConfig::new(base_url, Some(ApiCredential::new("token")));
        BaseHiringClient::new(&config).expect("client builds")
    }

    #[test]
    fn list_field_tolerates_missing_keys() {
        assert_eq!(
            list_field(json!({"candidates": [{"id": "1"}]}), "candidates"),
            vec![json!({"id": "1"})]
        );
        assert!(list_field(json!({"candidates": null}), "candidates").is_empty());
        assert!(list_field(json!({"code": 1}), "openings").is_empty());
        assert!(list_field(json!([1, 2]), "openings").is_empty());
    }

    #[test]
    fn client_requires_a_credential() {
        let config = HiringApiConfig::new("http://127.0.0.1:9", None);
        match BaseHiringClient::new(&config) {
            Err(HiringApiError::MissingCredential) => {}
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[test]
    fn error_status_carries_the_response_body() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\nboom",
        );
        match client(url).list_openings() {
            Err(HiringApiError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_error_body_is_marked_unreadable() {
        let url = serve_once(
            "HTTP/1.1 502 Bad Gateway\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial",
        );
        match client(url).list_openings() {
            Err(HiringApiError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, UNREADABLE_BODY);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn status_errors_expose_the_http_code() {
        let error = HiringApiError::Status {
            status: 500,
            body: "internal".to_string(),
        };
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.to_string(), "hiring API returned 500: internal");
        assert_eq!(HiringApiError::MissingCredential.status(), None);
    }
}
