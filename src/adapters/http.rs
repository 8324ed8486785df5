use crate::config::toml_config::SourceConfig;
use crate::domain::model::{AuthToken, Credentials, RawCourseRecord};
use crate::domain::ports::CourseProvider;
use crate::utils::error::{GpaError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    id_token: Option<String>,
}

/// reqwest client for the faculty's student portal API.
pub struct FcaiClient {
    client: Client,
    source: SourceConfig,
    headers: HeaderMap,
}

impl FcaiClient {
    pub fn new(source: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(source.timeout_seconds))
            .build()?;
        let headers = build_header_map(&source)?;

        Ok(Self {
            client,
            source,
            headers,
        })
    }
}

fn build_header_map(source: &SourceConfig) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();

    for (key, value) in source.resolved_headers() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            GpaError::InvalidConfigValueError {
                field: "source.headers".to_string(),
                value: key.clone(),
                reason: format!("Invalid header name: {}", e),
            }
        })?;
        let value = HeaderValue::from_str(&value).map_err(|e| {
            GpaError::InvalidConfigValueError {
                field: format!("source.headers.{}", key),
                value: value.clone(),
                reason: format!("Invalid header value: {}", e),
            }
        })?;
        map.insert(name, value);
    }

    Ok(map)
}

fn status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unexpected status")
        .to_string()
}

#[async_trait]
impl CourseProvider for FcaiClient {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthToken> {
        let url = self.source.endpoint("authenticate");
        let payload = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password,
            "rememberMe": false,
        });

        tracing::debug!("Logging in as {} via {}", credentials.username, url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Login response status: {}", status);

        if status != StatusCode::OK {
            return Err(GpaError::AuthenticationError {
                status: status.as_u16(),
                message: status_message(status),
            });
        }

        let body: LoginResponse = response.json().await?;
        match body.id_token.filter(|token| !token.is_empty()) {
            Some(token) => {
                tracing::info!("🔐 Logged in as {}", credentials.username);
                Ok(AuthToken::new(token))
            }
            None => Err(GpaError::AuthenticationError {
                status: status.as_u16(),
                message: "login response did not contain an id_token".to_string(),
            }),
        }
    }

    async fn fetch_courses(
        &self,
        student_id: &str,
        token: &AuthToken,
    ) -> Result<Vec<RawCourseRecord>> {
        let url = self.source.endpoint("student-courses");
        let query = [
            ("size", self.source.page_size.to_string()),
            ("studentId.equals", student_id.to_string()),
            (
                "includeWithdraw.equals",
                self.source.include_withdrawn.to_string(),
            ),
        ];

        tracing::debug!("Requesting courses for {} from {}", student_id, url);
        let response = self
            .client
            .get(&url)
            .headers(self.headers.clone())
            .bearer_auth(token.as_str())
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Courses response status: {}", status);

        if status != StatusCode::OK {
            return Err(GpaError::TransportError {
                status: status.as_u16(),
                message: status_message(status),
            });
        }

        let body: serde_json::Value = response.json().await?;
        let serde_json::Value::Array(items) = body else {
            return Err(GpaError::TransportError {
                status: status.as_u16(),
                message: "expected a JSON array of course records".to_string(),
            });
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<RawCourseRecord>(item) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("⚠️ Skipping unreadable course record #{}: {}", index, e),
            }
        }

        tracing::info!("📚 Retrieved {} course records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> FcaiClient {
        let source = SourceConfig {
            base_url: server.url("/api"),
            ..SourceConfig::default()
        };
        FcaiClient::new(source).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let server = MockServer::start();
        let login_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/authenticate")
                .json_body(serde_json::json!({
                    "username": "20210001",
                    "password": "secret",
                    "rememberMe": false
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"id_token": "jwt-token"}));
        });

        let client = client_for(&server);
        let token = client
            .authenticate(&Credentials::new("20210001", "secret"))
            .await
            .unwrap();

        login_mock.assert();
        assert_eq!(token.as_str(), "jwt-token");
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let server = MockServer::start();
        let login_mock = server.mock(|when, then| {
            when.method(POST).path("/api/authenticate");
            then.status(401);
        });

        let client = client_for(&server);
        let result = client
            .authenticate(&Credentials::new("20210001", "wrong"))
            .await;

        login_mock.assert();
        assert!(matches!(
            result,
            Err(GpaError::AuthenticationError { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_authenticate_without_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/authenticate");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({}));
        });

        let client = client_for(&server);
        let result = client
            .authenticate(&Credentials::new("20210001", "secret"))
            .await;

        assert!(matches!(result, Err(GpaError::AuthenticationError { .. })));
    }

    #[tokio::test]
    async fn test_fetch_courses_sends_bearer_token_and_query() {
        let server = MockServer::start();
        let courses_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/student-courses")
                .query_param("size", "150")
                .query_param("studentId.equals", "20210001")
                .query_param("includeWithdraw.equals", "true")
                .header("Authorization", "Bearer jwt-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "course": {
                            "code": "CS112",
                            "name": "Structured Programming",
                            "arabicName": "البرمجة الهيكلية",
                            "numOfHours": 3,
                            "type": {"name": "Compulsory"}
                        },
                        "level": {"name": "Level 1"},
                        "term": {"name": "Second Term"},
                        "grade": "A",
                        "result": 87.5
                    },
                    "not a record",
                    {"grade": "B"}
                ]));
        });

        let client = client_for(&server);
        let records = client
            .fetch_courses("20210001", &AuthToken::new("jwt-token"))
            .await
            .unwrap();

        courses_mock.assert();
        assert_eq!(records.len(), 2);
        let course = records[0].course.as_ref().unwrap();
        assert_eq!(course.code.as_deref(), Some("CS112"));
        assert_eq!(course.arabic_name.as_deref(), Some("البرمجة الهيكلية"));
        assert_eq!(records[0].grade.as_deref(), Some("A"));
        assert!(records[1].course.is_none());
    }

    #[tokio::test]
    async fn test_fetch_courses_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/student-courses");
            then.status(500);
        });

        let client = client_for(&server);
        let result = client
            .fetch_courses("20210001", &AuthToken::new("jwt-token"))
            .await;

        assert!(matches!(
            result,
            Err(GpaError::TransportError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_courses_rejects_non_array_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/student-courses");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"message": "maintenance"}));
        });

        let client = client_for(&server);
        let result = client
            .fetch_courses("20210001", &AuthToken::new("jwt-token"))
            .await;

        assert!(matches!(result, Err(GpaError::TransportError { .. })));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let source = SourceConfig {
            headers: Some(std::collections::HashMap::from([(
                "Bad Header".to_string(),
                "x".to_string(),
            )])),
            ..SourceConfig::default()
        };
        assert!(matches!(
            FcaiClient::new(source),
            Err(GpaError::InvalidConfigValueError { .. })
        ));
    }
}
