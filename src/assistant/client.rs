//! HTTP client for the calendar assistant backend

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::models::{
    CommitRequest, CommitResult, ExtractedEvent, ExtractionResult, HealthResponse,
};
use crate::core::WorkflowError;
use crate::intake::SelectedImage;
use crate::origin::EndpointSet;

pub const EXTRACT_FAILED_MESSAGE: &str = "Failed to extract calendar events";
pub const COMMIT_FAILED_MESSAGE: &str = "Failed to add events to calendar";

/// The two backend operations the workflow drives. Implemented by
/// `AssistantClient`; tests substitute their own.
#[async_trait]
pub trait CalendarAssistant: Send + Sync {
    async fn extract(&self, image: &SelectedImage) -> Result<ExtractionResult, WorkflowError>;
    async fn commit(
        &self,
        events: &[ExtractedEvent],
        calendar_id: &str,
    ) -> Result<CommitResult, WorkflowError>;
}

#[derive(Clone, Debug)]
pub struct AssistantClient {
    http: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_endpoints(endpoints: &EndpointSet) -> Self {
        Self::new(&endpoints.calendar_assistant)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET / and check for `{"status": "healthy"}`. Failures are logged
    /// and reported as unhealthy.
    pub async fn health(&self) -> bool {
        let resp = match self.http.get(format!("{}/", self.base_url)).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Calendar backend health check failed: {}", e);
                return false;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!("Calendar backend health check returned {}", resp.status());
            return false;
        }
        match resp.json::<HealthResponse>().await {
            Ok(health) => health.status == "healthy",
            Err(e) => {
                tracing::error!("Unreadable health response: {}", e);
                false
            }
        }
    }
}

/// Build the backend error for a non-2xx response, carrying the body's
/// `detail` when there is one.
async fn backend_error(resp: Response, fallback_message: &str) -> WorkflowError {
    let status = resp.status();
    let body: Option<Value> = resp.json().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b.get("detail"))
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .unwrap_or(fallback_message)
        .to_string();
    tracing::error!("Calendar assistant returned {}: {}", status, message);
    WorkflowError::Backend {
        status: status.as_u16(),
        message,
    }
}

/// Turn a response into `T`, or into a backend error
async fn parse_response<T: DeserializeOwned>(
    resp: Response,
    fallback_message: &str,
) -> Result<T, WorkflowError> {
    if !resp.status().is_success() {
        return Err(backend_error(resp, fallback_message).await);
    }

    Ok(resp.json::<T>().await?)
}

/// A 2xx from add-to-calendar means the events were written, whatever the
/// body holds. An empty or unreadable body is a plain acknowledgement.
async fn parse_commit_response(resp: Response) -> Result<CommitResult, WorkflowError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(backend_error(resp, COMMIT_FAILED_MESSAGE).await);
    }

    let body = resp.bytes().await?;
    if body.is_empty() {
        return Ok(CommitResult::default());
    }
    match serde_json::from_slice(&body) {
        Ok(ack) => Ok(ack),
        Err(e) => {
            tracing::warn!("Unreadable acknowledgement with status {}: {}", status, e);
            Ok(CommitResult::default())
        }
    }
}

#[async_trait]
impl CalendarAssistant for AssistantClient {
    async fn extract(&self, image: &SelectedImage) -> Result<ExtractionResult, WorkflowError> {
        let part = Part::bytes(image.content.clone())
            .file_name(image.filename.clone())
            .mime_str(&image.media_type)
            .map_err(|_| WorkflowError::validation(crate::intake::NOT_AN_IMAGE_MESSAGE))?;
        let form = Form::new().part("file", part);

        tracing::debug!("Uploading {:?} for extraction", image);
        let resp = self
            .http
            .post(format!("{}/api/extract-calendar-events", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let result: ExtractionResult = parse_response(resp, EXTRACT_FAILED_MESSAGE).await?;
        tracing::debug!(
            "Extracted {} events from image {}",
            result.events.len(),
            result.image_id
        );
        Ok(result)
    }

    async fn commit(
        &self,
        events: &[ExtractedEvent],
        calendar_id: &str,
    ) -> Result<CommitResult, WorkflowError> {
        let payload = CommitRequest {
            events,
            calendar_id,
        };

        tracing::debug!("Adding {} events to calendar {}", events.len(), calendar_id);
        let resp = self
            .http
            .post(format!("{}/api/add-to-calendar", self.base_url))
            .json(&payload)
            .send()
            .await?;

        parse_commit_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn jpeg() -> SelectedImage {
        SelectedImage::new(b"fake-jpeg-bytes".to_vec(), "image/jpeg", "fridge.jpg")
    }

    fn dentist() -> ExtractedEvent {
        ExtractedEvent {
            summary: String::from("Dentist"),
            start_datetime: String::from("2024-06-01T09:00:00Z"),
            end_datetime: String::from("2024-06-01T10:00:00Z"),
            description: None,
            location: Some(String::from("Main St")),
        }
    }

    #[tokio::test]
    async fn it_extracts_events_from_an_upload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/extract-calendar-events")
            .match_header(
                "content-type",
                Matcher::Regex(r"^multipart/form-data; boundary=.+$".into()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="fridge.jpg""#.into()),
                Matcher::Regex("(?i)content-type: image/jpeg".into()),
                Matcher::Regex("fake-jpeg-bytes".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "events": [{
                        "summary": "Dentist",
                        "start_datetime": "2024-06-01T09:00:00Z",
                        "end_datetime": "2024-06-01T10:00:00Z",
                        "description": "",
                        "location": "Main St"
                    }],
                    "ocr_text": "JUNE\n1 Dentist 9am",
                    "image_id": "abc123"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let result = client.extract(&jpeg()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.image_id, "abc123");
        assert_eq!(result.ocr_text, "JUNE\n1 Dentist 9am");
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].summary, "Dentist");
        assert_eq!(result.events[0].location.as_deref(), Some("Main St"));
    }

    #[tokio::test]
    async fn it_surfaces_the_backend_detail_on_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/extract-calendar-events")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "OCR engine timeout"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let actual = client.extract(&jpeg()).await;

        assert_eq!(
            actual,
            Err(WorkflowError::Backend {
                status: 500,
                message: String::from("OCR engine timeout"),
            })
        );
    }

    #[tokio::test]
    async fn it_uses_a_generic_message_without_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/extract-calendar-events")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let err = client.extract(&jpeg()).await.unwrap_err();

        assert_eq!(err.to_string(), EXTRACT_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn it_ignores_structured_validation_details() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/add-to-calendar")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": [{"loc": ["body"], "msg": "field required"}]}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let err = client.commit(&[dentist()], "primary").await.unwrap_err();

        assert_eq!(err.to_string(), COMMIT_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn it_reports_unreachable_backends_as_transport_errors() {
        let client = AssistantClient::new("http://127.0.0.1:1");
        let err = client.extract(&jpeg()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Transport(_)));
    }

    #[tokio::test]
    async fn it_commits_events_to_a_calendar() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/add-to-calendar")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "events": [{
                    "summary": "Dentist",
                    "start_datetime": "2024-06-01T09:00:00Z",
                    "end_datetime": "2024-06-01T10:00:00Z",
                    "location": "Main St"
                }],
                "calendar_id": "primary"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "events_created": 1, "events": [], "message": "done"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&format!("{}/", server.url()));
        let ack = client.commit(&[dentist()], "primary").await.unwrap();

        mock.assert_async().await;
        assert!(ack.success);
        assert_eq!(ack.events_created, Some(1));
    }

    #[tokio::test]
    async fn it_treats_a_bodiless_2xx_commit_as_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/add-to-calendar")
            .with_status(204)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let ack = client.commit(&[dentist()], "primary").await.unwrap();

        assert_eq!(ack, CommitResult::default());
        assert!(ack.success);
    }

    #[tokio::test]
    async fn it_treats_a_non_json_2xx_commit_as_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/add-to-calendar")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("OK")
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        let ack = client.commit(&[dentist()], "primary").await.unwrap();

        assert!(ack.success);
        assert_eq!(ack.events_created, None);
    }

    #[tokio::test]
    async fn it_checks_backend_health() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"status": "healthy", "service": "Family Calendar Assistant"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        assert!(client.health().await);
    }

    #[tokio::test]
    async fn it_treats_other_statuses_as_unhealthy() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"status": "degraded"}"#)
            .create_async()
            .await;

        let client = AssistantClient::new(&server.url());
        assert!(!client.health().await);
        assert!(!AssistantClient::new("http://127.0.0.1:1").health().await);
    }
}
