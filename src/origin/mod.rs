//! Picks between the on-premise services and the cloud gateway

use serde::Serialize;

use crate::core::AppConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    OnPremise,
    Cloud,
}

/// Base URLs used for the rest of a session. Resolved once and passed
/// around by value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EndpointSet {
    pub origin: Origin,
    pub image_analysis: String,
    pub knowledge_base: String,
    pub calendar_assistant: String,
}

impl EndpointSet {
    pub fn on_premise(config: &AppConfig) -> Self {
        Self {
            origin: Origin::OnPremise,
            image_analysis: config.on_prem_image_analysis_url.clone(),
            knowledge_base: config.on_prem_knowledge_base_url.clone(),
            // The calendar integration is only ever hosted in the cloud
            calendar_assistant: config.calendar_assistant_url.clone(),
        }
    }

    pub fn cloud(config: &AppConfig) -> Self {
        let gateway = config.cloud_gateway_url.trim_end_matches('/');
        Self {
            origin: Origin::Cloud,
            image_analysis: format!("{}/image-analysis", gateway),
            knowledge_base: format!("{}/knowledge-base", gateway),
            calendar_assistant: config.calendar_assistant_url.clone(),
        }
    }
}

/// Check the on-premise image analysis service is reachable and choose endpoints.
///
/// Any HTTP response counts as reachable, whatever its status. Only a
/// transport failure (refused connection, DNS, timeout) selects the
/// cloud gateway. The failure is never returned to the caller.
pub async fn resolve_endpoints(config: &AppConfig) -> EndpointSet {
    let client = match reqwest::Client::builder()
        .timeout(config.reachability_timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build reachability client, using cloud gateway: {}", e);
            return EndpointSet::cloud(config);
        }
    };

    match client.get(&config.on_prem_image_analysis_url).send().await {
        Ok(resp) => {
            tracing::info!(
                "On-premise services detected ({}), status {}",
                config.on_prem_image_analysis_url,
                resp.status()
            );
            EndpointSet::on_premise(config)
        }
        Err(e) => {
            tracing::info!(
                "On-premise services not detected, using cloud gateway: {}",
                e
            );
            EndpointSet::cloud(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config(on_prem_url: &str) -> AppConfig {
        AppConfig {
            storage_path: String::from("./"),
            db_path: String::from(":memory:"),
            web_ui_path: String::from("./web-ui"),
            on_prem_image_analysis_url: on_prem_url.to_string(),
            on_prem_knowledge_base_url: String::from("http://kb.local:5002"),
            cloud_gateway_url: String::from("https://gateway.example.com/"),
            calendar_assistant_url: String::from("https://assistant.example.com"),
            calendar_id: String::from("primary"),
            reachability_timeout: Duration::from_millis(500),
            auth_wait_timeout: Duration::from_secs(10),
            auth_poll_interval: Duration::from_millis(100),
            max_upload_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn it_uses_on_premise_when_the_service_answers() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/").with_status(200).create_async().await;
        let config = test_config(&server.url());

        let endpoints = resolve_endpoints(&config).await;

        assert_eq!(endpoints.origin, Origin::OnPremise);
        assert_eq!(endpoints.image_analysis, server.url());
        assert_eq!(endpoints.knowledge_base, "http://kb.local:5002");
        assert_eq!(endpoints.calendar_assistant, "https://assistant.example.com");
    }

    #[tokio::test]
    async fn it_treats_any_status_as_reachable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/").with_status(503).create_async().await;
        let config = test_config(&server.url());

        let endpoints = resolve_endpoints(&config).await;

        assert_eq!(endpoints.origin, Origin::OnPremise);
    }

    #[tokio::test]
    async fn it_falls_back_to_cloud_when_unreachable() {
        // Nothing listens on port 1
        let config = test_config("http://127.0.0.1:1");

        let endpoints = resolve_endpoints(&config).await;

        assert_eq!(endpoints.origin, Origin::Cloud);
        assert_eq!(
            endpoints.image_analysis,
            "https://gateway.example.com/image-analysis"
        );
        assert_eq!(
            endpoints.knowledge_base,
            "https://gateway.example.com/knowledge-base"
        );
        assert_eq!(endpoints.calendar_assistant, "https://assistant.example.com");
    }
}
