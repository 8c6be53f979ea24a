use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub web_ui_path: String,
    pub on_prem_image_analysis_url: String,
    pub on_prem_knowledge_base_url: String,
    pub cloud_gateway_url: String,
    pub calendar_assistant_url: String,
    pub calendar_id: String,
    pub reachability_timeout: Duration,
    pub auth_wait_timeout: Duration,
    pub auth_poll_interval: Duration,
    pub max_upload_bytes: usize,
}

fn env_millis(key: &str, default: u64) -> Duration {
    let millis = env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default);
    Duration::from_millis(millis)
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("CALSNAP_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/calsnap.db", storage_path.trim_end_matches('/'));
        let web_ui_path = env::var("CALSNAP_WEB_UI_PATH").unwrap_or("./web-ui".to_string());
        let on_prem_image_analysis_url = env::var("CALSNAP_ON_PREM_IMAGE_ANALYSIS_URL")
            .unwrap_or_else(|_| "http://localhost:5001".to_string());
        let on_prem_knowledge_base_url = env::var("CALSNAP_ON_PREM_KNOWLEDGE_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5002".to_string());
        let cloud_gateway_url = env::var("CALSNAP_CLOUD_GATEWAY_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string());
        let calendar_assistant_url = env::var("CALSNAP_CALENDAR_ASSISTANT_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let calendar_id = env::var("CALSNAP_CALENDAR_ID").unwrap_or_else(|_| "primary".to_string());
        let max_upload_bytes = env::var("CALSNAP_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(20 * 1024 * 1024);

        Self {
            storage_path,
            db_path,
            web_ui_path,
            on_prem_image_analysis_url,
            on_prem_knowledge_base_url,
            cloud_gateway_url,
            calendar_assistant_url,
            calendar_id,
            reachability_timeout: env_millis("CALSNAP_REACHABILITY_TIMEOUT_MS", 3000),
            // A shared file waits this long for a sign-in before giving up
            auth_wait_timeout: env_millis("CALSNAP_AUTH_WAIT_TIMEOUT_MS", 10_000),
            auth_poll_interval: env_millis("CALSNAP_AUTH_POLL_INTERVAL_MS", 100),
            max_upload_bytes,
        }
    }
}
