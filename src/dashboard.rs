use crate::api::{ApiClient, ApiError};
use reqwest::Method;
use serde_json::Value;

pub const DASHBOARD_PATH: &str = "/dashboardData";

impl ApiClient {
    /// Fetch the dashboard payload for the current session. The payload is
    /// opaque to this crate; the host renders it.
    pub async fn fetch_dashboard_data(&self) -> Result<Value, ApiError> {
        self.execute(Method::GET, DASHBOARD_PATH, None).await
    }
}
