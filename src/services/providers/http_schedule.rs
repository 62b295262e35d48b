use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{BroadcastSlot, Day, TvType},
    services::providers::ScheduleProvider,
};

/// Schedule source over HTTP
///
/// Fetches the already-normalized broadcast programming from the schedule
/// service at `{base_url}/schedule/{tv_type}/{day}`. Scraping and
/// normalization happen on the other side of this seam.
#[derive(Clone)]
pub struct HttpScheduleProvider {
    http_client: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    schedule: Vec<BroadcastSlot>,
}

impl HttpScheduleProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl ScheduleProvider for HttpScheduleProvider {
    async fn schedule(&self, tv_type: TvType, day: Day) -> AppResult<Vec<BroadcastSlot>> {
        let url = format!("{}/schedule/{}/{}", self.base_url, tv_type, day);

        tracing::debug!(%tv_type, %day, "Fetching broadcast schedule");

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Schedule(format!(
                "schedule source returned status {}: {}",
                status, body
            )));
        }

        let payload: ScheduleResponse = response
            .json()
            .await
            .map_err(|e| AppError::Schedule(format!("invalid schedule payload: {}", e)))?;

        tracing::info!(
            %tv_type,
            %day,
            slots = payload.schedule.len(),
            "Broadcast schedule fetched"
        );

        Ok(payload.schedule)
    }
}
