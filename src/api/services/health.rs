use poem_openapi::payload::Json;

use crate::{
    api::models::{ErrorDto, TrackerStatusDto, TrackerStatusResponseDto},
    tracker_client::TrackerClient,
};

pub struct HealthService<'a> {
    pub client: &'a TrackerClient,
}

impl<'a> HealthService<'a> {
    pub fn new(client: &'a TrackerClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn tracker_status(&self) -> TrackerStatusResponseDto {
        match self.client.get_status().await {
            Ok(s) => TrackerStatusResponseDto::Ok(Json(TrackerStatusDto {
                app: s.app,
                version: s.version,
            })),
            Err(e) => {
                tracing::warn!(error = %format!("{:?}", e), "tracker status check failed");
                TrackerStatusResponseDto::BadGateway(Json(ErrorDto {
                    message: format!("tracker error: {}", e),
                }))
            }
        }
    }
}
