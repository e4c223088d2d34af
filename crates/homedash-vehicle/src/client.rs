//! Owner API client with retry logic.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::error::{VehicleError, VehicleResult};
use crate::retry::{with_retry, RetryConfig};
use crate::types::{ApiEnvelope, VehicleData, VehicleSnapshot, VehicleState, VehicleSummary};

pub const DEFAULT_API_BASE: &str = "https://owner-api.teslamotors.com";
pub const DEFAULT_WAKE_WAIT: Duration = Duration::from_secs(30);

pub struct VehicleClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    retry: RetryConfig,
    wake_wait: Duration,
}

impl VehicleClient {
    pub fn new(access_token: &str) -> Self {
        Self::new_with_base_url(access_token, DEFAULT_API_BASE)
    }

    pub fn new_with_base_url(access_token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_default(),
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryConfig::default(),
            wake_wait: DEFAULT_WAKE_WAIT,
        }
    }

    /// Time to wait after a wake-up request before reading data.
    pub fn with_wake_wait(mut self, wake_wait: Duration) -> Self {
        self.wake_wait = wake_wait;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn list_vehicles(&self) -> VehicleResult<Vec<VehicleSummary>> {
        let url = format!("{}/api/1/vehicles", self.base_url);
        let response = with_retry(&self.retry, || {
            self.client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
        })
        .await?;

        let envelope: ApiEnvelope<Vec<VehicleSummary>> = self.handle_response(response).await?;
        Ok(envelope.response)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn wake_up(&self, vehicle_id: u64) -> VehicleResult<VehicleSummary> {
        let url = format!("{}/api/1/vehicles/{}/wake_up", self.base_url, vehicle_id);
        let response = with_retry(&self.retry, || {
            self.client
                .post(&url)
                .header("Authorization", self.auth_header())
                .send()
        })
        .await?;

        let envelope: ApiEnvelope<VehicleSummary> = self.handle_response(response).await?;
        Ok(envelope.response)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn vehicle_data(&self, vehicle_id: u64) -> VehicleResult<VehicleData> {
        let url = format!("{}/api/1/vehicles/{}/vehicle_data", self.base_url, vehicle_id);
        let response = with_retry(&self.retry, || {
            self.client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
        })
        .await?;

        let envelope: ApiEnvelope<VehicleData> = self.handle_response(response).await?;
        Ok(envelope.response)
    }

    /// Read name, battery and odometer of the first vehicle on the account,
    /// waking it first when it is asleep.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_snapshot(&self) -> VehicleResult<VehicleSnapshot> {
        let mut vehicle = self
            .list_vehicles()
            .await?
            .into_iter()
            .next()
            .ok_or(VehicleError::NoVehicles)?;
        tracing::info!("Vehicle {} is {:?}", vehicle.id, vehicle.state);

        if vehicle.state == VehicleState::Asleep {
            self.wake_up(vehicle.id).await?;
            tracing::info!("Waiting {:?} for vehicle to wake up", self.wake_wait);
            tokio::time::sleep(self.wake_wait).await;

            vehicle = self
                .list_vehicles()
                .await?
                .into_iter()
                .next()
                .ok_or(VehicleError::NoVehicles)?;
            tracing::info!("Vehicle state after wake: {:?}", vehicle.state);
        }

        let data = self.vehicle_data(vehicle.id).await?;
        Ok(VehicleSnapshot::from(data))
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> VehicleResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| VehicleError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(VehicleError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(VehicleError::AuthRequired)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(VehicleError::VehicleNotFound(text))
        } else if status.as_u16() == 408 {
            let text = response.text().await.unwrap_or_default();
            Err(VehicleError::Unavailable(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(VehicleError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(VehicleError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> VehicleClient {
        VehicleClient::new_with_base_url("test_token", &server.uri())
            .with_retry_config(RetryConfig::none())
            .with_wake_wait(Duration::from_millis(1))
    }

    fn vehicle_data_body() -> serde_json::Value {
        serde_json::json!({
            "response": {
                "id": 1,
                "display_name": "Blue",
                "state": "online",
                "charge_state": {"battery_level": 64},
                "vehicle_state": {"odometer": 23456.7}
            }
        })
    }

    #[tokio::test]
    async fn test_list_vehicles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [{"id": 1, "display_name": "Blue", "state": "online"}],
                "count": 1
            })))
            .mount(&server)
            .await;

        let vehicles = client(&server).list_vehicles().await.unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].state, VehicleState::Online);
    }

    #[tokio::test]
    async fn test_snapshot_online_vehicle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [{"id": 1, "state": "online"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/1/vehicles/1/wake_up"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles/1/vehicle_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vehicle_data_body()))
            .mount(&server)
            .await;

        let snap = client(&server).fetch_snapshot().await.unwrap();
        assert_eq!(snap.name, "Blue");
        assert_eq!(snap.battery.percent(), 64);
        assert_eq!(snap.odometer_miles, 23456.7);
    }

    #[tokio::test]
    async fn test_snapshot_wakes_sleeping_vehicle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [{"id": 1, "state": "asleep"}]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [{"id": 1, "state": "online"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/1/vehicles/1/wake_up"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {"id": 1, "state": "online"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles/1/vehicle_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vehicle_data_body()))
            .mount(&server)
            .await;

        let snap = client(&server).fetch_snapshot().await.unwrap();
        assert_eq!(snap.battery.percent(), 64);
    }

    #[tokio::test]
    async fn test_no_vehicles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": []})),
            )
            .mount(&server)
            .await;

        let result = client(&server).fetch_snapshot().await;
        assert!(matches!(result, Err(VehicleError::NoVehicles)));
    }

    #[tokio::test]
    async fn test_token_expired_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client(&server).list_vehicles().await;
        assert!(matches!(result, Err(VehicleError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles/5/vehicle_data"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "30"))
            .mount(&server)
            .await;

        let result = client(&server).vehicle_data(5).await;
        assert!(matches!(result, Err(VehicleError::RateLimited(30))));
    }

    #[tokio::test]
    async fn test_unavailable_vehicle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles/5/vehicle_data"))
            .respond_with(ResponseTemplate::new(408).set_body_string("vehicle unavailable"))
            .mount(&server)
            .await;

        let err = client(&server).vehicle_data(5).await.unwrap_err();
        assert!(matches!(err, VehicleError::Unavailable(_)));
        assert!(err.is_retryable());
    }
}
