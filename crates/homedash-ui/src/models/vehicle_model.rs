//! Vehicle page model.
//!
//! Polls the vehicle once per refresh, records the odometer in the mileage
//! log and exposes the battery, odometer and usage table.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use homedash_core::VehicleConfig;
use homedash_vehicle::{
    format_odometer, mileage_stats, BatteryBand, MileageLog, MileageStat, TokenStore,
    VehicleClient, VehicleError, VehicleSnapshot, VehicleTokens,
};

use crate::error_mapping::{token_storage_error, IntoAppError};

pub struct VehiclePageModel {
    config: VehicleConfig,
    tokens: TokenStore,
    log: Option<MileageLog>,
    loading: bool,
    error_message: String,
    snapshot: Option<VehicleSnapshot>,
    stats: Vec<MileageStat>,
}

impl VehiclePageModel {
    /// A mileage log that cannot be opened leaves the history table empty.
    pub fn new(config: &VehicleConfig, tokens: TokenStore, mileage_db: &Path) -> Self {
        let log = match MileageLog::open(mileage_db) {
            Ok(log) => Some(log),
            Err(e) => {
                tracing::error!("Error opening mileage log: {}", e.into_app_error());
                None
            }
        };

        let mut model = Self {
            config: config.clone(),
            tokens,
            log,
            loading: false,
            error_message: String::new(),
            snapshot: None,
            stats: Vec::new(),
        };
        model.load_history();
        model
    }

    fn set_error(&mut self, e: VehicleError) {
        self.error_message = e.user_message();
        tracing::error!("Vehicle refresh failed: {}", e.into_app_error());
    }

    fn clear_error(&mut self) {
        self.error_message.clear();
    }

    /// Token from config or environment, falling back to the token file.
    /// A configured token is written back so later runs can reuse it.
    fn access_token(&self) -> Option<String> {
        if let Some(token) = self.config.access_token.as_deref().filter(|t| !t.is_empty()) {
            if let Err(e) = self.tokens.save(&VehicleTokens::from_access_token(token)) {
                tracing::warn!("Failed to persist vehicle token: {}", token_storage_error(&e));
            }
            return Some(token.to_string());
        }

        match self.tokens.load() {
            Ok(tokens) => tokens.map(|t| t.access_token),
            Err(e) => {
                tracing::warn!("Failed to read vehicle token: {}", token_storage_error(&e));
                None
            }
        }
    }

    fn client(&self, token: &str) -> VehicleClient {
        VehicleClient::new_with_base_url(token, &self.config.api_base_url)
            .with_wake_wait(Duration::from_secs(self.config.wake_wait_seconds))
    }

    /// Poll the vehicle and log today's odometer reading.
    pub async fn refresh(&mut self, today: NaiveDate) {
        let Some(token) = self.access_token() else {
            self.set_error(VehicleError::AuthRequired);
            return;
        };

        self.loading = true;
        self.clear_error();
        let result = self.client(&token).fetch_snapshot().await;
        self.loading = false;

        match result {
            Ok(snapshot) => {
                if let Some(log) = &self.log {
                    if let Err(e) = log.record(today, snapshot.odometer_miles) {
                        tracing::error!("Failed to record odometer: {}", e);
                    }
                }
                self.snapshot = Some(snapshot);
                self.load_history();
            }
            Err(e) => self.set_error(e),
        }
    }

    /// Rebuild the usage table from the mileage log.
    pub fn load_history(&mut self) {
        let entries = match &self.log {
            Some(log) => log.entries().unwrap_or_else(|e| {
                tracing::error!("Error reading mileage log: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.stats = mileage_stats(&entries, self.config.high_mileage_threshold);
    }

    pub fn title(&self) -> String {
        self.snapshot
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Vehicle".to_string())
    }

    pub fn battery_percent(&self) -> Option<u8> {
        self.snapshot.as_ref().map(|s| s.battery.percent())
    }

    pub fn battery_band(&self) -> Option<BatteryBand> {
        self.snapshot.as_ref().map(|s| s.battery.band())
    }

    pub fn odometer_label(&self) -> Option<String> {
        self.snapshot
            .as_ref()
            .map(|s| format_odometer(s.odometer_miles))
    }

    pub fn stats(&self) -> &[MileageStat] {
        &self.stats
    }

    /// Usage table as JSON for web or QML front ends.
    pub fn stats_json(&self) -> String {
        serde_json::to_string(&self.stats).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn config(base_url: &str, token: Option<&str>) -> VehicleConfig {
        VehicleConfig {
            api_base_url: base_url.to_string(),
            email: String::new(),
            access_token: token.map(str::to_string),
            wake_wait_seconds: 0,
            high_mileage_threshold: 40.0,
        }
    }

    async fn mock_vehicle(server: &MockServer, odometer: f64) {
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": [{"id": 3, "display_name": "Blue", "state": "online"}]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles/3/vehicle_data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": {
                    "id": 3,
                    "display_name": "Blue",
                    "state": "online",
                    "charge_state": {"battery_level": 45},
                    "vehicle_state": {"odometer": odometer}
                }
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_refresh_records_odometer() {
        let server = MockServer::start().await;
        mock_vehicle(&server, 1060.0).await;
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("homedash.db");
        MileageLog::open(&db).unwrap().record(d(2025, 9, 4), 1000.0).unwrap();

        let mut model = VehiclePageModel::new(
            &config(&server.uri(), Some("env_token")),
            TokenStore::new(dir.path().join("tokens")),
            &db,
        );
        assert_eq!(model.stats().len(), 1);

        model.refresh(d(2025, 9, 5)).await;
        assert_eq!(model.error_message(), "");
        assert_eq!(model.title(), "Blue");
        assert_eq!(model.battery_band(), Some(BatteryBand::Medium));
        assert_eq!(model.odometer_label().as_deref(), Some("1,060 miles"));
        assert_eq!(model.stats().len(), 2);
        assert!(model.stats()[1].high_usage);
        assert!(model.stats_json().contains("\"high_usage\":true"));

        let saved = TokenStore::new(dir.path().join("tokens")).load().unwrap();
        assert_eq!(saved.unwrap().access_token, "env_token");
    }

    #[tokio::test]
    async fn test_refresh_without_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut model = VehiclePageModel::new(
            &config("http://127.0.0.1:9", None),
            TokenStore::new(dir.path().join("tokens")),
            &dir.path().join("homedash.db"),
        );
        model.refresh(d(2025, 9, 5)).await;
        assert!(model.error_message().contains("access token"));
        assert_eq!(model.battery_percent(), None);
    }

    #[tokio::test]
    async fn test_expired_token_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/1/vehicles"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let tokens = TokenStore::new(dir.path());
        tokens.save(&VehicleTokens::from_access_token("stale")).unwrap();

        let mut model =
            VehiclePageModel::new(&config(&server.uri(), None), tokens, &dir.path().join("h.db"));
        model.refresh(d(2025, 9, 5)).await;
        assert!(model.error_message().contains("expired"));
        assert!(!model.loading());
    }

    #[test]
    fn test_unopenable_log_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let model = VehiclePageModel::new(
            &config("http://127.0.0.1:9", None),
            TokenStore::new(dir.path()),
            &dir.path().join("missing").join("homedash.db"),
        );
        assert!(model.stats().is_empty());
        assert_eq!(model.stats_json(), "[]");
    }
}
