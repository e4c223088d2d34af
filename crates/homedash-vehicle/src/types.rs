//! Owner API payloads and the snapshot shown on the vehicle page.

use serde::{Deserialize, Serialize};

use crate::display::BatteryLevel;

/// Every owner API payload is wrapped in `{"response": ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: T,
}

/// Connection state reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleState {
    Online,
    Asleep,
    Offline,
    #[serde(other)]
    Unknown,
}

/// Entry of `GET /api/1/vehicles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleSummary {
    pub id: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    pub state: VehicleState,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeState {
    #[serde(default)]
    pub battery_level: Option<f64>,
    #[serde(default)]
    pub battery_range: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OdometerState {
    #[serde(default)]
    pub odometer: Option<f64>,
}

/// Body of `GET /api/1/vehicles/{id}/vehicle_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleData {
    pub id: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    pub state: VehicleState,
    #[serde(default)]
    pub charge_state: ChargeState,
    #[serde(default)]
    pub vehicle_state: OdometerState,
}

/// What the vehicle page needs from one poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub name: String,
    pub battery: BatteryLevel,
    pub odometer_miles: f64,
}

impl From<VehicleData> for VehicleSnapshot {
    fn from(data: VehicleData) -> Self {
        Self {
            name: data
                .display_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Vehicle {}", data.id)),
            battery: BatteryLevel::new(data.charge_state.battery_level.unwrap_or(0.0)),
            odometer_miles: data.vehicle_state.odometer.unwrap_or(0.0),
        }
    }
}
