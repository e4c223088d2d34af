//! Vehicle telemetry for Homedash.
//!
//! Talks to the vehicle owner API, keeps a daily odometer log and derives the
//! usage figures shown on the vehicle page.

pub mod client;
pub mod display;
pub mod error;
pub mod mileage;
pub mod retry;
pub mod token;
pub mod types;

pub use client::{VehicleClient, DEFAULT_API_BASE, DEFAULT_WAKE_WAIT};
pub use display::{format_odometer, BatteryBand, BatteryLevel};
pub use error::{VehicleError, VehicleResult};
pub use mileage::{mileage_stats, MileageEntry, MileageLog, MileageStat, DEFAULT_HIGH_MILEAGE_THRESHOLD};
pub use retry::RetryConfig;
pub use token::{TokenStore, VehicleTokens};
pub use types::{VehicleData, VehicleSnapshot, VehicleState, VehicleSummary};
