//! Toolkit-independent page models for Homedash.
//!
//! Each page model owns its state, turns user actions into calls on the
//! calendar and vehicle crates, and exposes plain render data. `text`
//! renders that data for the terminal.

pub mod error_mapping;
pub mod models;
pub mod text;

pub use error_mapping::IntoAppError;
pub use models::calendar_model::{CalendarAction, CalendarPageModel, EventForm};
pub use models::vehicle_model::VehiclePageModel;
