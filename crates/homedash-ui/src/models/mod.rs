pub mod calendar_model;
pub mod vehicle_model;
