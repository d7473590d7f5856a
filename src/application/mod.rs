// Application layer - Use cases and the ports they depend on
pub mod forecast_model;
pub mod forecast_service;
