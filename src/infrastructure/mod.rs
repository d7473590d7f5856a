// Infrastructure layer - External dependencies and adapters
pub mod additive_model;
pub mod config;
pub mod csv_loader;
pub mod http_response;
pub mod json_mapper;
pub mod upload_store;
