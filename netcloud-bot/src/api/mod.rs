//! HTTP API handlers for netcloud-bot

pub mod health;

pub use health::health_routes;
