//! Chat-room backend: presence tracking with inactivity eviction and
//! per-viewer message visibility.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
