pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod extract;
pub mod models;
pub mod storage;
pub mod tracking;
pub mod workers;
