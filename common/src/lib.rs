// Common library for the warehouse sync monitor

pub mod checker;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod notifier;
pub mod runner;
pub mod telemetry;
