// src/handlers/mod.rs
pub mod comparison;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod params;
pub mod revenue;
pub mod statistics;
pub mod weather;
