// src/lib.rs

// Re-export or define the top-level modules you need
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
