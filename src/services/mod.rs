// src/services/mod.rs
pub mod calculations;
pub mod comparison;
pub mod dashboard;
pub mod open_meteo;
pub mod periods;
pub mod store;
pub mod supabase;
pub mod weather;
