// src/services/mod.rs
pub mod auth_service;
pub mod availability;
pub mod boat_service;
pub mod booking;
pub mod policy;
pub mod reservation_service;
