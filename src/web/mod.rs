// src/web/mod.rs
pub mod admin_handlers;
pub mod auth_handlers;
pub mod booking_handlers;
pub mod mw_admin;
pub mod routes;
