//! Authorization decision engine and signed-token lifecycle.
//!
//! The core lives in [`services::auth`]; everything under [`api`] and
//! [`middleware`] is the HTTP adapter around it.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repos;
pub mod services;
pub mod state;
