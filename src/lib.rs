// Unsecured JWT token-info verifier library

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod server;
