// Crate root library declaration and module exports.
pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod notify;
pub mod routes;
pub mod session;
pub mod storage;
pub mod timer;
pub mod timezone;
pub mod views;
