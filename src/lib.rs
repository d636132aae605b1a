#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Boards, tasks and users behind a token-authenticated REST API. This crate holds"]
#![doc = "the data model and its repository functions, the token service and auth middleware,"]
#![doc = "the route handlers and error handling. `main.rs` wires them into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::error::AppError;
