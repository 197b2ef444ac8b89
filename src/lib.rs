pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod server;
pub mod services;
