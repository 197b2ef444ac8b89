pub mod admin;
pub mod auth;
pub mod calendar;
pub mod case;
pub mod dashboard;
pub mod document;
pub mod org;
pub mod profile;
pub mod route;
pub mod server;
pub mod shell;
