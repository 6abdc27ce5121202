pub mod admin;
pub mod auth;
pub mod coins;
pub mod portfolio;
pub mod trade;
pub mod users;
