//! Request Baskets: an in-memory HTTP request collector.
//!
//! Clients create named, token-protected baskets, point third-party systems at
//! `/{basket}/...`, and later page through the captured requests.

pub mod basket;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use basket::{Basket, BasketRegistry};
pub use config::ServiceConfig;
pub use error::BasketError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
