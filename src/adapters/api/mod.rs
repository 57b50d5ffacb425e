//! Backend HTTP integration
//!
//! - [`urls`] - URL normalization against the configured API base
//! - [`endpoints`] - endpoint paths
//! - [`gateway`] - the [`ApiGateway`] trait and response shapes
//! - [`client`] - the reqwest implementation

pub mod client;
pub mod endpoints;
pub mod gateway;
pub mod urls;

pub use client::HttpGateway;
pub use gateway::{ApiGateway, JsonBody, RawResponse};
pub use urls::UrlResolver;
