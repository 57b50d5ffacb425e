//! External system integrations for Godwit.
//!
//! - [`api`] - the telemedicine backend over HTTP
//! - [`storage`] - durable local key-value storage and transient artifact blobs
//!
//! # Design Pattern
//!
//! Both integrations sit behind traits ([`api::ApiGateway`],
//! [`storage::KeyValueStore`], [`storage::BlobStore`]) so orchestration code
//! can be exercised against in-memory or mock implementations.
//!
//! ```rust,no_run
//! use godwit::adapters::api::{ApiGateway, HttpGateway};
//! use godwit::config::ApiConfig;
//! use std::sync::Arc;
//!
//! # fn example() -> godwit::domain::Result<()> {
//! let gateway: Arc<dyn ApiGateway> = Arc::new(HttpGateway::new(&ApiConfig::default())?);
//! println!("API base: {}", gateway.urls().base());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod storage;
