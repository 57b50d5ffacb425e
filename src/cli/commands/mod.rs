//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod consult;
pub mod doctor;
pub mod documents;
pub mod draft;
pub mod history;
pub mod init;
pub mod register;
pub mod validate;
pub mod whoami;
