//! Patient-side queries
//!
//! See [`PatientPortal`].

pub mod portal;

pub use portal::PatientPortal;
