//! Common library for the exeet backend
//!
//! This crate provides shared functionality used across the services of the
//! exeet backend, currently database connectivity and error handling.

pub mod database;
pub mod error;
