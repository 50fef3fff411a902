//! A small demonstration HTTP service.
//!
//! It exposes a health check, an endpoint that greets whoever is named in the
//! request body, and an endpoint that always fails so that failure handling
//! can be observed.

pub mod api;
pub mod app;
pub mod core;
pub mod infra;
