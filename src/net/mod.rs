//! Networking for the mind-map REST service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` issues one HTTP request per call, `poll` layers the bounded
//! content-generation loop on top of it, `types` defines the wire schema and
//! `error` the failure taxonomy shared by both.

pub mod api;
pub mod error;
pub mod poll;
pub mod types;
