//! # IO Layer
//!
//! The HTTP surface of the backend. Everything here translates between
//! the wire and the domain services; no business rules live in this
//! layer.

pub mod rest;
