//! Ferrea Server Library
//!
//! This module exports the HTTP gateway components for testing and reuse.

pub mod handlers;
pub mod routes;
pub mod state;
