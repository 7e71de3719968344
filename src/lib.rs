//! Piriven Content Service Library
//!
//! This library exposes the service internals for integration testing.
//! The main entry point for running the server is the `piriven-api` binary.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod slug;
pub mod state;
pub mod validate;
