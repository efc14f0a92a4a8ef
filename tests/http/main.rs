//! HTTP integration tests.
//!
//! Start an axum server on an ephemeral port and exercise it with reqwest.

#![cfg(feature = "http")]

mod commands;
mod projects;
mod support;
