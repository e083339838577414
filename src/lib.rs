//! The `todovault` library crate.
//!
//! A multi-tenant todo-tracking API: authenticated users manage private
//! collections of todos over HTTP. Sessions are per-device opaque tokens
//! presented in the `x-auth` header; a token is valid only while its entry
//! remains in the owner's active-token set, so logout is effective even
//! though signatures never expire. All todo access is scoped to the resolved
//! caller identity inside the store layer.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
