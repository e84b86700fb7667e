//! Datastore access.
//!
//! Orders, listen events, status history, and blog posts live in a
//! Postgres-compatible database reached through an HTTP query endpoint
//! (serverless driver style): one POST per parameterized statement, JSON in
//! and out. [`client`] normalizes the driver's variable row shapes through
//! `bindery_core::rows` before [`queries`] maps them onto typed rows.

pub mod client;
pub mod models;
pub mod queries;

pub use client::Database;
