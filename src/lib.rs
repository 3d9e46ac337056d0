//! Konfess backend: anonymous confession relay over Telegram.
//!
//! The crate is split along the seams of the system: `db` owns SQLite
//! persistence, `auth` owns credentials, tokens and OTP sessions, `bot`
//! owns the Telegram side (transport, commands, relay, broadcast), `api`
//! exposes the REST surface, and `storage` holds uploaded media in
//! S3-compatible object storage.

/// REST API: routing, middleware, handlers
pub mod api;
/// Credentials, JWT pairs, and the OTP flow
pub mod auth;
/// Telegram transport, command dispatch, relay and broadcast
pub mod bot;
/// Layered configuration
pub mod config;
/// SQLite persistence
pub mod db;
/// Error taxonomy and reporting
pub mod error;
/// S3-compatible media storage
pub mod storage;
/// MarkdownV2 escaping and URI encoding helpers
pub mod utils;
