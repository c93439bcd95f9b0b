/// Lodestone - Yggdrasil-compatible authentication and session server
///
/// Issues and validates access tokens, resolves accounts to game profiles and
/// runs the join/hasJoined handshake between game clients and servers.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod metrics;
pub mod profile;
pub mod rate_limit;
pub mod server;
pub mod session;
pub mod texture_store;
pub mod token;

#[cfg(test)]
mod testing;
