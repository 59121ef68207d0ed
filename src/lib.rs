//! Backend and client-side sync library for duo-battle minesweeper
//! matches.
//!
//! The server side exposes a REST surface plus a per-match SSE change
//! feed over a pluggable [`dao::match_store::MatchStore`]. The
//! [`sync`] module holds the logic each client runs locally: board
//! generation, record reconciliation, countdown synchronisation and
//! the host handover protocol.

pub mod board;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
