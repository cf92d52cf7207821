//! # Play Grade API Server
//!
//! Actix-web application for the Play Grade community: accounts, posts with
//! images, replies, likes and follows. The binary in `main.rs` wires this
//! library to a listening socket.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod telemetry;
