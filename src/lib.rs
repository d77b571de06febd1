#![warn(missing_docs)]
//! Thorax is a client for a smart-contract monitoring backend: it keeps
//! local views of registered contracts, detected events and the live log
//! stream, and runs user actions against the backend.

pub mod actions;
pub mod cmd;
pub mod config;
pub mod display;
pub mod http_client;
pub mod models;
pub mod test_helpers;
pub mod transport;
pub mod views;
