#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod golemio;
pub mod logging;
pub mod map;
pub mod poller;
pub mod route_table;
pub mod server;
pub mod state;

pub use error::{Error, Result};
