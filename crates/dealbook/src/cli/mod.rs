//! Terminal client for the dealbook REST API

pub mod client;
pub mod commands;
pub mod display;

pub use client::{ClientConfig, ClientError, DealbookClient};
