//! Dealbook - deal and listing browser
//!
//! Deals and dataset listings live in a document store. The REST server adds
//! travel-distance lookups and LLM summaries on top; the terminal client and
//! the bulk loader are thin layers over the same library.

pub mod cli;
pub mod config;
pub mod ingest;
pub mod models;
pub mod server;
pub mod services;
pub mod store;
