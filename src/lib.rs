//! Shoplite - grounded customer support assistant
//!
//! An HTTP service that answers storefront support questions from a small,
//! fixed knowledge base, and exposes the underlying language model for raw
//! text generation.
//!
//! # Overview
//!
//! Every question is embedded and compared against the knowledge base. Only
//! documents within a distance threshold are handed to the model as context;
//! when none qualify the service replies with a fixed fallback instead of
//! letting the model guess. Each answer carries the titles of its sources and
//! a coarse confidence label derived from the closest distance.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `knowledge` - The static document collection
//! - `embedding` - Embedding backends
//! - `index` - Exact nearest-neighbour search over document vectors
//! - `generation` - Text generation backends and the device gate
//! - `rag` - Retrieval gate, confidence labels and answer composition
//! - `service` - Shared state behind the HTTP endpoints
//! - `cli` - Command-line interface and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use shoplite::config::Settings;
//! use shoplite::service::ServiceContext;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = ServiceContext::new(Settings::load()?).await?;
//!
//!     let answer = ctx.chat("How long do I have to return an item?").await?;
//!     println!("{} ({}, from {:?})", answer.answer, answer.confidence, answer.sources);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod knowledge;
pub mod ollama;
pub mod openai;
pub mod rag;
pub mod service;

#[cfg(test)]
mod testing;

pub use error::{Result, ShopliteError};
