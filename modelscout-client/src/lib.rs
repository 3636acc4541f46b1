//! Modelscout - Ollama client and capability resolver.
//!
//! A thin, stateless façade over a local Ollama-style inference server:
//! liveness probe, model listing and metadata, text generation, chat and
//! embeddings (streaming and non-streaming), plus capability
//! classification of the locally available models.
//!
//! Every public operation is one independent network exchange; nothing is
//! cached, retried or shared between calls.

pub mod client;
pub mod config;
pub mod error;
pub mod resolver;
pub mod stream;

pub use client::{OllamaClient, ServerStatus};
pub use config::Config;
pub use error::{Error, Result};
pub use resolver::CapabilityResolver;
pub use stream::ChunkStream;
