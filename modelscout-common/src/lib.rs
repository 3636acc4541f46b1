//! Modelscout Common Types
//!
//! Shared types used by the Ollama client and the capability resolver.

pub mod capability;
pub mod inference;
pub mod model;

pub use capability::{
    classify, Capability, CapabilityIndex, CapabilitySummary, TaggedModel,
};
pub use inference::{
    ChatMessage, ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, GenerateOptions,
    GenerateRequest, GenerateResponse, TimingStats,
};
pub use model::{ModelDescriptor, ModelDetails, ModelInfo};
