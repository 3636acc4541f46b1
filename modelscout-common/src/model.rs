//! Model descriptors as reported by the inference server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One model known to the server, as returned by the listing endpoint.
///
/// A listing is a full snapshot: `name` is unique within it but carries no
/// identity across calls, since the server can rename or retag models
/// between listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    /// Content hash. Display and debugging only, not an identity.
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details: Option<ModelDetails>,
    /// Capability strings, on servers that report them in the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<Vec<String>>,
}

/// Metadata block nested inside a listing entry. Every field is optional;
/// older servers omit the whole block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub families: Option<Vec<String>>,
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

/// Extended metadata for a single model, beyond what the listing carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Prompt template the model was packaged with.
    #[serde(default)]
    pub template: Option<String>,
    /// Default system prompt, if the model defines one.
    #[serde(default)]
    pub system: Option<String>,
    /// Raw parameter listing from the model configuration.
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default)]
    pub modelfile: Option<String>,
    #[serde(default)]
    pub details: Option<ModelDetails>,
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
}
