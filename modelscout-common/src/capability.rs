//! Capability tags and the name-based classification rules.

use serde::{Deserialize, Serialize};

use crate::model::ModelDescriptor;

/// What a local model can do.
///
/// Tags are not mutually exclusive: a single model may carry several
/// (e.g. a tool-calling chat model gets both `tools` and `chat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Text embedding models for vector representations
    Embedding,
    /// Vision/image processing models
    Vision,
    /// Function/tool calling models
    Tools,
    /// Reasoning/thinking models
    Thinking,
    /// General-purpose chat models, the default assumption
    Chat,
}

impl Capability {
    /// All capability variants, in classification output order.
    pub const ALL: [Capability; 5] = [
        Capability::Embedding,
        Capability::Vision,
        Capability::Tools,
        Capability::Thinking,
        Capability::Chat,
    ];

    /// Parse a capability name.
    ///
    /// Returns `None` for anything outside the closed set; callers decide
    /// whether that is an error.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "embedding" => Some(Self::Embedding),
            "vision" => Some(Self::Vision),
            "tools" => Some(Self::Tools),
            "thinking" => Some(Self::Thinking),
            "chat" => Some(Self::Chat),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::Vision => "vision",
            Self::Tools => "tools",
            Self::Thinking => "thinking",
            Self::Chat => "chat",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Family markers checked against the lowercased model name.
///
/// `Tools` has no reliable name marker and is only ever taken from
/// server-reported metadata.
const NAME_RULES: &[(&str, Capability)] = &[
    ("embed", Capability::Embedding),
    ("minilm", Capability::Embedding),
    ("bge", Capability::Embedding),
    ("vision", Capability::Vision),
    ("llava", Capability::Vision),
    ("moondream", Capability::Vision),
    ("r1", Capability::Thinking),
    ("think", Capability::Thinking),
    ("reason", Capability::Thinking),
];

/// Map a capability string reported by the server onto a tag.
///
/// Servers name these slightly differently than we do ("completion" for
/// plain chat); unknown strings are dropped so only the closed set ever
/// surfaces.
fn from_reported(s: &str) -> Option<Capability> {
    match s.to_lowercase().as_str() {
        "embedding" | "embed" => Some(Capability::Embedding),
        "vision" => Some(Capability::Vision),
        "tools" => Some(Capability::Tools),
        "thinking" => Some(Capability::Thinking),
        "chat" | "completion" => Some(Capability::Chat),
        _ => None,
    }
}

/// Classify a model into its capability tags.
///
/// Server-reported capabilities win when they yield at least one known
/// tag. Otherwise the model name is matched against the rule table, with
/// `chat` as the fallback for anything that is neither an embedding nor a
/// vision family. Tags come out deduplicated, in [`Capability::ALL`] order.
pub fn classify(name: &str, reported: Option<&[String]>) -> Vec<Capability> {
    if let Some(reported) = reported {
        let mut tags: Vec<Capability> = Vec::new();
        for tag in reported.iter().filter_map(|s| from_reported(s)) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if !tags.is_empty() {
            sort_tags(&mut tags);
            return tags;
        }
    }

    let lower = name.to_lowercase();
    let mut tags: Vec<Capability> = Vec::new();
    for (fragment, tag) in NAME_RULES {
        if lower.contains(fragment) && !tags.contains(tag) {
            tags.push(*tag);
        }
    }
    if !tags.contains(&Capability::Embedding) && !tags.contains(&Capability::Vision) {
        tags.push(Capability::Chat);
    }
    sort_tags(&mut tags);
    tags
}

fn sort_tags(tags: &mut [Capability]) {
    tags.sort_by_key(|tag| Capability::ALL.iter().position(|c| c == tag));
}

/// One model annotated with its full tag set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedModel {
    pub model: ModelDescriptor,
    pub capabilities: Vec<Capability>,
}

/// Models grouped by capability, with per-tag counts.
///
/// Derived and ephemeral: rebuilt in full from one listing snapshot,
/// never updated incrementally. A model with several tags appears in
/// every matching group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CapabilityIndex {
    pub embedding: Vec<ModelDescriptor>,
    pub vision: Vec<ModelDescriptor>,
    pub tools: Vec<ModelDescriptor>,
    pub thinking: Vec<ModelDescriptor>,
    pub chat: Vec<ModelDescriptor>,
    pub summary: CapabilitySummary,
}

/// Count-per-tag summary of a [`CapabilityIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySummary {
    pub total_models: usize,
    pub embedding_count: usize,
    pub vision_count: usize,
    pub tools_count: usize,
    pub thinking_count: usize,
    pub chat_count: usize,
}

impl CapabilityIndex {
    /// Build the full grouped view from one listing snapshot, classifying
    /// every entry in a single pass.
    pub fn build(models: Vec<ModelDescriptor>) -> Self {
        let mut index = CapabilityIndex {
            summary: CapabilitySummary {
                total_models: models.len(),
                ..CapabilitySummary::default()
            },
            ..CapabilityIndex::default()
        };

        for model in models {
            let tags = classify(&model.name, model.capabilities.as_deref());
            for tag in tags {
                index.group_mut(tag).push(model.clone());
            }
        }

        index.summary.embedding_count = index.embedding.len();
        index.summary.vision_count = index.vision.len();
        index.summary.tools_count = index.tools.len();
        index.summary.thinking_count = index.thinking.len();
        index.summary.chat_count = index.chat.len();
        index
    }

    /// The models carrying `capability`.
    pub fn models_for(&self, capability: Capability) -> &[ModelDescriptor] {
        match capability {
            Capability::Embedding => &self.embedding,
            Capability::Vision => &self.vision,
            Capability::Tools => &self.tools,
            Capability::Thinking => &self.thinking,
            Capability::Chat => &self.chat,
        }
    }

    fn group_mut(&mut self, capability: Capability) -> &mut Vec<ModelDescriptor> {
        match capability {
            Capability::Embedding => &mut self.embedding,
            Capability::Vision => &mut self.vision,
            Capability::Tools => &mut self.tools,
            Capability::Thinking => &mut self.thinking,
            Capability::Chat => &mut self.chat,
        }
    }
}
