//! Capability resolver: classified and grouped views over the model list.

use modelscout_common::{classify, Capability, CapabilityIndex, ModelDescriptor, TaggedModel};

use crate::client::OllamaClient;
use crate::error::{Error, Result};

/// Classified views over the server's current model list.
///
/// Every operation re-fetches the listing and classifies it from scratch;
/// nothing is cached between calls. Failures from the underlying listing
/// propagate unchanged; the resolver adds no failure modes of its own
/// beyond rejecting unknown capability names.
#[derive(Debug, Clone)]
pub struct CapabilityResolver {
    client: OllamaClient,
}

impl CapabilityResolver {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &OllamaClient {
        &self.client
    }

    /// Every known model annotated with its full tag set.
    pub async fn models_with_capabilities(&self) -> Result<Vec<TaggedModel>> {
        let models = self.client.list_models().await?;
        Ok(models
            .into_iter()
            .map(|model| {
                let capabilities = classify(&model.name, model.capabilities.as_deref());
                TaggedModel {
                    model,
                    capabilities,
                }
            })
            .collect())
    }

    /// Only the models carrying `capability`.
    pub async fn list_by_capability(&self, capability: Capability) -> Result<Vec<ModelDescriptor>> {
        let tagged = self.models_with_capabilities().await?;
        Ok(tagged
            .into_iter()
            .filter(|entry| entry.capabilities.contains(&capability))
            .map(|entry| entry.model)
            .collect())
    }

    /// String-keyed variant of [`list_by_capability`].
    ///
    /// A name outside the closed tag set is an error, never an empty
    /// success. The check runs before any network call.
    ///
    /// [`list_by_capability`]: CapabilityResolver::list_by_capability
    pub async fn list_by_capability_named(&self, capability: &str) -> Result<Vec<ModelDescriptor>> {
        let capability = Capability::from_str(capability)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown capability: {}", capability)))?;
        self.list_by_capability(capability).await
    }

    /// Fetch the listing once, classify every entry and return the full
    /// grouped structure with summary counts. One listing round trip per
    /// call; meant to be called once per view render, not once per model.
    pub async fn build_index(&self) -> Result<CapabilityIndex> {
        let models = self.client.list_models().await?;
        Ok(CapabilityIndex::build(models))
    }
}
