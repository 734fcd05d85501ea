//! Built-in model catalog and descriptors for the dynamic families.
//!
//! Catalog order is the order users see models listed in: the primary
//! hosted models, then every Ollama and OpenAI-compatible model, then the
//! preview models.

use scribe_types::llm::{CapabilityDescriptor, DynamicModelSpec, ProviderKind};

/// A hosted model known at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostedModel {
    pub id: &'static str,
    /// Name the backend expects in the request body.
    pub model_code: &'static str,
    pub kind: ProviderKind,
    pub display_name: &'static str,
    pub description: &'static str,
    pub traits: &'static str,
    pub accepts_images: bool,
    pub context_length: u32,
}

impl HostedModel {
    pub fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor {
            id: self.id.to_string(),
            display_name: self.display_name.to_string(),
            description: self.description.to_string(),
            traits: self.traits.to_string(),
            accepts_images: self.accepts_images,
            context_length: self.context_length,
            supports_json: true,
        }
    }
}

/// Listed before the dynamic families.
pub const PRIMARY_MODELS: &[HostedModel] = &[
    HostedModel {
        id: "gpt-4",
        model_code: "gpt-4",
        kind: ProviderKind::OpenAi,
        display_name: "GPT-4",
        description: "GPT-4 is among the most powerful models of intelligence on the planet.",
        traits: "Smart",
        accepts_images: false,
        context_length: 8_192,
    },
    HostedModel {
        id: "gpt-4o-mini",
        model_code: "gpt-4o-mini",
        kind: ProviderKind::OpenAi,
        display_name: "GPT-4o Mini",
        description: "GPT 4o mini is slim and fast.",
        traits: "Fast",
        accepts_images: true,
        context_length: 128_000,
    },
    HostedModel {
        id: "gpt-4-turbo",
        model_code: "gpt-4-turbo",
        kind: ProviderKind::OpenAi,
        display_name: "GPT-4 Turbo",
        description: "GPT 4 Turbo sits between 3.5 and 4 for speed and intelligence, so some argue that it is faster than 4.",
        traits: "Smart and Fast",
        accepts_images: true,
        context_length: 128_000,
    },
    HostedModel {
        id: "claude-3-opus",
        model_code: "claude-3-opus-latest",
        kind: ProviderKind::Anthropic,
        display_name: "Claude 3 Opus",
        description: "Released in early 2024, Opus was the first broadly available non-OpenAI model to rival GPT-4 in intelligence.",
        traits: "Smart",
        accepts_images: true,
        context_length: 200_000,
    },
    HostedModel {
        id: "claude-3-5-sonnet",
        model_code: "claude-3-5-sonnet-20240620",
        kind: ProviderKind::Anthropic,
        display_name: "Claude 3.5 Sonnet",
        description: "It is powerful iteration of the intermediate level model in the latest Claude 3.5 lineup, rivaling GPT-4o. It is especially good for writing code.",
        traits: "Coding",
        accepts_images: true,
        context_length: 200_000,
    },
    HostedModel {
        id: "gpt-4o",
        model_code: "gpt-4o",
        kind: ProviderKind::OpenAi,
        display_name: "GPT-4o",
        description: "GPT-4o is a flagship model from OpenAI, which is very fast, very smart, and natively multimodal.",
        traits: "Very Smart and Fast",
        accepts_images: true,
        context_length: 128_000,
    },
];

/// Listed after the dynamic families.
pub const PREVIEW_MODELS: &[HostedModel] = &[
    HostedModel {
        id: "o1-preview",
        model_code: "o1-preview",
        kind: ProviderKind::OpenAi,
        display_name: "O1 Preview",
        description: "O1 is an experimental, slow, but highlly intelligent model by OpenAI.",
        traits: "Slow and Smart",
        accepts_images: true,
        context_length: 128_000,
    },
    HostedModel {
        id: "o1-mini",
        model_code: "o1-mini",
        kind: ProviderKind::OpenAi,
        display_name: "O1 Mini",
        description: "O1 Mini is an experimental, slow, but highlly intelligent model by OpenAI. It is smaller and faster than O1 Preview.",
        traits: "Slow and Smart",
        accepts_images: true,
        context_length: 128_000,
    },
];

pub fn ollama_descriptor(spec: &DynamicModelSpec) -> CapabilityDescriptor {
    CapabilityDescriptor {
        id: format!("{}-ollama", spec.code),
        display_name: spec.code.clone(),
        description: format!("{} is an open source edge model run via Ollama.", spec.code),
        traits: "Open Source".to_string(),
        accepts_images: spec.vision,
        context_length: spec.context_length,
        supports_json: true,
    }
}

pub fn compatible_descriptor(spec: &DynamicModelSpec) -> CapabilityDescriptor {
    CapabilityDescriptor {
        id: format!("{}-oai-compatible", spec.code),
        display_name: spec.code.clone(),
        description: format!("{} is running via an OpenAI Compatible API", spec.code),
        traits: "API".to_string(),
        accepts_images: spec.vision,
        context_length: spec.context_length,
        supports_json: true,
    }
}
