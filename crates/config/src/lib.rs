//! Provider configuration for the content-generation adapter.
//!
//! The adapter does not read the environment itself. The embedder collects the
//! raw, environment-sourced values into [`RawProviderSettings`] and the active
//! [`AuthVariant`], and [`ProviderConfig::resolve`] turns them into an
//! immutable configuration: endpoint, credential, default model and the
//! ordered fallback-model list.

mod error;
mod models;

use std::fmt;

use secrecy::SecretString;
use serde::Deserialize;

pub use error::Error;
pub use models::{
    DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_FALLBACK_MODELS, DEFAULT_OPENAI_MODEL, DEFAULT_SILICONFLOW_BASE_URL,
    DEFAULT_SILICONFLOW_MODEL,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Authentication variant selected by the embedder.
///
/// The core trusts this value; credential entry and validation UI live
/// outside the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AuthVariant {
    /// SiliconFlow's hosted OpenAI-compatible API. Ships with a built-in
    /// default key and a single default model, and never retries by model
    /// swap: the fallback list for this variant is always empty.
    #[serde(rename = "siliconflow-api-key")]
    SiliconFlow,

    /// A generic OpenAI-compatible endpoint. Requires an explicit API key and
    /// honors an operator-supplied fallback-model list.
    #[serde(rename = "openai-compatible-api-key")]
    OpenAiCompatible,
}

impl fmt::Display for AuthVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthVariant::SiliconFlow => f.write_str("siliconflow-api-key"),
            AuthVariant::OpenAiCompatible => f.write_str("openai-compatible-api-key"),
        }
    }
}

/// Raw provider settings, conceptually environment-sourced.
///
/// Every field is optional; [`ProviderConfig::resolve`] applies per-variant
/// defaults. `fallback_models` stays in its raw comma-delimited form here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RawProviderSettings {
    /// API key for the selected endpoint.
    pub api_key: Option<String>,
    /// Base endpoint, with or without a trailing `/v1`.
    pub base_url: Option<String>,
    /// Model used when a request names none.
    pub default_model: Option<String>,
    /// Comma-delimited fallback models, tried in order after a retryable
    /// failure of the requested model.
    pub fallback_models: Option<String>,
}

/// Resolved provider configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub default_model: String,
    pub fallback_models: Vec<String>,
}

impl ProviderConfig {
    /// Resolve raw settings under the given auth variant.
    ///
    /// Fails with [`Error::MissingCredential`] when the variant requires an
    /// explicit key and none was supplied. This is the only validation the
    /// adapter performs before issuing network requests.
    pub fn resolve(variant: AuthVariant, settings: RawProviderSettings) -> Result<Self> {
        match variant {
            AuthVariant::SiliconFlow => Ok(Self {
                api_key: SecretString::from(
                    settings
                        .api_key
                        .filter(|key| !key.is_empty())
                        .unwrap_or_else(|| models::DEFAULT_SILICONFLOW_API_KEY.to_string()),
                ),
                base_url: settings
                    .base_url
                    .unwrap_or_else(|| DEFAULT_SILICONFLOW_BASE_URL.to_string()),
                default_model: settings
                    .default_model
                    .unwrap_or_else(|| DEFAULT_SILICONFLOW_MODEL.to_string()),
                // Fallback is an explicit opt-in, and SiliconFlow opts out.
                fallback_models: Vec::new(),
            }),
            AuthVariant::OpenAiCompatible => {
                let api_key = settings
                    .api_key
                    .filter(|key| !key.is_empty())
                    .ok_or(Error::MissingCredential {
                        credential: "OPENAI_API_KEY",
                        variant,
                    })?;

                Ok(Self {
                    api_key: SecretString::from(api_key),
                    base_url: settings.base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
                    default_model: settings.default_model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                    fallback_models: settings
                        .fallback_models
                        .as_deref()
                        .map(parse_model_list)
                        .unwrap_or_else(|| {
                            DEFAULT_OPENAI_FALLBACK_MODELS
                                .iter()
                                .map(|model| model.to_string())
                                .collect()
                        }),
                })
            }
        }
    }
}

/// Parse a comma-delimited model list, trimming surrounding whitespace and
/// dropping empty entries.
pub fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(ToString::to_string)
        .collect()
}
