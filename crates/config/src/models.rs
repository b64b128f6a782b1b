//! Built-in model and endpoint defaults per auth variant.

pub const DEFAULT_SILICONFLOW_BASE_URL: &str = "https://api.siliconflow.cn";
pub const DEFAULT_SILICONFLOW_MODEL: &str = "THUDM/GLM-4-9B-0414";

/// Shared community key used when the operator supplies none. Heavily rate
/// limited upstream; real deployments should set their own.
pub(crate) const DEFAULT_SILICONFLOW_API_KEY: &str = "sk-ybhnlsuxeobtrbijnowwrvloegnguaihmjvervuhqqzrhzqm";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_FALLBACK_MODELS: &[&str] = &["gpt-4-turbo", "gpt-3.5-turbo"];
