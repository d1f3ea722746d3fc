mod message;
mod sampling;
mod usage;

pub use message::{ChatMessage, Role};
pub use sampling::{ProviderInput, SamplingConfig, SamplingOverrides};
pub use usage::TokenUsage;
