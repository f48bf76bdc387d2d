pub mod deepseek;
pub mod error;
pub mod http;
pub mod mock;
pub mod types;

pub use deepseek::DeepSeekProvider;
pub use error::ProviderError;
pub use types::{ApiKey, BaseUrl, ModelId};
