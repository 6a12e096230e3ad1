use async_trait::async_trait;
use std::fmt::Debug;

/// Observes every prompt sent to the generation backend and the raw text it returned.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, topic: &str, prompt: &str, response: &str) -> std::io::Result<()>;
}

pub mod file;
pub use file::FileInterceptor;
