pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod kie;
pub mod logger;
pub mod models;
pub mod prompt;

pub use client::GenClient;
pub use config::{Config, GeminiConfig, KieConfig, PollConfig};
pub use error::{GenError, Result};
pub use gemini::IdeasClient;
pub use kie::{fallback_image_url, ImageClient, KieClient, KieTransport};
pub use models::{
    ContentIdea, FallbackReason, GeneratedImage, ImageGenerationOptions, TaskStatus,
};
pub use prompt::create_image_prompt;
