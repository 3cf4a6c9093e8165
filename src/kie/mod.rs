pub mod image_client;
pub mod transport;

pub use image_client::{fallback_image_url, ImageClient, FALLBACK_BASE_URL};
pub use transport::{HttpTransport, KieTransport};

use crate::config::{KieConfig, PollConfig};

/// Facade over the Kie.ai clients. Only image generation is wired today; the
/// accessor layout leaves room for the other task-based endpoints.
#[derive(Clone)]
pub struct KieClient {
    image_client: ImageClient,
}

impl KieClient {
    pub fn new(config: KieConfig, poll: PollConfig) -> Self {
        Self {
            image_client: ImageClient::new(config, poll),
        }
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }
}
