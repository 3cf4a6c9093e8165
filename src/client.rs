use crate::{
    config::Config,
    gemini::IdeasClient,
    kie::{ImageClient, KieClient},
};

/// Facade bundling the generation clients the planner UI calls into. Missing
/// credentials never make construction fail; the affected client degrades to
/// its fallback behavior instead.
#[derive(Clone)]
pub struct GenClient {
    kie_client: KieClient,
    ideas_client: IdeasClient,
}

impl GenClient {
    pub fn new(config: Config) -> Self {
        let kie_config = config.kie.unwrap_or_default();
        let gemini_config = config.gemini.unwrap_or_default();

        Self {
            kie_client: KieClient::new(kie_config, config.poll.clone()),
            ideas_client: IdeasClient::new(gemini_config),
        }
    }

    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    pub fn image(&self) -> &ImageClient {
        self.kie_client.image()
    }

    pub fn ideas(&self) -> &IdeasClient {
        &self.ideas_client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_client_still_answers() {
        let client = GenClient::new(Config::new());

        let url = client.image().generate("a majestic lion", None).await;
        assert!(url.contains("majestic%2Clion"));

        let ideas = client.ideas().generate_content_ideas("Fitness", "reach").await;
        assert!(ideas.is_empty());
    }
}
