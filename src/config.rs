use std::env;
use std::time::Duration;

pub const DEFAULT_KIE_BASE_URL: &str = "https://api.kie.ai/api/v1/gpt4o-image";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct KieConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// Fixed-interval polling budget for asynchronous generation tasks.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub kie: Option<KieConfig>,
    pub gemini: Option<GeminiConfig>,
    pub poll: PollConfig,
}

impl Default for KieConfig {
    fn default() -> Self {
        KieConfig {
            api_key: None,
            base_url: None,
        }
    }
}

impl KieConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dashboard historically shipped the key under a Vite-prefixed
    /// variable, so both spellings are accepted.
    pub fn from_env() -> Self {
        let api_key = env::var("KIE_API_KEY")
            .or_else(|_| env::var("VITE_KIE_API_KEY"))
            .ok();
        let base_url = env::var("KIE_BASE_URL").ok();

        KieConfig { api_key, base_url }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: None,
            model: None,
        }
    }
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok();
        let model = env::var("GEMINI_MODEL").ok();

        GeminiConfig { api_key, model }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        // 60 * 3s, a 3 minute budget per image
        PollConfig {
            interval: Duration::from_secs(3),
            max_attempts: 60,
        }
    }
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kie: None,
            gemini: None,
            poll: PollConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        Config {
            kie: Some(KieConfig::from_env()),
            gemini: Some(GeminiConfig::from_env()),
            poll: PollConfig::default(),
        }
    }

    pub fn with_kie(mut self, config: KieConfig) -> Self {
        self.kie = Some(config);
        self
    }

    pub fn with_gemini(mut self, config: GeminiConfig) -> Self {
        self.gemini = Some(config);
        self
    }

    pub fn with_poll(mut self, config: PollConfig) -> Self {
        self.poll = config;
        self
    }
}
