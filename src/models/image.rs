use serde::{Deserialize, Serialize};

/// Optional knobs for a single generation job. Unset fields fall back to the
/// defaults the upstream API expects (1024x1024, one variant, no enhance).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageGenerationOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Colon-delimited aspect hint such as "1:1" or "16:9", used when the API
    /// rejects explicit pixel sizes.
    pub size: Option<String>,
    pub n_variants: Option<u32>,
    pub is_enhance: Option<bool>,
}

impl ImageGenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_variants(mut self, n_variants: u32) -> Self {
        self.n_variants = Some(n_variants);
        self
    }

    pub fn with_enhance(mut self, is_enhance: bool) -> Self {
        self.is_enhance = Some(is_enhance);
        self
    }
}

/// Every Kie.ai response, for both job creation and status checks, arrives in
/// this envelope. `code == 200` is the only acceptance signal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KieEnvelope {
    pub code: i64,
    pub msg: String,
    pub data: Option<TaskData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskData {
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
    #[serde(rename = "successFlag")]
    pub success_flag: Option<i64>,
    pub progress: Option<String>,
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
    pub response: Option<TaskPayload>,
    pub result_urls: Option<Vec<String>>,
    pub url: Option<UrlValue>,
}

/// Nested success payload. The API has shipped both casings of the URL list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskPayload {
    #[serde(rename = "resultUrls")]
    pub result_urls_camel: Option<Vec<String>>,
    pub result_urls: Option<Vec<String>>,
}

/// `url` has been observed both as a bare string and as an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UrlValue {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Success,
    Failed,
}

impl TaskStatus {
    /// Unknown flags keep the poll loop going rather than aborting.
    pub fn from_flag(flag: Option<i64>) -> Self {
        match flag {
            Some(1) => TaskStatus::Success,
            Some(2) => TaskStatus::Failed,
            _ => TaskStatus::Running,
        }
    }
}

/// Ordered extraction strategies for the result locator. The upstream payload
/// shape is inconsistent, so each known shape is a tagged probe tried in
/// priority order; new shapes get a new variant, not new control flow.
#[derive(Debug, Clone, Copy)]
pub enum UrlProbe {
    ResponseCamel,
    ResponseSnake,
    TopLevel,
    BareUrl,
}

impl UrlProbe {
    pub const PRIORITY: [UrlProbe; 4] = [
        UrlProbe::ResponseCamel,
        UrlProbe::ResponseSnake,
        UrlProbe::TopLevel,
        UrlProbe::BareUrl,
    ];

    pub fn extract(&self, data: &TaskData) -> Option<String> {
        let first_non_empty = |urls: &Option<Vec<String>>| {
            urls.as_ref()
                .and_then(|list| list.iter().find(|u| !u.is_empty()).cloned())
        };

        match self {
            UrlProbe::ResponseCamel => data
                .response
                .as_ref()
                .and_then(|payload| first_non_empty(&payload.result_urls_camel)),
            UrlProbe::ResponseSnake => data
                .response
                .as_ref()
                .and_then(|payload| first_non_empty(&payload.result_urls)),
            UrlProbe::TopLevel => first_non_empty(&data.result_urls),
            UrlProbe::BareUrl => match &data.url {
                Some(UrlValue::One(url)) if !url.is_empty() => Some(url.clone()),
                Some(UrlValue::Many(urls)) => {
                    urls.iter().find(|u| !u.is_empty()).cloned()
                }
                _ => None,
            },
        }
    }
}

/// Why a generation call ended on the placeholder path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    MissingCredential,
    SubmissionRejected,
    TransportFailure,
    PayloadMalformed,
    TaskFailed,
    Timeout,
}

/// Tagged outcome of one generation call. The compat-shaped `generate`
/// collapses this to the bare URL; callers that want provenance use
/// `generate_detailed`.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub url: String,
    pub from_fallback: bool,
    pub reason: Option<FallbackReason>,
}
