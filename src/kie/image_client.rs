use crate::{
    config::{KieConfig, PollConfig, DEFAULT_KIE_BASE_URL},
    error::{GenError, Result},
    kie::transport::{HttpTransport, KieTransport},
    models::{FallbackReason, GeneratedImage, ImageGenerationOptions, TaskStatus, UrlProbe},
};
use serde_json::json;
use std::sync::Arc;
use tokio::time::sleep;

pub const FALLBACK_BASE_URL: &str = "https://placehold.co/800x600/e2e8f0/475569";

const DEFAULT_WIDTH: u32 = 1024;
const DEFAULT_HEIGHT: u32 = 1024;
const DEFAULT_VARIANTS: u32 = 1;

/// Client for the Kie.ai two-phase image generation API: submit a job, poll
/// its record until a terminal flag or the attempt budget runs out.
///
/// The public operations are total. A broken generator must never block the
/// editing flow, so every failure mode resolves to a deterministic
/// placeholder URL instead of an error.
#[derive(Clone)]
pub struct ImageClient {
    transport: Option<Arc<dyn KieTransport>>,
    poll: PollConfig,
}

impl ImageClient {
    /// Builds the client from configuration. A missing API key is accepted;
    /// generation then short-circuits to the placeholder path without any
    /// network traffic.
    pub fn new(config: KieConfig, poll: PollConfig) -> Self {
        let transport = config.api_key.as_ref().map(|api_key| {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_KIE_BASE_URL.to_string());
            Arc::new(HttpTransport::new(base_url, api_key.clone())) as Arc<dyn KieTransport>
        });

        Self { transport, poll }
    }

    /// Wires in an alternate transport. Tests use this with a scripted fake.
    pub fn with_transport(transport: Arc<dyn KieTransport>, poll: PollConfig) -> Self {
        Self {
            transport: Some(transport),
            poll,
        }
    }

    /// Generates one image and returns a usable URL in every case. Collapses
    /// the tagged outcome of [`generate_detailed`](Self::generate_detailed).
    pub async fn generate(
        &self,
        prompt: &str,
        options: Option<ImageGenerationOptions>,
    ) -> String {
        self.generate_detailed(prompt, options).await.url
    }

    /// Same flow as [`generate`](Self::generate) but keeps the provenance of
    /// the URL: whether it came from the API or the placeholder path, and why.
    pub async fn generate_detailed(
        &self,
        prompt: &str,
        options: Option<ImageGenerationOptions>,
    ) -> GeneratedImage {
        let transport = match &self.transport {
            Some(transport) => Arc::clone(transport),
            None => {
                log::warn!("⚠️  KIE_API_KEY not configured, using placeholder image");
                return fallback_image(prompt, FallbackReason::MissingCredential);
            }
        };

        let options = options.unwrap_or_default();
        match self.run_generation(transport.as_ref(), prompt, &options).await {
            Ok(url) => {
                log::info!("✅ Image generated successfully: {}", url);
                GeneratedImage {
                    url,
                    from_fallback: false,
                    reason: None,
                }
            }
            Err(e) => {
                log::error!("❌ Image generation failed: {}", e);
                fallback_image(prompt, FallbackReason::from_error(&e))
            }
        }
    }

    /// Fans out one generation task per prompt and joins them in input order.
    /// A task the runtime loses (panicked join) degrades to the placeholder
    /// derivation for that prompt; the output always matches the input length.
    pub async fn generate_multiple(
        &self,
        prompts: &[String],
        options: Option<ImageGenerationOptions>,
    ) -> Vec<String> {
        let handles: Vec<_> = prompts
            .iter()
            .map(|prompt| {
                let client = self.clone();
                let prompt = prompt.clone();
                let options = options.clone();
                tokio::spawn(async move { client.generate(&prompt, options).await })
            })
            .collect();

        let mut urls = Vec::with_capacity(prompts.len());
        for (joined, prompt) in futures::future::join_all(handles)
            .await
            .into_iter()
            .zip(prompts)
        {
            match joined {
                Ok(url) => urls.push(url),
                Err(e) => {
                    log::error!("❌ Generation task for '{}' was lost: {}", prompt, e);
                    urls.push(fallback_image_url(prompt));
                }
            }
        }

        urls
    }

    async fn run_generation(
        &self,
        transport: &dyn KieTransport,
        prompt: &str,
        options: &ImageGenerationOptions,
    ) -> Result<String> {
        log::info!("🎨 Generating image with Kie.ai: {}", prompt);

        let task_id = self.submit(transport, prompt, options).await?;
        log::info!("📋 Task created: {}", task_id);

        self.poll_task(transport, &task_id).await
    }

    /// Create-job call. `code == 200` is the only acceptance signal; a
    /// size-format complaint gets one compatibility resubmission with a
    /// colon-delimited aspect string instead of explicit pixel dimensions.
    async fn submit(
        &self,
        transport: &dyn KieTransport,
        prompt: &str,
        options: &ImageGenerationOptions,
    ) -> Result<String> {
        let n_variants = options.n_variants.unwrap_or(DEFAULT_VARIANTS);
        let is_enhance = options.is_enhance.unwrap_or(false);

        let payload = json!({
            "prompt": prompt,
            "width": options.width.unwrap_or(DEFAULT_WIDTH),
            "height": options.height.unwrap_or(DEFAULT_HEIGHT),
            "nVariants": n_variants,
            "isEnhance": is_enhance,
        });

        let mut envelope = transport.create_task(&payload).await?;

        if envelope.code != 200 {
            if !envelope.msg.contains("size error") {
                return Err(GenError::SubmissionError(envelope.msg));
            }

            let aspect = options.size.clone().unwrap_or_else(|| "1:1".to_string());
            log::warn!("⚠️  Pixel size rejected, retrying with aspect {}", aspect);

            let retry_payload = json!({
                "prompt": prompt,
                "size": aspect,
                "nVariants": n_variants,
                "isEnhance": is_enhance,
            });

            envelope = transport.create_task(&retry_payload).await?;
            if envelope.code != 200 {
                return Err(GenError::SubmissionError(envelope.msg));
            }
        }

        envelope
            .data
            .and_then(|data| data.task_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GenError::ResponseError("no task id in create response".into()))
    }

    /// Fixed-interval poll loop. Every iteration consumes exactly one attempt,
    /// whether the fetch fails, the envelope code is not 200, or the task is
    /// still running, so the loop is bounded at `max_attempts` waits.
    async fn poll_task(&self, transport: &dyn KieTransport, task_id: &str) -> Result<String> {
        let max_attempts = self.poll.max_attempts;
        let mut attempts = 0u32;

        while attempts < max_attempts {
            sleep(self.poll.interval).await;
            attempts += 1;

            let envelope = match transport.record_info(task_id).await {
                Ok(envelope) => envelope,
                Err(e) => {
                    log::warn!("⚠️  Status check {}/{} failed: {}", attempts, max_attempts, e);
                    continue;
                }
            };

            if envelope.code != 200 {
                log::warn!(
                    "⚠️  Status check {}/{} returned code {}: {}",
                    attempts,
                    max_attempts,
                    envelope.code,
                    envelope.msg
                );
                continue;
            }

            let data = envelope.data.unwrap_or_default();
            log::info!(
                "⏳ Polling {}/{} - flag: {:?}",
                attempts,
                max_attempts,
                data.success_flag
            );

            match TaskStatus::from_flag(data.success_flag) {
                TaskStatus::Success => {
                    return UrlProbe::PRIORITY
                        .iter()
                        .find_map(|probe| probe.extract(&data))
                        .ok_or_else(|| {
                            GenError::ResponseError(
                                "success flag set but no result url in payload".into(),
                            )
                        });
                }
                TaskStatus::Failed => {
                    return Err(GenError::TaskFailed(
                        data.error_message
                            .unwrap_or_else(|| "image generation failed".to_string()),
                    ));
                }
                TaskStatus::Running => {}
            }
        }

        Err(GenError::Timeout(format!(
            "no terminal status after {} attempts",
            max_attempts
        )))
    }
}

impl FallbackReason {
    fn from_error(error: &GenError) -> Self {
        match error {
            GenError::ConfigError(_) => FallbackReason::MissingCredential,
            GenError::RequestError(_) => FallbackReason::TransportFailure,
            GenError::ResponseError(_) | GenError::SerializationError(_) => {
                FallbackReason::PayloadMalformed
            }
            GenError::SubmissionError(_) => FallbackReason::SubmissionRejected,
            GenError::TaskFailed(_) => FallbackReason::TaskFailed,
            GenError::Timeout(_) => FallbackReason::Timeout,
        }
    }
}

fn fallback_image(prompt: &str, reason: FallbackReason) -> GeneratedImage {
    let url = fallback_image_url(prompt);
    log::info!("🖼️  Using placeholder image: {}", url);
    GeneratedImage {
        url,
        from_fallback: true,
        reason: Some(reason),
    }
}

/// Deterministic placeholder URL embedding up to three keywords from the
/// prompt as display text: lowercased, stripped of punctuation, tokens longer
/// than three characters, first three in original order.
pub fn fallback_image_url(prompt: &str) -> String {
    let cleaned: String = prompt
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let keywords: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|word| word.len() > 3)
        .take(3)
        .collect();

    // Keywords are plain ASCII at this point, so only the joining commas
    // need percent-encoding.
    let text = if keywords.is_empty() {
        "Image".to_string()
    } else {
        keywords.join("%2C")
    };

    format!("{}?text={}", FALLBACK_BASE_URL, text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KieEnvelope, TaskData, TaskPayload};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn test_poll() -> PollConfig {
        PollConfig::new()
            .with_interval(Duration::ZERO)
            .with_max_attempts(60)
    }

    fn accepted(task_id: &str) -> KieEnvelope {
        KieEnvelope {
            code: 200,
            msg: "success".into(),
            data: Some(TaskData {
                task_id: Some(task_id.into()),
                ..Default::default()
            }),
        }
    }

    fn rejected(msg: &str) -> KieEnvelope {
        KieEnvelope {
            code: 422,
            msg: msg.into(),
            data: None,
        }
    }

    fn running() -> KieEnvelope {
        KieEnvelope {
            code: 200,
            msg: "success".into(),
            data: Some(TaskData {
                success_flag: Some(0),
                progress: Some("0.5".into()),
                ..Default::default()
            }),
        }
    }

    fn succeeded(url: &str) -> KieEnvelope {
        KieEnvelope {
            code: 200,
            msg: "success".into(),
            data: Some(TaskData {
                success_flag: Some(1),
                response: Some(TaskPayload {
                    result_urls: Some(vec![url.into()]),
                    ..Default::default()
                }),
                ..Default::default()
            }),
        }
    }

    fn failed(message: &str) -> KieEnvelope {
        KieEnvelope {
            code: 200,
            msg: "success".into(),
            data: Some(TaskData {
                success_flag: Some(2),
                error_message: Some(message.into()),
                ..Default::default()
            }),
        }
    }

    /// Pops scripted envelopes in order; once a queue is exhausted it keeps
    /// answering with acceptance (create) or a still-running record (poll).
    #[derive(Default)]
    struct ScriptedTransport {
        create_responses: Mutex<Vec<Result<KieEnvelope>>>,
        record_responses: Mutex<Vec<Result<KieEnvelope>>>,
        create_payloads: Mutex<Vec<Value>>,
        create_calls: AtomicUsize,
        record_calls: AtomicUsize,
    }

    impl ScriptedTransport {
        fn new(
            create_responses: Vec<Result<KieEnvelope>>,
            record_responses: Vec<Result<KieEnvelope>>,
        ) -> Self {
            Self {
                create_responses: Mutex::new(create_responses),
                record_responses: Mutex::new(record_responses),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl KieTransport for ScriptedTransport {
        async fn create_task(&self, payload: &Value) -> Result<KieEnvelope> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.create_payloads.lock().unwrap().push(payload.clone());

            let mut scripted = self.create_responses.lock().unwrap();
            if scripted.is_empty() {
                Ok(accepted("task-1"))
            } else {
                scripted.remove(0)
            }
        }

        async fn record_info(&self, _task_id: &str) -> Result<KieEnvelope> {
            self.record_calls.fetch_add(1, Ordering::SeqCst);

            let mut scripted = self.record_responses.lock().unwrap();
            if scripted.is_empty() {
                Ok(running())
            } else {
                scripted.remove(0)
            }
        }
    }

    fn scripted_client(transport: &Arc<ScriptedTransport>) -> ImageClient {
        ImageClient::with_transport(
            Arc::clone(transport) as Arc<dyn KieTransport>,
            test_poll(),
        )
    }

    #[tokio::test]
    async fn missing_credential_short_circuits_to_placeholder() {
        let client = ImageClient::new(KieConfig::new(), test_poll());

        let result = client.generate_detailed("a majestic lion", None).await;
        assert!(result.from_fallback);
        assert_eq!(result.reason, Some(FallbackReason::MissingCredential));
        assert!(result.url.contains("majestic%2Clion"));
    }

    #[tokio::test]
    async fn first_poll_success_returns_exact_url() {
        let transport = Arc::new(ScriptedTransport::new(
            vec![Ok(accepted("task-1"))],
            vec![Ok(succeeded("http://x/img.png"))],
        ));
        let client = scripted_client(&transport);

        let result = client.generate_detailed("a red fox", None).await;
        assert_eq!(result.url, "http://x/img.png");
        assert!(!result.from_fallback);
        assert_eq!(transport.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.record_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failure_flag_stops_polling_immediately() {
        let transport = Arc::new(ScriptedTransport::new(
            vec![Ok(accepted("task-1"))],
            vec![Ok(running()), Ok(running()), Ok(failed("boom"))],
        ));
        let client = scripted_client(&transport);

        let result = client.generate_detailed("sunset over hills", None).await;
        assert!(result.from_fallback);
        assert_eq!(result.reason, Some(FallbackReason::TaskFailed));
        // flag 2 on the third poll, so exactly three status calls
        assert_eq!(transport.record_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn attempt_budget_bounds_polling() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(accepted("task-1"))], vec![]));
        let client = scripted_client(&transport);

        let result = client.generate_detailed("city skyline at night", None).await;
        assert!(result.from_fallback);
        assert_eq!(result.reason, Some(FallbackReason::Timeout));
        assert_eq!(transport.record_calls.load(Ordering::SeqCst), 60);
        assert!(result.url.starts_with(FALLBACK_BASE_URL));
    }

    #[tokio::test]
    async fn transport_errors_consume_attempts() {
        let transport = Arc::new(ScriptedTransport::new(
            vec![Ok(accepted("task-1"))],
            vec![
                Err(GenError::RequestError("connection reset".into())),
                Ok(rejected("server busy")),
                Ok(succeeded("http://x/late.png")),
            ],
        ));
        let client = scripted_client(&transport);

        let result = client.generate_detailed("a quiet harbor", None).await;
        assert_eq!(result.url, "http://x/late.png");
        assert_eq!(transport.record_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn size_error_triggers_one_aspect_resubmission() {
        let transport = Arc::new(ScriptedTransport::new(
            vec![
                Ok(rejected("size error: use ratio format")),
                Ok(accepted("task-2")),
            ],
            vec![Ok(succeeded("http://x/sized.png"))],
        ));
        let client = scripted_client(&transport);

        let url = client.generate("portrait of a cat", None).await;
        assert_eq!(url, "http://x/sized.png");
        assert_eq!(transport.create_calls.load(Ordering::SeqCst), 2);

        let payloads = transport.create_payloads.lock().unwrap();
        assert!(payloads[0].get("size").is_none());
        assert_eq!(payloads[0]["width"], 1024);
        assert_eq!(payloads[1]["size"], "1:1");
        assert!(payloads[1].get("width").is_none());
    }

    #[tokio::test]
    async fn non_size_rejection_falls_back_without_retry() {
        let transport = Arc::new(ScriptedTransport::new(
            vec![Ok(rejected("quota exceeded"))],
            vec![],
        ));
        let client = scripted_client(&transport);

        let result = client.generate_detailed("alpine meadow", None).await;
        assert!(result.from_fallback);
        assert_eq!(result.reason, Some(FallbackReason::SubmissionRejected));
        assert_eq!(transport.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.record_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_flag_without_url_is_an_anomaly() {
        let empty_success = KieEnvelope {
            code: 200,
            msg: "success".into(),
            data: Some(TaskData {
                success_flag: Some(1),
                ..Default::default()
            }),
        };
        let transport = Arc::new(ScriptedTransport::new(
            vec![Ok(accepted("task-1"))],
            vec![Ok(empty_success)],
        ));
        let client = scripted_client(&transport);

        let result = client.generate_detailed("foggy forest", None).await;
        assert!(result.from_fallback);
        assert_eq!(result.reason, Some(FallbackReason::PayloadMalformed));
        assert_eq!(transport.record_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn custom_options_reach_the_payload() {
        let transport = Arc::new(ScriptedTransport::new(
            vec![Ok(accepted("task-1"))],
            vec![Ok(succeeded("http://x/wide.png"))],
        ));
        let client = scripted_client(&transport);

        let options = ImageGenerationOptions::new()
            .with_dimensions(1920, 1080)
            .with_variants(2)
            .with_enhance(true);
        client.generate("banner art", Some(options)).await;

        let payloads = transport.create_payloads.lock().unwrap();
        assert_eq!(payloads[0]["width"], 1920);
        assert_eq!(payloads[0]["height"], 1080);
        assert_eq!(payloads[0]["nVariants"], 2);
        assert_eq!(payloads[0]["isEnhance"], true);
    }

    /// Transport that answers instantly but delays the record for prompt "a",
    /// so completion order is the reverse of input order.
    struct EchoTransport;

    #[async_trait]
    impl KieTransport for EchoTransport {
        async fn create_task(&self, payload: &Value) -> Result<KieEnvelope> {
            let prompt = payload["prompt"].as_str().unwrap_or_default();
            Ok(accepted(prompt))
        }

        async fn record_info(&self, task_id: &str) -> Result<KieEnvelope> {
            if task_id == "a" {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(succeeded(&format!("http://img/{}.png", task_id)))
        }
    }

    #[tokio::test]
    async fn generate_multiple_preserves_input_order() {
        let client = ImageClient::with_transport(Arc::new(EchoTransport), test_poll());

        let prompts = vec!["a".to_string(), "b".to_string()];
        let urls = client.generate_multiple(&prompts, None).await;
        assert_eq!(urls, vec!["http://img/a.png", "http://img/b.png"]);
    }

    #[tokio::test]
    async fn generate_multiple_without_credential_maps_every_prompt() {
        let client = ImageClient::new(KieConfig::new(), test_poll());

        let prompts = vec!["a majestic lion".to_string(), "stormy ocean waves".to_string()];
        let urls = client.generate_multiple(&prompts, None).await;
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("majestic%2Clion"));
        assert!(urls[1].contains("stormy%2Cocean%2Cwaves"));
    }

    #[test]
    fn placeholder_url_derivation() {
        assert_eq!(
            fallback_image_url("a majestic lion"),
            format!("{}?text=majestic%2Clion", FALLBACK_BASE_URL)
        );
        // short tokens and punctuation are dropped, first three kept in order
        assert_eq!(
            fallback_image_url("The QUICK, brown fox jumps over lazy dogs!"),
            format!("{}?text=quick%2Cbrown%2Cjumps", FALLBACK_BASE_URL)
        );
        assert_eq!(
            fallback_image_url(""),
            format!("{}?text=Image", FALLBACK_BASE_URL)
        );
        assert_eq!(
            fallback_image_url("a b c?!"),
            format!("{}?text=Image", FALLBACK_BASE_URL)
        );
        // deterministic per prompt
        assert_eq!(
            fallback_image_url("a majestic lion"),
            fallback_image_url("a majestic lion")
        );
    }
}
