use crate::{
    config::{GeminiConfig, DEFAULT_GEMINI_MODEL},
    error::{GenError, Result},
    models::{ContentIdea, GeminiResponse},
};
use reqwest::Client;
use serde_json::json;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Content-idea generation over the Gemini REST API. Same protocol family as
/// the image client (submit prompt, parse envelope, extract payload) but a
/// single round trip, no polling.
#[derive(Clone)]
pub struct IdeasClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl IdeasClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key,
            model: config
                .model
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
        }
    }

    /// Total operation in the same spirit as image generation: a missing key
    /// or any failure yields an empty list, never an error to the caller.
    pub async fn generate_content_ideas(&self, niche: &str, goal: &str) -> Vec<ContentIdea> {
        let api_key = match &self.api_key {
            Some(api_key) => api_key.clone(),
            None => {
                log::warn!("⚠️  GEMINI_API_KEY not configured, no ideas generated");
                return Vec::new();
            }
        };

        match self.request_ideas(&api_key, niche, goal).await {
            Ok(ideas) => {
                log::info!("✅ Generated {} content ideas", ideas.len());
                ideas
            }
            Err(e) => {
                log::error!("❌ Error generating ideas: {}", e);
                Vec::new()
            }
        }
    }

    async fn request_ideas(
        &self,
        api_key: &str,
        niche: &str,
        goal: &str,
    ) -> Result<Vec<ContentIdea>> {
        log::info!("💡 Generating content ideas for niche: {}", niche);

        let payload = json!({
            "contents": [{
                "parts": [{ "text": ideas_prompt(niche, goal) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        });

        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| GenError::RequestError(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenError::ResponseError(format!(
                "Gemini returned HTTP {}: {}",
                status, body
            )));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenError::ResponseError(format!("invalid Gemini response: {}", e)))?;

        let text = body.first_text().ok_or_else(|| {
            GenError::ResponseError("Gemini response had no candidates".into())
        })?;

        parse_ideas(text)
    }
}

fn ideas_prompt(niche: &str, goal: &str) -> String {
    format!(
        "Generate 6 diverse content ideas for a social media creator in the niche \"{}\" \
         with the goal of \"{}\". Return the ideas as a JSON array of objects with fields \
         id, type, title and optionally hook, description, structure, cta. \
         Types must be: Reels, Carousel, Story, Static, Promo. \
         For Reels include a 'hook'. For Story include 'structure' (array of strings). \
         For Promo include 'cta'.",
        niche, goal
    )
}

/// Parses the model's JSON text into typed ideas. Kept separate from the HTTP
/// path so the shape contract is testable offline.
pub fn parse_ideas(text: &str) -> Result<Vec<ContentIdea>> {
    serde_json::from_str(text)
        .map_err(|e| GenError::SerializationError(format!("ideas payload was not valid JSON: {}", e)))
}
