use creatorgen::{create_image_prompt, GenClient, ImageGenerationOptions};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file first
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    creatorgen::logger::init_with_config(
        creatorgen::logger::LoggerConfig::development()
            .with_level(creatorgen::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking generation credentials...");

    match env::var("KIE_API_KEY").or_else(|_| env::var("VITE_KIE_API_KEY")) {
        Ok(key) => {
            log::info!("✅ Kie.ai key found");
            log::debug!("Key starts with: {}...", &key[..5.min(key.len())]);
        }
        Err(_) => log::warn!("⚠️  No Kie.ai key, image calls will use placeholders"),
    }

    if env::var("GEMINI_API_KEY").is_err() {
        log::warn!("⚠️  No Gemini key, idea generation will return nothing");
    }

    let client = GenClient::from_env();

    let niche = "Fitness Fanatics";
    log::info!("🧪 Generating content ideas for '{}'...", niche);
    let ideas = client
        .ideas()
        .generate_content_ideas(niche, "grow engagement")
        .await;

    for idea in &ideas {
        log::info!("📝 [{}] {}", idea.kind, idea.title);
    }

    let prompt = match ideas.first() {
        Some(idea) => create_image_prompt(niche, &idea.title, &idea.kind),
        None => create_image_prompt(niche, "5 Morning Habits", "Reels"),
    };

    log::info!("🧪 Generating an image...");
    let options = ImageGenerationOptions::new().with_dimensions(1024, 1024);
    let result = client.image().generate_detailed(&prompt, Some(options)).await;

    if result.from_fallback {
        log::warn!("🖼️  Placeholder returned ({:?}): {}", result.reason, result.url);
    } else {
        log::info!("🎉 Image ready: {}", result.url);
    }

    Ok(())
}
