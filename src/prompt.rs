/// Niche keyword → image prompt template. Matched case-insensitively as a
/// substring of the creator's niche; `{title}` is replaced with the idea
/// title.
const NICHE_TEMPLATES: &[(&str, &str)] = &[
    (
        "fitness",
        "Professional fitness photography, {title}, gym environment, energetic atmosphere, high quality, vibrant colors",
    ),
    (
        "fashion",
        "Fashion photography, {title}, stylish and trendy, professional model, modern aesthetic, high fashion",
    ),
    (
        "tech",
        "Technology concept, {title}, modern tech environment, sleek design, futuristic, professional",
    ),
    (
        "food",
        "Food photography, {title}, delicious presentation, professional kitchen, appetizing, high quality",
    ),
    (
        "travel",
        "Travel photography, {title}, beautiful destination, adventure, scenic view, professional",
    ),
    (
        "business",
        "Business concept, {title}, professional office, corporate environment, success, modern",
    ),
    (
        "education",
        "Education concept, {title}, learning environment, knowledge, books, modern classroom",
    ),
    (
        "beauty",
        "Beauty photography, {title}, skincare, makeup, spa environment, elegant, professional",
    ),
    (
        "photography",
        "Photography concept, {title}, camera equipment, creative, artistic, professional photographer",
    ),
    (
        "music",
        "Music concept, {title}, musical instruments, concert, performance, artistic",
    ),
];

/// Builds an image prompt for a content idea. Pure and total: a recognized
/// niche keyword picks its template, anything else gets the generic one.
pub fn create_image_prompt(niche: &str, idea_title: &str, idea_type: &str) -> String {
    let niche_lower = niche.to_lowercase();

    for (keyword, template) in NICHE_TEMPLATES {
        if niche_lower.contains(keyword) {
            return template.replace("{title}", idea_title);
        }
    }

    format!(
        "Professional {} content, {}, high quality, modern, vibrant, {} format",
        niche, idea_title, idea_type
    )
}
