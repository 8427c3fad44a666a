use crate::ai::TranslationService;
use crate::themes::ImageStyle;
use crate::Result;

pub const IMAGE_PROMPT: &str = include_str!("../data/prompts/image_prompt.txt");
pub const TRANSLATE_SYSTEM: &str = include_str!("../data/prompts/translate_system.txt");

/// Language code used for everything sent to the image provider.
pub const PROMPT_LANGUAGE: &str = "en";

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is a single pass over the template: inserted values are
/// never scanned again, and unknown placeholders are left as they are.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        result.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            result.push_str(&rest[open..]);
            return result;
        };

        let key = &after_open[..close];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[open..open + close + 4]),
        }
        rest = &after_open[close + 2..];
    }

    result.push_str(rest);
    result
}

/// Compose the image prompt from an already translated message.
pub fn compose_image_prompt(
    style: ImageStyle,
    key_phrases: &[String],
    english_message: &str,
    mood: &str,
    season: &str,
) -> String {
    let keywords = key_phrases.join(", ");
    render(
        IMAGE_PROMPT,
        &[
            ("style", style.descriptor()),
            ("message", english_message),
            ("keywords", &keywords),
            ("mood", mood),
            ("season", season),
        ],
    )
    .trim()
    .to_string()
}

/// Translate `input_message` to English and compose the image prompt.
pub async fn build_prompt(
    translator: &dyn TranslationService,
    style: ImageStyle,
    key_phrases: &[String],
    input_message: &str,
    mood: &str,
    season: &str,
) -> Result<String> {
    let english_message = translator.translate(input_message, PROMPT_LANGUAGE).await?;
    Ok(compose_image_prompt(
        style,
        key_phrases,
        &english_message,
        mood,
        season,
    ))
}
