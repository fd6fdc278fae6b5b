//! Prompt template generation
//!
//! Builds prose prompts for the three personalization operations, each with
//! its own token budget. The describe prompt asks for a 2-4 word reader
//! description; the rewrite prompt carries the modification rules and the
//! Markdown body; the recommend prompt asks for JSON matching the canonical
//! recommendation schema.

use std::collections::BTreeSet;

use crate::preferences::{parse_free_text, PreferenceSet};
use crate::recommendation::PersonalizationRequest;

/// Token budget for the 2-4 word reader description.
pub const DESCRIBE_MAX_TOKENS: u32 = 40;

/// Token budget for a full Markdown rewrite.
pub const REWRITE_MAX_TOKENS: u32 = 8192;

/// Token budget for a structured recommendation.
pub const RECOMMEND_MAX_TOKENS: u32 = 1000;

/// A prompt string plus the token budget it should be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub max_tokens: u32,
}

/// Build the prompt that derives a short reader description.
///
/// Empty selections and empty free text still produce a well-formed prompt;
/// the provider is told both inputs may be empty.
pub fn build_describe_prompt(tags: &BTreeSet<String>, free_text: &str) -> Prompt {
    let tags_line = tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ");

    let mut text = String::new();
    text.push_str(
        "You will receive 0+ selected options and a (potentially empty) self-written \
         description given by the user. Describe this person in 2-4 words, print nothing \
         but the description.\n",
    );
    text.push_str(&format!("Selected options: {}\n", tags_line));
    text.push_str(&format!("User description: {}\n", free_text));

    Prompt {
        text,
        max_tokens: DESCRIBE_MAX_TOKENS,
    }
}

/// Build the prompt that rewrites a Markdown body for a preference set.
///
/// `key: value` lines in the free text are listed individually; free text
/// without that format is passed through as custom instructions. Structured
/// content/visual fields are listed alongside the parsed pairs.
pub fn build_rewrite_prompt(markdown: &str, preferences: &PreferenceSet) -> Prompt {
    let directives = parse_free_text(&preferences.free_text);

    let mut text = String::new();
    text.push_str(
        "You will receive a markdown file, and you will modify it based on the user's \
         preferences and requirements:\n\n",
    );

    // Preference listing: parsed pairs, structured fields, tags, custom instructions
    text.push_str("USER PREFERENCES:\n");
    for (key, value) in &directives.pairs {
        text.push_str(&format!("- {}: {}\n", key, value));
    }
    for (label, value) in structured_fields(preferences) {
        text.push_str(&format!("- {}: {}\n", label, value));
    }
    if !preferences.selected_tags.is_empty() {
        text.push_str(&format!("- Additional preferences: {}\n", preferences.tags_line()));
    }
    if let Some(instructions) = &directives.custom_instructions {
        text.push_str(&format!("- Custom instructions: {}\n", instructions));
    }
    text.push('\n');

    text.push_str("MODIFICATION RULES:\n");
    text.push_str("1. Content Style:\n");
    text.push_str("   - Follow the user's content style and tone preferences exactly\n");
    text.push_str(
        "   - Use specified emphasis techniques (emojis, capitalization, etc.) as requested\n",
    );
    text.push_str("   - Maintain the specified level of formality/informality\n\n");
    text.push_str("2. Visual Formatting:\n");
    text.push_str("   - Follow the user's spacing preferences\n");
    text.push_str("   - Use the requested markdown formatting style\n");
    text.push_str(
        "   - Preserve the overall document structure unless big changes are requested\n\n",
    );
    text.push_str("3. Content Preservation:\n");
    text.push_str(
        "   - Keep all links and quotes intact (you may move or translate them if requested)\n",
    );
    text.push_str("   - Preserve important content from the original\n");
    text.push_str("   - Explain or remove jargon based on user preferences\n");
    text.push_str(
        "   - Remove any inline wishes from the output (e.g. {{wish}}) unless explicitly \
         requested to keep them\n\n",
    );
    text.push_str("4. Output Format:\n");
    text.push_str("   - Return ONLY valid markdown\n");
    text.push_str("   - No explanations or additional text outside the markdown content\n\n");

    text.push_str("MARKDOWN TO MODIFY:\n");
    text.push_str(markdown);

    Prompt {
        text,
        max_tokens: REWRITE_MAX_TOKENS,
    }
}

/// Build a rewrite prompt from the flat tags + free text payload shape.
pub fn build_legacy_rewrite_prompt(
    markdown: &str,
    tags: &BTreeSet<String>,
    free_text: &str,
) -> Prompt {
    let preferences = PreferenceSet {
        selected_tags: tags.clone(),
        free_text: free_text.to_string(),
        ..PreferenceSet::default()
    };
    build_rewrite_prompt(markdown, &preferences)
}

/// Build the prompt that asks for a structured personalization recommendation.
pub fn build_recommend_prompt(request: &PersonalizationRequest) -> Prompt {
    let mut text = String::new();
    text.push_str("You are a personalization assistant that helps customize blog content.\n");
    text.push_str(
        "Based on the user's preferences and context, generate personalization \
         recommendations.\n",
    );
    text.push_str(
        "Return ONLY a JSON response matching the schema below, with recommendations for \
         how the content should be customized.\n\n",
    );

    text.push_str(&format!("User preferences: {}\n", request.preferences.join(", ")));
    text.push_str(&format!("Content type: {}\n", request.content.kind));
    text.push_str(&format!(
        "Customization aspects: {}\n\n",
        request.content.customization_aspects.join(", ")
    ));

    text.push_str("Generate a response that includes:\n");
    text.push_str("1. Recommended options for viewing the content\n");
    text.push_str("2. A custom prompt that captures their preferences\n");
    text.push_str("3. A short description of the user (2-4 words)\n");
    text.push_str("4. Reasoning for the recommendations\n");
    text.push_str("5. Any pattern-based or trait-based insights\n\n");

    text.push_str("Format your response as valid JSON matching this structure:\n");
    text.push_str(
        r#"{
  "status": "success",
  "service_type": "blog",
  "recommendations": {
    "selectedOptions": string[],
    "customPrompt": string,
    "userDescription": string,
    "content_preferences": {"content_style": string, "tone": string, "language": string, "emphasis": string},
    "visual_preferences": {"emoji_usage": string, "spacing": string, "layout": string}
  },
  "reasoning": {
    "main_points": string[],
    "trait_based": object,
    "pattern_based": object,
    "additional_notes": object
  },
  "metadata": {
    "request_type": string,
    "processed_at": string,
    "version": string
  }
}"#,
    );

    Prompt {
        text,
        max_tokens: RECOMMEND_MAX_TOKENS,
    }
}

/// Structured preference fields as prompt-ready label/value pairs.
fn structured_fields(preferences: &PreferenceSet) -> Vec<(&'static str, &str)> {
    let mut fields = Vec::new();
    let content = &preferences.content;
    let visual = &preferences.visual;

    if let Some(v) = content.content_style.as_deref() {
        fields.push(("content style", v));
    }
    if let Some(v) = content.tone.as_deref() {
        fields.push(("tone", v));
    }
    if let Some(v) = content.language.as_deref() {
        fields.push(("language", v));
    }
    if let Some(v) = content.emphasis.as_deref() {
        fields.push(("emphasis", v));
    }
    if let Some(v) = visual.emoji_usage.as_deref() {
        fields.push(("emoji usage", v));
    }
    if let Some(v) = visual.spacing.as_deref() {
        fields.push(("spacing", v));
    }
    if let Some(v) = visual.layout.as_deref() {
        fields.push(("layout", v));
    }

    fields
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod prompt_tests;
