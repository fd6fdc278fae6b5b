//! Reader preference model
//!
//! A reader expresses wishes through preset tags, free text, and the
//! structured content/visual blocks a personalization recommendation can
//! fill in. Wire field names match the personalization service JSON:
//! the flat fields are camelCase (`selectedOptions`, `customPrompt`), the
//! structured blocks are snake_case (`content_preferences`,
//! `visual_preferences`).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Preset preference tags offered by the UI.
pub const PRESET_TAGS: [&str; 8] = [
    "Artificial intelligence",
    "Interface design",
    "Autostructures/Live theory",
    "I have a technical background",
    "I have a design background",
    "Make everything a lot more concise",
    "Describe with emojis as much as possible",
    "Explain Like I'm 5",
];

/// Structured content preferences produced by a recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<String>,
}

impl ContentPreferences {
    pub fn is_empty(&self) -> bool {
        self.content_style.is_none()
            && self.tone.is_none()
            && self.language.is_none()
            && self.emphasis.is_none()
    }
}

/// Structured visual preferences produced by a recommendation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji_usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl VisualPreferences {
    pub fn is_empty(&self) -> bool {
        self.emoji_usage.is_none() && self.spacing.is_none() && self.layout.is_none()
    }
}

/// Everything the reader has asked for.
///
/// Tags are a set: unordered, unique. Legacy payloads that carry only
/// `selectedOptions` + `customPrompt` deserialize into this with empty
/// structured blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    #[serde(default, rename = "selectedOptions")]
    pub selected_tags: BTreeSet<String>,

    #[serde(default, rename = "customPrompt")]
    pub free_text: String,

    #[serde(
        default,
        rename = "content_preferences",
        skip_serializing_if = "ContentPreferences::is_empty"
    )]
    pub content: ContentPreferences,

    #[serde(
        default,
        rename = "visual_preferences",
        skip_serializing_if = "VisualPreferences::is_empty"
    )]
    pub visual: VisualPreferences,
}

impl PreferenceSet {
    /// Build a preference set from tags + free text only (no structured blocks).
    pub fn from_wishes(tags: impl IntoIterator<Item = String>, free_text: impl Into<String>) -> Self {
        PreferenceSet {
            selected_tags: tags.into_iter().collect(),
            free_text: free_text.into(),
            ..PreferenceSet::default()
        }
    }

    /// True iff the reader has expressed any wish at all: a tag, free text,
    /// or any structured field.
    pub fn has_wishes(&self) -> bool {
        !self.selected_tags.is_empty()
            || !self.free_text.is_empty()
            || !self.content.is_empty()
            || !self.visual.is_empty()
    }

    /// Selected tags joined for prompt interpolation.
    pub fn tags_line(&self) -> String {
        self.selected_tags
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Free text split into `key: value` directives and unstructured instructions.
///
/// Lines of the form `key: value` become directives (keys lowercased, later
/// duplicates overwrite earlier ones). Free text that contains no `key: value`
/// separator anywhere is treated as unstructured custom instructions instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeTextDirectives {
    pub pairs: Vec<(String, String)>,
    pub custom_instructions: Option<String>,
}

/// Parse free text the way the rewrite prompt consumes it.
pub fn parse_free_text(free_text: &str) -> FreeTextDirectives {
    let mut directives = FreeTextDirectives::default();

    if free_text.is_empty() {
        return directives;
    }

    for line in free_text.lines() {
        if let Some((key, value)) = line.split_once(": ") {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            let key = key.to_lowercase();
            if let Some(existing) = directives.pairs.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = value.to_string();
            } else {
                directives.pairs.push((key, value.to_string()));
            }
        }
    }

    if !free_text.contains(": ") {
        directives.custom_instructions = Some(free_text.to_string());
    }

    directives
}

#[cfg(test)]
#[path = "preferences_tests.rs"]
mod preferences_tests;
