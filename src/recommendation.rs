//! Personalization recommendation schema
//!
//! Request and response types for the `/personalize` operation, plus the
//! deterministic fallback used when a provider's output fails to parse.
//! The response schema is canonical: `recommendations` always carries the
//! flat fields the preference store merges (`selectedOptions`,
//! `customPrompt`, `userDescription`) and may carry the structured
//! content/visual blocks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::preferences::{ContentPreferences, VisualPreferences};

/// Service identifier echoed through every recommendation exchange.
pub const SERVICE_TYPE: &str = "blog";

/// Schema version stamped into response metadata.
pub const SCHEMA_VERSION: &str = "1.0.0";

const REQUEST_TYPE: &str = "customize";
const CONTENT_TYPE: &str = "blog_content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub service_type: String,
    pub request_type: String,
    pub user_id: String,
    pub parameters: RequestParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub customization_aspects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub style: Vec<String>,
    #[serde(default)]
    pub format: Vec<String>,
}

/// Fixed-shape request body for `POST /personalize`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationRequest {
    pub context: RequestContext,
    pub content: ContentDescriptor,
    pub preferences: Vec<String>,
    #[serde(default)]
    pub options: RequestOptions,
}

/// Build the personalization request for the given wishes.
///
/// Preferences are the selected tags followed by the free text, with empty
/// entries dropped.
pub fn personalization_request<'a>(
    tags: impl IntoIterator<Item = &'a str>,
    free_text: &str,
) -> PersonalizationRequest {
    let mut preferences: Vec<String> = tags
        .into_iter()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if !free_text.is_empty() {
        preferences.push(free_text.to_string());
    }

    PersonalizationRequest {
        context: RequestContext {
            service_type: SERVICE_TYPE.to_string(),
            request_type: REQUEST_TYPE.to_string(),
            user_id: format!("user_{:x}", chrono::Utc::now().timestamp_millis()),
            parameters: RequestParameters {
                content_type: CONTENT_TYPE.to_string(),
                target_audience: Some("custom".to_string()),
            },
        },
        content: ContentDescriptor {
            kind: CONTENT_TYPE.to_string(),
            customization_aspects: vec![
                "content_style".to_string(),
                "visual_preferences".to_string(),
            ],
        },
        preferences,
        options: RequestOptions {
            style: vec!["default".to_string()],
            format: vec!["markdown".to_string()],
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// The recommendation payload proper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, rename = "selectedOptions")]
    pub selected_options: Vec<String>,

    #[serde(default, rename = "customPrompt")]
    pub custom_prompt: String,

    #[serde(default, rename = "userDescription")]
    pub user_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_preferences: Option<ContentPreferences>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_preferences: Option<VisualPreferences>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reasoning {
    #[serde(default)]
    pub main_points: Vec<String>,
    #[serde(default)]
    pub trait_based: BTreeMap<String, String>,
    #[serde(default)]
    pub pattern_based: BTreeMap<String, String>,
    #[serde(default)]
    pub additional_notes: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub request_type: String,
    #[serde(default)]
    pub processed_at: String,
    #[serde(default)]
    pub version: String,
}

/// Canonical `POST /personalize` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizationResponse {
    pub status: Status,
    pub service_type: String,
    pub recommendations: Recommendation,
    #[serde(default)]
    pub reasoning: Reasoning,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

/// Parse raw provider output into a recommendation response.
///
/// Providers occasionally wrap the JSON in prose or a code fence, so after a
/// direct parse fails the outermost `{..}` substring is tried before giving
/// up. Returns `None` on total parse failure; callers degrade to
/// [`fallback_response`].
pub fn parse_response(raw: &str) -> Option<PersonalizationResponse> {
    let trimmed = raw.trim();
    if let Ok(parsed) = serde_json::from_str(trimmed) {
        return Some(parsed);
    }

    let extracted = extract_json_object(trimmed)?;
    serde_json::from_str(extracted).ok()
}

/// Extract the outermost JSON object substring from raw LLM output.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Deterministic response used when provider output cannot be parsed.
///
/// Echoes the request's service type and preferences so the caller can tell
/// which input produced the failure; status is `error` throughout.
pub fn fallback_response(request: &PersonalizationRequest) -> PersonalizationResponse {
    let mut additional_notes = BTreeMap::new();
    additional_notes.insert(
        "error".to_string(),
        serde_json::Value::String("Failed to parse provider response".to_string()),
    );

    PersonalizationResponse {
        status: Status::Error,
        service_type: request.context.service_type.clone(),
        recommendations: Recommendation {
            selected_options: request.preferences.clone(),
            custom_prompt: String::new(),
            user_description: "Error parsing response".to_string(),
            content_preferences: None,
            visual_preferences: None,
        },
        reasoning: Reasoning {
            main_points: vec!["Error occurred".to_string()],
            trait_based: BTreeMap::new(),
            pattern_based: BTreeMap::new(),
            additional_notes,
        },
        metadata: ResponseMetadata {
            request_type: request.context.request_type.clone(),
            processed_at: chrono::Utc::now().to_rfc3339(),
            version: SCHEMA_VERSION.to_string(),
        },
    }
}
