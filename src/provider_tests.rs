//! Tests for the provider gateway

use super::*;
use crate::config::{AnthropicConfig, GeminiConfig};
use proptest::prelude::*;

fn config_with_keys(anthropic: Option<&str>, gemini: Option<&str>) -> ProvidersConfig {
    ProvidersConfig {
        anthropic: AnthropicConfig {
            api_key: anthropic.map(str::to_string),
            ..AnthropicConfig::default()
        },
        gemini: GeminiConfig {
            api_key: gemini.map(str::to_string),
            ..GeminiConfig::default()
        },
    }
}

#[test]
fn test_unconfigured_gateway_has_no_backends() {
    let gateway = ProviderGateway::from_config(&ProvidersConfig::default());
    assert!(!gateway.is_configured());
    assert!(gateway.provider_names().is_empty());
}

#[test]
fn test_anthropic_comes_before_gemini() {
    let gateway = ProviderGateway::from_config(&config_with_keys(Some("a-key"), Some("g-key")));
    assert_eq!(gateway.provider_names(), vec!["Anthropic", "Gemini"]);
}

#[test]
fn test_single_credential_builds_single_backend() {
    let gateway = ProviderGateway::from_config(&config_with_keys(None, Some("g-key")));
    assert_eq!(gateway.provider_names(), vec!["Gemini"]);
}

#[test]
fn test_whitespace_credential_is_not_configured() {
    let gateway = ProviderGateway::from_config(&config_with_keys(Some("   "), None));
    assert!(!gateway.is_configured());
}

#[test]
fn test_failure_response_shape() {
    let response = ProviderResponse::failure("boom");
    assert_eq!(response.provider, ProviderId::Error);
    assert_eq!(response.text, "");
    assert_eq!(response.error.as_deref(), Some("boom"));
    assert!(response.is_error());
}

#[test]
fn test_empty_text_counts_as_error() {
    let response = ProviderResponse {
        text: String::new(),
        provider: ProviderId::Anthropic,
        error: None,
    };
    assert!(response.is_error());
}

#[test]
fn test_successful_response_is_not_error() {
    let response = ProviderResponse {
        text: "hello".to_string(),
        provider: ProviderId::Gemini,
        error: None,
    };
    assert!(!response.is_error());
}

#[tokio::test]
async fn test_unconfigured_gateway_reports_missing_keys() {
    let gateway = ProviderGateway::from_config(&ProvidersConfig::default());
    let response = gateway.generate("hello", 40).await;
    assert_eq!(response.provider, ProviderId::Error);
    assert_eq!(response.text, "");
    assert!(response.error.as_deref().unwrap().contains("No LLM API keys"));
}

#[tokio::test]
async fn test_all_backends_failing_yields_error_response() {
    // Bind then drop a listener so the port is dead but was recently valid
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_addr = listener.local_addr().unwrap();
    drop(listener);

    let gateway = ProviderGateway::new(vec![
        TextGenerator::Anthropic(AnthropicClient::new(
            "a-key".to_string(),
            "model-a".to_string(),
            Some(format!("http://{}/v1/messages", dead_addr)),
        )),
        TextGenerator::Gemini(GeminiClient::new(
            "g-key".to_string(),
            "model-g".to_string(),
            Some(format!("http://{}/v1beta/models", dead_addr)),
        )),
    ]);

    let response = gateway.generate("hello", 40).await;
    assert_eq!(response.provider, ProviderId::Error);
    assert_eq!(response.text, "");
    assert!(response.error.is_some());
}

#[test]
fn test_client_endpoint_overrides() {
    let anthropic = AnthropicClient::new(
        "key".to_string(),
        "model".to_string(),
        Some("http://localhost:9/v1/messages".to_string()),
    );
    assert_eq!(anthropic.api_url(), "http://localhost:9/v1/messages");
    assert_eq!(anthropic.model(), "model");

    let gemini = GeminiClient::new("key".to_string(), "model".to_string(), None);
    assert_eq!(gemini.api_key(), "key");
    assert_eq!(gemini.model(), "model");
}

// =========================================================================
// Property-Based Tests
// =========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any non-empty credential pair yields the fixed fallback order.
    #[test]
    fn prop_both_credentials_preserve_priority_order(
        anthropic_key in "[a-zA-Z0-9_-]{10,50}",
        gemini_key in "[a-zA-Z0-9_-]{10,50}",
    ) {
        let gateway =
            ProviderGateway::from_config(&config_with_keys(Some(&anthropic_key), Some(&gemini_key)));
        prop_assert_eq!(gateway.provider_names(), vec!["Anthropic", "Gemini"]);
    }

    // Whitespace-only credentials never produce a backend.
    #[test]
    fn prop_blank_credentials_produce_no_backend(
        blank in prop::string::string_regex("[ \t]*").unwrap(),
    ) {
        let gateway = ProviderGateway::from_config(&config_with_keys(Some(&blank), Some(&blank)));
        prop_assert!(!gateway.is_configured());
    }
}
