//! Unit tests for address-bar submission resolution.

use rstest::rstest;
use zentabs::services::submission_resolver::{
    normalize_url, resolve_submission, search_url, InternalAction, Submission,
};
use zentabs::types::settings::{BrowserSettings, SearchEngine};

fn settings_with_engine(engine: &str) -> BrowserSettings {
    BrowserSettings {
        search_engine: engine.to_string(),
        ..BrowserSettings::default()
    }
}

fn navigate(input: &str, engine: &str) -> String {
    match resolve_submission(input, &settings_with_engine(engine)) {
        Some(Submission::Navigate(url)) => url,
        other => panic!("expected navigation for {:?}, got {:?}", input, other),
    }
}

#[rstest]
#[case("example.com", "https://example.com/")]
#[case("  example.com/path  ", "https://example.com/path")]
#[case("http://localhost:3000", "http://localhost:3000/")]
#[case("HTTPS://Example.com/A", "https://example.com/A")]
#[case("news.ycombinator.com/item?id=1", "https://news.ycombinator.com/item?id=1")]
fn test_url_like_input_is_normalized(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(navigate(input, "google"), expected);
}

#[rstest]
#[case("google", "https://www.google.com/search?q=hello%20world")]
#[case("duckduckgo", "https://duckduckgo.com/?q=hello%20world")]
#[case("bing", "https://www.bing.com/search?q=hello%20world")]
#[case("unheard-of", "https://www.google.com/search?q=hello%20world")]
fn test_free_text_uses_selected_engine(#[case] engine: &str, #[case] expected: &str) {
    assert_eq!(navigate("hello world", engine), expected);
}

#[rstest]
#[case("zen://settings", InternalAction::OpenSettings)]
#[case("ZEN://SETTINGS", InternalAction::OpenSettings)]
#[case("  zen://newtab ", InternalAction::OpenNewTab)]
#[case("zen://history", InternalAction::Unknown)]
fn test_internal_addresses(#[case] input: &str, #[case] action: InternalAction) {
    assert_eq!(
        resolve_submission(input, &BrowserSettings::default()),
        Some(Submission::Internal(action))
    );
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t\n")]
fn test_blank_input_resolves_to_nothing(#[case] input: &str) {
    assert_eq!(resolve_submission(input, &BrowserSettings::default()), None);
}

#[test]
fn test_dotted_text_with_spaces_is_a_search() {
    assert_eq!(
        navigate("what is 1.5 kg", "google"),
        "https://www.google.com/search?q=what%20is%201.5%20kg"
    );
}

#[test]
fn test_search_query_is_percent_encoded() {
    assert_eq!(
        search_url("a&b=c", SearchEngine::Google),
        "https://www.google.com/search?q=a%26b%3Dc"
    );
}

#[test]
fn test_normalize_keeps_unparseable_input() {
    assert_eq!(normalize_url(" https://exa mple.com "), "https://exa mple.com");
}
