//! Endpoint URL helpers.

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";

/// Joins `base_url` and `endpoint` with exactly one slash between them.
///
/// ```
/// use cllm::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.example.com/v1/", "/chat/completions"),
///     "https://api.example.com/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let endpoint = endpoint.trim_start_matches('/');
    format!("{base}/{endpoint}")
}

/// API base URL from `OPENAI_BASE_URL`, falling back to the public endpoint.
pub fn resolve_base_url() -> String {
    resolve_base_url_with(|name| std::env::var(name).ok())
}

pub(crate) fn resolve_base_url_with<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(BASE_URL_ENV_VAR)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}
