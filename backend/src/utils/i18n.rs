//! Internationalization utilities for the backend
//!
//! The locale of a request lives in a tokio task-local for the duration of the
//! handler; outside a request the configured default applies.

use std::future::Future;

use once_cell::sync::OnceCell;

tokio::task_local! {
    static CURRENT_LOCALE: String;
}

static DEFAULT_LOCALE_OVERRIDE: OnceCell<String> = OnceCell::new();

/// Supported locales
pub const SUPPORTED_LOCALES: &[&str] = &["en", "zh"];
pub const DEFAULT_LOCALE: &str = "en";

/// Set the process-wide fallback locale once, at startup
pub fn init_default_locale(locale: &str) {
    let locale = normalize_locale(locale).unwrap_or(DEFAULT_LOCALE);
    if DEFAULT_LOCALE_OVERRIDE.set(locale.to_string()).is_err() {
        tracing::debug!("Default locale already initialized, ignoring '{}'", locale);
    }
}

pub fn default_locale() -> &'static str {
    DEFAULT_LOCALE_OVERRIDE.get().map(String::as_str).unwrap_or(DEFAULT_LOCALE)
}

/// Run `f` with `locale` as the current locale
pub async fn scope_locale<F: Future>(locale: String, f: F) -> F::Output {
    CURRENT_LOCALE.scope(locale, f).await
}

/// Get the locale of the current request, or the default outside one
pub fn get_locale() -> String {
    CURRENT_LOCALE
        .try_with(|locale| locale.clone())
        .unwrap_or_else(|_| default_locale().to_string())
}

/// Normalize locale string to a supported locale
/// Accepts: "zh", "zh-CN", "zh_CN", "en", "en-US", "en_US", etc.
fn normalize_locale(locale: &str) -> Option<&'static str> {
    let locale = locale.trim().to_lowercase();

    let primary = locale.split(['-', '_', ',', ';']).next().unwrap_or_default();

    if primary.starts_with("zh") {
        Some("zh")
    } else if primary.starts_with("en") {
        Some("en")
    } else {
        None
    }
}

/// Extract locale from Accept-Language header value
pub fn extract_locale_from_header(header_value: Option<&str>) -> String {
    header_value
        .and_then(normalize_locale)
        .unwrap_or_else(default_locale)
        .to_string()
}
