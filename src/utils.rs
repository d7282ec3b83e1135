use url::Url;

/// Normalize an incomplete page URL by adding a missing protocol
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();

    // If already has a protocol, return as-is
    if trimmed.contains("://") || trimmed.starts_with("data:") || trimmed.starts_with("about:") {
        return trimmed.to_string();
    }

    // localhost special case - use http by default
    if trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1") {
        return format!("http://{}", trimmed);
    }

    if trimmed.starts_with("//") {
        return format!("https:{}", trimmed);
    }

    format!("https://{}", trimmed)
}

/// Resolve a possibly relative (or protocol-relative `//host/x`) reference
/// against the page URL. `data:`, `javascript:`, fragment-only and empty
/// references resolve to `None`.
pub fn resolve_url(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("data:")
        || reference.to_ascii_lowercase().starts_with("javascript:")
    {
        return None;
    }
    base.join(reference).ok().map(String::from)
}

/// Truncate to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse every whitespace run to a single space and trim
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
