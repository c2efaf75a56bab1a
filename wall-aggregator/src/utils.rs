/// Text helpers used by the post filters
pub mod text {
    use html2text::render::TrivialDecorator;

    // Wide enough that wrapping never splits a word in a post.
    const WRAP_WIDTH: usize = 4096;

    /// Render an HTML fragment to readable text.
    ///
    /// Inline markup leaves words intact, every HTML entity is decoded and
    /// whitespace is collapsed to single spaces. This is not a sanitizer; it
    /// only produces text to measure and search.
    pub fn plain_text(html: &str) -> String {
        let rendered = html2text::config::with_decorator(TrivialDecorator::new())
            .allow_width_overflow()
            .unicode_strikeout(false)
            .string_from_read(html.as_bytes(), WRAP_WIDTH)
            .unwrap_or_else(|_| html.to_string());

        rendered.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Case-folded plain text, for word matching.
    pub fn folded_plain_text(html: &str) -> String {
        plain_text(html).to_lowercase()
    }
}

/// Time helpers for log output
pub mod time {
    use std::time::Duration;

    /// Format duration in human-readable form
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();

        if total_seconds < 60 {
            format!("{}s", total_seconds)
        } else if total_seconds < 3600 {
            format!("{}m", total_seconds / 60)
        } else if total_seconds < 86400 {
            format!("{}h", total_seconds / 3600)
        } else {
            format!("{}d", total_seconds / 86400)
        }
    }
}
