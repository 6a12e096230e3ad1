use tracing::{debug, instrument};

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// Normalize a raw model response before JSON parsing.
///
/// Models often wrap their JSON in a Markdown code block. If the trimmed text
/// opens with a triple-backtick fence (with or without a language tag such as
/// `json`), the content between the opening fence and the last closing fence is
/// returned, trimmed. Otherwise the trimmed text is returned as-is.
///
/// A fence that is never closed yields everything after the opening fence.
/// Applying the function to its own output changes nothing.
#[instrument(target = "quizcraft::json", skip(raw), fields(raw_len = raw.len()))]
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(after_open) = text.strip_prefix(FENCE) else {
        return text;
    };

    let body = skip_language_tag(after_open);
    let inner = match body.rfind(FENCE) {
        Some(close) => &body[..close],
        None => body,
    };

    debug!(target = "quizcraft::json", inner_len = inner.len(), "stripped code fence");
    inner.trim()
}

// "json\n{...}" -> "\n{...}"; "{...}" stays put.
fn skip_language_tag(after_open: &str) -> &str {
    let tag_len = after_open
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.')))
        .unwrap_or(after_open.len());
    let rest = &after_open[tag_len..];

    if tag_len > 0 && (rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return rest;
    }

    // "```json{...}": a json tag glued to the payload still counts as a tag.
    match after_open.get(..JSON_TAG.len()) {
        Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &after_open[JSON_TAG.len()..],
        _ => after_open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_detection() {
        assert_eq!(skip_language_tag("json\n{}"), "\n{}");
        assert_eq!(skip_language_tag("json {}"), " {}");
        assert_eq!(skip_language_tag("\n{}"), "\n{}");
        assert_eq!(skip_language_tag("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(skip_language_tag("json"), "");
        assert_eq!(skip_language_tag("json{}```"), "{}```");
        assert_eq!(skip_language_tag("JSON[1]"), "[1]");
    }
}
