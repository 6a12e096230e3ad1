use quizcraft::json_utils::strip_code_fence;

#[test]
fn unfenced_text_is_only_trimmed() {
    assert_eq!(strip_code_fence("  {\"a\":1}\n"), "{\"a\":1}");
}

#[test]
fn json_tagged_fence_is_removed() {
    let raw = "```json\n{\"a\":1}\n```";
    assert_eq!(strip_code_fence(raw), "{\"a\":1}");
}

#[test]
fn untagged_fence_is_removed() {
    let raw = "\n```\n{\"a\":1}\n```\n";
    assert_eq!(strip_code_fence(raw), "{\"a\":1}");
}

#[test]
fn other_language_tags_are_removed() {
    assert_eq!(strip_code_fence("```JSON\n[1]\n```"), "[1]");
    assert_eq!(strip_code_fence("```javascript\n{}\n```"), "{}");
}

#[test]
fn json_tag_glued_to_the_payload_is_removed() {
    assert_eq!(strip_code_fence("```json{\"error\":\"x\"}```"), "{\"error\":\"x\"}");
    assert_eq!(strip_code_fence("```json[1, 2]\n```"), "[1, 2]");
}

#[test]
fn single_line_fence() {
    assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
    assert_eq!(strip_code_fence("```json {\"a\":1}```"), "{\"a\":1}");
}

#[test]
fn content_runs_to_the_last_fence() {
    let raw = "```json\n{\"code\":\"```\"}\n```";
    assert_eq!(strip_code_fence(raw), "{\"code\":\"```\"}");
}

#[test]
fn unclosed_fence_keeps_the_rest() {
    assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
}

#[test]
fn normalization_is_idempotent() {
    let inputs = [
        "{\"a\":1}",
        "  {\"a\":1}  ",
        "```json\n{\"a\":1}\n```",
        "```\n[1, 2]\n```",
        "not json at all",
        "",
    ];
    for raw in inputs {
        let once = strip_code_fence(raw);
        assert_eq!(strip_code_fence(once), once, "input: {raw:?}");
    }
}
