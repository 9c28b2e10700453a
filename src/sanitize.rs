use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s./-]").expect("hard-coded regex"));
static COLLAPSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("hard-coded regex"));

/// Turn free text (typically a prompt) into a filesystem-safe name.
///
/// Every character outside `[\w \s . / -]` is removed, surrounding whitespace is
/// trimmed, then remaining runs of hyphens/whitespace collapse into single
/// underscores. Pure and deterministic, no I/O.
pub fn sanitize(raw: &str) -> String {
    let kept = DISALLOWED.replace_all(raw, "");
    COLLAPSE.replace_all(kept.trim(), "_").into_owned()
}
