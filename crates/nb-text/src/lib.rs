//! Markup-to-text extraction for display.

/// Strips markup tags from `body` and decodes the two supported named
/// entities.
///
/// A single left-to-right scan tracks whether the cursor is inside a tag:
/// `<` enters tag state, `>` leaves it, and neither delimiter is emitted.
/// Entity substitution runs after the scan, on the stripped text, so escaped
/// angle brackets inside tag bodies never re-enter tag state.
pub fn extract_text(body: &str) -> String {
    let mut stripped = String::with_capacity(body.len());
    let mut in_tag = false;

    for ch in body.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }

    stripped.replace("&lt;", "<").replace("&gt;", ">")
}

/// Escapes angle brackets so markup is displayed literally instead of being
/// interpreted. `<` is rewritten first so the `<` inside `&gt;` replacements
/// cannot be produced and escaped twice.
pub fn escape_markup(body: &str) -> String {
    body.replace('<', "&lt;").replace('>', "&gt;")
}
