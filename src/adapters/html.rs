//! Minimal tag slicing for vendor price pages.
//!
//! Not a general HTML parser: tags are matched case-insensitively and
//! blocks of the same tag must not nest.

/// Inner content of every `<tag ...>...</tag>` block, in document order.
pub fn tag_blocks<'a>(s: &'a str, tag: &str) -> Vec<&'a str> {
    // ASCII lowercasing keeps byte offsets aligned with `s`
    let lc = s.to_ascii_lowercase();
    let open = format!("<{}", tag.to_ascii_lowercase());
    let close = format!("</{}>", tag.to_ascii_lowercase());

    let mut blocks = Vec::new();
    let mut from = 0;
    while let Some(rel) = lc[from..].find(&open) {
        let start = from + rel;
        let after_name = start + open.len();
        let name_ends = lc[after_name..]
            .starts_with(|c: char| c == '>' || c == '/' || c.is_ascii_whitespace());
        if !name_ends {
            from = after_name;
            continue;
        }

        let Some(gt) = lc[start..].find('>') else { break };
        let open_end = start + gt + 1;
        let Some(end_rel) = lc[open_end..].find(&close) else { break };
        blocks.push(&s[open_end..open_end + end_rel]);
        from = open_end + end_rel + close.len();
    }
    blocks
}

pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#36;", "$")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// Visible text of a fragment: tags removed, entities decoded, whitespace
/// collapsed.
pub fn text_of(fragment: &str) -> String {
    normalize_ws(&normalize_entities(&strip_tags(fragment)))
}
