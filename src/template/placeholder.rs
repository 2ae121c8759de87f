//! Placeholder grammar.
//!
//! A placeholder is `{{NAME}}` where `NAME` is `UPPER_SNAKE_CASE`: an
//! uppercase ASCII letter followed by uppercase letters, digits or
//! underscores. No whitespace is allowed inside the braces.
//!
//! Brace patterns that belong to other languages stay literal text:
//!
//! - `${var.x}` (HCL, shell) never has doubled braces
//! - `${{ secrets.X }}` and `${{X}}` (GitHub Actions) are preceded by `$`
//! - `{{{X}}}` (handlebars raw output) is preceded by a third brace
//! - `{"a": {"b": 1}}` (JSON) never matches the name grammar
//!
//! A closing brace right after a token does not make it literal, so JSON
//! such as `{"port":{{PORT}}}` still holds a placeholder.

use std::collections::BTreeSet;

/// A segment of a scanned template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, copied verbatim.
    Literal(&'a str),
    /// Placeholder reference: `{{NAME}}` (holds `NAME`).
    Placeholder(&'a str),
}

/// Check whether `name` satisfies the placeholder name grammar.
pub fn is_placeholder_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_uppercase() => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

/// If a placeholder token starts at byte `i`, return the index one past its end.
fn token_end(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'{') || bytes.get(i + 1) != Some(&b'{') {
        return None;
    }
    if i > 0 && matches!(bytes[i - 1], b'$' | b'{') {
        return None;
    }

    let mut j = i + 2;
    match bytes.get(j) {
        Some(b) if b.is_ascii_uppercase() => j += 1,
        _ => return None,
    }
    while let Some(b) = bytes.get(j) {
        if b.is_ascii_uppercase() || b.is_ascii_digit() || *b == b'_' {
            j += 1;
        } else {
            break;
        }
    }

    if bytes.get(j) != Some(&b'}') || bytes.get(j + 1) != Some(&b'}') {
        return None;
    }
    Some(j + 2)
}

/// Split `input` into literal and placeholder segments.
pub fn parse_placeholders(input: &str) -> Vec<Segment<'_>> {
    let bytes = input.as_bytes();
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match token_end(bytes, i) {
            Some(end) => {
                if literal_start < i {
                    segments.push(Segment::Literal(&input[literal_start..i]));
                }
                segments.push(Segment::Placeholder(&input[i + 2..end - 2]));
                i = end;
                literal_start = end;
            }
            None => i += 1,
        }
    }

    if literal_start < bytes.len() {
        segments.push(Segment::Literal(&input[literal_start..]));
    }

    segments
}

/// Collect the distinct placeholder names referenced in `input`.
pub fn find_placeholders(input: &str) -> BTreeSet<String> {
    parse_placeholders(input)
        .into_iter()
        .filter_map(|seg| match seg {
            Segment::Placeholder(name) => Some(name.to_string()),
            Segment::Literal(_) => None,
        })
        .collect()
}

/// Count placeholder occurrences per name, first line number included.
///
/// Returns `(name, occurrences, first_line)` sorted by name.
pub fn placeholder_occurrences(input: &str) -> Vec<(String, usize, usize)> {
    let mut found: std::collections::BTreeMap<String, (usize, usize)> = Default::default();
    let mut line = 1;

    for seg in parse_placeholders(input) {
        match seg {
            Segment::Literal(text) => line += text.matches('\n').count(),
            Segment::Placeholder(name) => {
                let entry = found.entry(name.to_string()).or_insert((0, line));
                entry.0 += 1;
            }
        }
    }

    found
        .into_iter()
        .map(|(name, (count, first))| (name, count, first))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_placeholder() {
        let segs = parse_placeholders("Hello {{PROJECT_NAME}}!");
        assert_eq!(
            segs,
            vec![
                Segment::Literal("Hello "),
                Segment::Placeholder("PROJECT_NAME"),
                Segment::Literal("!"),
            ]
        );
    }

    #[test]
    fn adjacent_placeholders() {
        let segs = parse_placeholders("{{A}}{{B2}}");
        assert_eq!(
            segs,
            vec![Segment::Placeholder("A"), Segment::Placeholder("B2")]
        );
    }

    #[test]
    fn hcl_interpolation_is_literal() {
        assert!(find_placeholders("name = \"${var.project_name}\"").is_empty());
        assert!(find_placeholders("${PROJECT_NAME}").is_empty());
    }

    #[test]
    fn github_actions_expression_is_literal() {
        assert!(find_placeholders("token: ${{ secrets.TOKEN }}").is_empty());
        assert!(find_placeholders("token: ${{TOKEN}}").is_empty());
    }

    #[test]
    fn triple_braces_are_literal() {
        assert!(find_placeholders("{{{BODY}}}").is_empty());
    }

    #[test]
    fn placeholder_closing_a_json_object() {
        let segs = parse_placeholders(r#"{"port":{{PORT}}}"#);
        assert_eq!(
            segs,
            vec![
                Segment::Literal(r#"{"port":"#),
                Segment::Placeholder("PORT"),
                Segment::Literal("}"),
            ]
        );
    }

    #[test]
    fn json_braces_are_literal() {
        assert!(find_placeholders(r#"{"a": {"b": {}}}"#).is_empty());
        assert!(find_placeholders("{{}}").is_empty());
    }

    #[test]
    fn whitespace_and_lowercase_are_not_placeholders() {
        assert!(find_placeholders("{{ PROJECT_NAME }}").is_empty());
        assert!(find_placeholders("{{project_name}}").is_empty());
        assert!(find_placeholders("{{1ABC}}").is_empty());
        assert!(find_placeholders("{{_ABC}}").is_empty());
    }

    #[test]
    fn unterminated_token_is_literal() {
        let segs = parse_placeholders("open {{NAME} and {{NAME");
        assert_eq!(segs, vec![Segment::Literal("open {{NAME} and {{NAME")]);
    }

    #[test]
    fn non_ascii_text_survives() {
        let segs = parse_placeholders("héllo {{X}} wörld");
        assert_eq!(
            segs,
            vec![
                Segment::Literal("héllo "),
                Segment::Placeholder("X"),
                Segment::Literal(" wörld"),
            ]
        );
    }

    #[test]
    fn name_grammar() {
        assert!(is_placeholder_name("PROJECT_NAME"));
        assert!(is_placeholder_name("A1_B2"));
        assert!(!is_placeholder_name(""));
        assert!(!is_placeholder_name("project"));
        assert!(!is_placeholder_name("9LIVES"));
        assert!(!is_placeholder_name("HAS-DASH"));
    }

    #[test]
    fn occurrences_track_first_line() {
        let text = "a\n{{X}}\nb {{Y}} {{X}}\n";
        let occ = placeholder_occurrences(text);
        assert_eq!(
            occ,
            vec![("X".to_string(), 2, 2), ("Y".to_string(), 1, 3)]
        );
    }
}
