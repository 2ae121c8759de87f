//! Placeholder rendering.

use std::collections::BTreeSet;

use super::bindings::VariableBindings;
use super::placeholder::{find_placeholders, parse_placeholders, Segment};
use super::replacements::LiteralReplacements;

/// Output of a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered text.
    pub content: String,
    /// Placeholder names still present in `content`.
    pub unresolved: BTreeSet<String>,
}

impl Rendered {
    /// Whether every placeholder was resolved.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Substitute `{{NAME}}` placeholders with their bindings.
///
/// Substitution is a single pass: a substituted value is never scanned for
/// further placeholders. Unbound placeholders are kept verbatim. The output is
/// scanned afterwards and every remaining placeholder is reported in
/// [`Rendered::unresolved`]; the caller decides whether that is fatal.
pub fn render(content: &str, bindings: &VariableBindings) -> Rendered {
    let mut output = String::with_capacity(content.len());

    for segment in parse_placeholders(content) {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Placeholder(name) => match bindings.get(name) {
                Some(value) => output.push_str(value),
                None => {
                    output.push_str("{{");
                    output.push_str(name);
                    output.push_str("}}");
                }
            },
        }
    }

    let unresolved = find_placeholders(&output);
    Rendered {
        content: output,
        unresolved,
    }
}

/// Renderer bound to a run's bindings and literal replacements.
#[derive(Debug, Clone, Copy)]
pub struct TemplateRenderer<'a> {
    bindings: &'a VariableBindings,
    replacements: &'a LiteralReplacements,
}

impl<'a> TemplateRenderer<'a> {
    /// Create a renderer.
    pub fn new(bindings: &'a VariableBindings, replacements: &'a LiteralReplacements) -> Self {
        Self {
            bindings,
            replacements,
        }
    }

    /// Bindings used by this renderer.
    pub fn bindings(&self) -> &VariableBindings {
        self.bindings
    }

    /// Render placeholders only.
    pub fn render(&self, content: &str) -> Rendered {
        render(content, self.bindings)
    }

    /// Render placeholders with additional per-call bindings.
    pub fn render_with<'b>(
        &self,
        content: &str,
        extra: impl IntoIterator<Item = (&'b str, String)>,
    ) -> Rendered {
        render(content, &self.bindings.extended(extra))
    }

    /// Literal replacements followed by placeholder substitution.
    pub fn genericize(&self, content: &str) -> Rendered {
        let replaced = self.replacements.apply(content);
        render(&replaced, self.bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn bindings(pairs: &[(&str, &str)]) -> VariableBindings {
        let mut b = VariableBindings::new();
        for (k, v) in pairs {
            b.insert(*k, *v).unwrap();
        }
        b
    }

    #[test]
    fn substitutes_bound_placeholders() {
        let out = render("Hello {{PROJECT_NAME}}", &bindings(&[("PROJECT_NAME", "Acme")]));
        assert_eq!(out.content, "Hello Acme");
        assert!(out.is_complete());
    }

    #[test]
    fn reports_unbound_placeholders() {
        let out = render("{{A}} {{B}} {{A}}", &bindings(&[("A", "1")]));
        assert_eq!(out.content, "1 {{B}} 1");
        assert_eq!(out.unresolved.into_iter().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn substitution_is_not_recursive() {
        let b = bindings(&[("A", "{{B}}"), ("B", "boom")]);
        let out = render("{{A}}", &b);
        assert_eq!(out.content, "{{B}}");
        // The output scan still reports what is left behind.
        assert!(out.unresolved.contains("B"));
    }

    #[test]
    fn foreign_brace_syntax_untouched() {
        let text = "resource \"x\" { name = \"${var.name}\" }\nrun: ${{ env.X }}\n{\"k\": {\"v\": 1}}";
        let out = render(text, &bindings(&[("NAME", "n")]));
        assert_eq!(out.content, text);
        assert!(out.is_complete());
    }

    #[test]
    fn placeholder_before_closing_brace_is_rendered() {
        let b = bindings(&[("PORT", "8080")]);
        let r = LiteralReplacements::default();
        let renderer = TemplateRenderer::new(&b, &r);

        let out = renderer.genericize(r#"{"port":{{PORT}}}"#);
        assert_eq!(out.content, r#"{"port":8080}"#);
        assert!(out.is_complete());

        let out = renderer.genericize(r#"{"owner":{{OWNER}}}"#);
        assert_eq!(out.content, r#"{"owner":{{OWNER}}}"#);
        assert_eq!(out.unresolved.into_iter().collect::<Vec<_>>(), vec!["OWNER"]);
    }

    #[test]
    fn whitelisted_placeholders_leave_nothing_unresolved() {
        let b = bindings(&[
            ("PROJECT_NAME", "Acme"),
            ("AUTHOR", "Team"),
            ("GENERATED_DATE", "2024-01-01"),
        ]);
        let out = render("# {{PROJECT_NAME}}\nby {{AUTHOR}} on {{GENERATED_DATE}}\n", &b);
        assert!(out.unresolved.is_empty());
        assert_eq!(out.content, "# Acme\nby Team on 2024-01-01\n");
    }

    #[test]
    fn genericize_applies_longest_replacement_then_placeholders() {
        let b = bindings(&[("APP", "shop"), ("APP_BETA", "shop-preview")]);
        let mut map = BTreeMap::new();
        map.insert("app".to_string(), "{{APP}}".to_string());
        map.insert("app-beta".to_string(), "{{APP_BETA}}".to_string());
        let r = LiteralReplacements::new(&map).unwrap();

        let out = TemplateRenderer::new(&b, &r).genericize("app-beta-v2 and app");
        assert_eq!(out.content, "shop-preview-v2 and shop");
        assert!(out.is_complete());
    }

    #[test]
    fn render_with_adds_path_variables() {
        let b = bindings(&[("PROJECT_NAME", "acme")]);
        let r = LiteralReplacements::default();
        let renderer = TemplateRenderer::new(&b, &r);

        let out = renderer.render_with(
            "{{PROJECT_NAME}}/{{REL_SUFFIX}}",
            [("REL_SUFFIX", "docs/a.md".to_string())],
        );
        assert_eq!(out.content, "acme/docs/a.md");
    }
}
