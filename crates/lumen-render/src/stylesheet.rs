//! Embedded `<style>` sheets of imported documents.
//!
//! A sheet left in the output would apply to the whole exported document,
//! so its rules are resolved per element at parse time and written into
//! each element's inline `style`. Only compound selectors made of tag, id
//! and class parts are understood; other rules are skipped with a warning.

use lumen_common::warning::warn_once;

/// `(ids, classes, tags)`.
type Specificity = (usize, usize, usize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut selector = Self::default();
        let mut rest = text;
        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
        } else {
            let end = rest.find(['.', '#']).unwrap_or(rest.len());
            if end > 0 {
                selector.tag = Some(identifier(&rest[..end])?.to_string());
            }
            rest = &rest[end..];
        }
        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = identifier(&body[..end])?.to_string();
            match marker {
                '.' => selector.classes.push(name),
                '#' if selector.id.is_none() => selector.id = Some(name),
                _ => return None,
            }
            rest = &body[end..];
        }
        Some(selector)
    }

    fn specificity(&self) -> Specificity {
        (
            usize::from(self.id.is_some()),
            self.classes.len(),
            usize::from(self.tag.is_some()),
        )
    }

    fn matches(&self, tag: &str, id: Option<&str>, classes: &[&str]) -> bool {
        self.tag.as_deref().is_none_or(|t| t == tag)
            && self.id.as_deref().is_none_or(|want| id == Some(want))
            && self
                .classes
                .iter()
                .all(|class| classes.contains(&class.as_str()))
    }
}

fn identifier(text: &str) -> Option<&str> {
    let valid = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then_some(text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    selector: Selector,
    order: usize,
    declarations: Vec<(String, String)>,
}

/// The rules of every `<style>` element in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    rules: Vec<Rule>,
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = rest[start + 2..]
            .find("*/")
            .map_or("", |end| &rest[start + 2 + end + 2..]);
    }
    out.push_str(rest);
    out
}

/// Split `prelude { body }` blocks at nesting depth zero.
fn blocks(text: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut depth = 0_usize;
    let mut prelude_start = 0;
    let mut body_start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    body_start = i + 1;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let prelude = &text[prelude_start..body_start - 1];
                    out.push((prelude, &text[body_start..i]));
                    prelude_start = i + 1;
                }
            }
            _ => {}
        }
    }
    out
}

/// `prop: value` pairs with `!important` dropped.
pub(crate) fn declarations(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.split(';').filter_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        let prop = prop.trim();
        let value = value.trim();
        let value = value
            .strip_suffix("!important")
            .map_or(value, str::trim_end);
        (!prop.is_empty() && !value.is_empty()).then_some((prop, value))
    })
}

impl StyleSheet {
    /// Parse one sheet's text and append its rules.
    pub fn extend(&mut self, text: &str) {
        let text = strip_comments(text);
        for (prelude, body) in blocks(&text) {
            let prelude = prelude.trim();
            if prelude.starts_with('@') {
                let at_rule = prelude.split_whitespace().next().unwrap_or("@");
                let _ = warn_once(
                    "vector",
                    &format!("ignored {at_rule} rule in imported stylesheet"),
                );
                continue;
            }
            let declarations: Vec<(String, String)> = declarations(body)
                .map(|(p, v)| (p.to_ascii_lowercase(), v.to_string()))
                .collect();
            if declarations.is_empty() {
                continue;
            }
            for raw in prelude.split(',') {
                let Some(selector) = Selector::parse(raw) else {
                    let raw = raw.trim();
                    let _ = warn_once(
                        "vector",
                        &format!("unsupported selector '{raw}' in imported stylesheet"),
                    );
                    continue;
                };
                let order = self.rules.len();
                self.rules.push(Rule {
                    selector,
                    order,
                    declarations: declarations.clone(),
                });
            }
        }
    }

    /// No usable rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The cascaded inline style for an element: matching rules by
    /// specificity then source order, with the element's own `style`
    /// last. `None` when no rule matches.
    #[must_use]
    pub fn inline_style(
        &self,
        tag: &str,
        id: Option<&str>,
        classes: &[&str],
        own: Option<&str>,
    ) -> Option<String> {
        let mut matching: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.selector.matches(tag, id, classes))
            .collect();
        if matching.is_empty() {
            return None;
        }
        matching.sort_by_key(|rule| (rule.selector.specificity(), rule.order));

        let mut merged: Vec<(String, String)> = Vec::new();
        let own = own
            .into_iter()
            .flat_map(declarations)
            .map(|(p, v)| (p.to_ascii_lowercase(), v.to_string()));
        let cascaded = matching
            .iter()
            .flat_map(|rule| rule.declarations.iter().cloned())
            .chain(own);
        for (prop, value) in cascaded {
            match merged.iter_mut().find(|(p, _)| *p == prop) {
                Some(slot) => slot.1 = value,
                None => merged.push((prop, value)),
            }
        }
        Some(
            merged
                .iter()
                .map(|(p, v)| format!("{p}:{v}"))
                .collect::<Vec<_>>()
                .join(";"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(text: &str) -> StyleSheet {
        let mut sheet = StyleSheet::default();
        sheet.extend(text);
        sheet
    }

    #[test]
    fn test_selector_forms() {
        let s = Selector::parse("rect.a.b#x").unwrap();
        assert_eq!(s.tag.as_deref(), Some("rect"));
        assert_eq!(s.id.as_deref(), Some("x"));
        assert_eq!(s.classes, ["a", "b"]);
        assert_eq!(s.specificity(), (1, 2, 1));
        assert_eq!(Selector::parse("*").unwrap().specificity(), (0, 0, 0));
        assert!(Selector::parse("g rect").is_none());
        assert!(Selector::parse("a:hover").is_none());
        assert!(Selector::parse("rect[fill]").is_none());
    }

    #[test]
    fn test_cascade_order() {
        let sheet = sheet(concat!(
            "/* art */ #x{fill:green} .a{fill:red;stroke:black} ",
            "rect{fill:gray;opacity:.5} .a{stroke:blue !important}",
        ));
        let styled = sheet.inline_style("rect", Some("x"), &["a"], None);
        assert_eq!(styled.as_deref(), Some("fill:green;opacity:.5;stroke:blue"));
        let styled = sheet.inline_style("rect", None, &["a"], Some("fill: pink"));
        assert_eq!(styled.as_deref(), Some("fill:pink;opacity:.5;stroke:blue"));
        assert_eq!(sheet.inline_style("circle", None, &[], None), None);
    }

    #[test]
    fn test_grouped_selectors_and_at_rules() {
        let sheet = sheet(concat!(
            "@media print { .a { fill: red } } ",
            ".a, .b { fill: #0f0 } g > .c { fill: red }",
        ));
        let styled = sheet.inline_style("path", None, &["b"], None);
        assert_eq!(styled.as_deref(), Some("fill:#0f0"));
        assert_eq!(sheet.inline_style("path", None, &["c"], None), None);
        assert!(!sheet.is_empty());
    }
}
