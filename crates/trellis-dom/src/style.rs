//! Inline style declarations and cascading style sheets.

use std::fmt;

/// An ordered list of `property: value` declarations.
///
/// Property names given in camelCase are stored in kebab-case, so
/// `fontSize` and `font-size` address the same declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style(Vec<(String, String)>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, property: &str, value: impl Into<String>) -> Self {
        self.insert(property, value);
        self
    }

    pub fn insert(&mut self, property: &str, value: impl Into<String>) {
        let property = kebab_case(property);
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property, value)),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        let property = kebab_case(property);
        self.0
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let property = kebab_case(property);
        let pos = self.0.iter().position(|(p, _)| *p == property)?;
        Some(self.0.remove(pos).1)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Parse `a: b; c: d`. Malformed declarations are skipped.
    pub fn parse(css: &str) -> Self {
        let mut style = Style::new();
        for decl in css.split(';') {
            let Some((property, value)) = decl.split_once(':') else {
                continue;
            };
            let (property, value) = (property.trim(), value.trim());
            if property.is_empty() || value.is_empty() {
                continue;
            }
            style.insert(property, value);
        }
        style
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(p, v)| format!("{p}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// This style with `display` forced to `none`.
    pub fn hidden(&self) -> Style {
        self.clone().set("display", "none !important")
    }
}

impl From<&str> for Style {
    fn from(css: &str) -> Self {
        Style::parse(css)
    }
}

impl<P: AsRef<str>, V: Into<String>> FromIterator<(P, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut style = Style::new();
        for (p, v) in iter {
            style.insert(p.as_ref(), v);
        }
        style
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Selector-scoped rules, realized as a `<style>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleSheet(Vec<(String, Style)>);

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, selector: impl Into<String>, style: impl Into<Style>) -> Self {
        self.0.push((selector.into(), style.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(selector, style)| format!("{selector} {{ {} }}", style.to_css()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn kebab_case(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let style = Style::parse("color: red; ; broken; fontSize: 12px");
        assert_eq!(style.get("font-size"), Some("12px"));
        assert_eq!(style.to_css(), "color: red; font-size: 12px;");
    }

    #[test]
    fn test_hidden_overrides_display() {
        let style = Style::new().set("display", "flex").set("color", "blue");
        assert_eq!(
            style.hidden().to_css(),
            "display: none !important; color: blue;"
        );
        assert_eq!(style.get("display"), Some("flex"));
    }

    #[test]
    fn test_custom_properties_keep_their_case() {
        let style: Style = [("--mainColor", "red"), ("backgroundColor", "blue")]
            .into_iter()
            .collect();
        assert_eq!(style.to_css(), "--mainColor: red; background-color: blue;");
    }

    #[test]
    fn test_stylesheet() {
        let sheet = StyleSheet::new()
            .rule(".card", "padding: 4px")
            .rule(".card:hover", Style::new().set("color", "red"));
        assert_eq!(
            sheet.to_css(),
            ".card { padding: 4px; }\n.card:hover { color: red; }"
        );
    }
}
