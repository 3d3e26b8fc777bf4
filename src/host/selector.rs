// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Structural element selector covering the handful of CSS shapes the host
//! form contract needs (tag, id, classes, exact attribute values).

use std::fmt;

use super::document::Element;

/// Compound selector; every populated part must match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a tag-only selector.
    pub fn tag(tag: &str) -> Self {
        Self::new().with_tag(tag)
    }

    /// Shorthand for a class-only selector.
    pub fn class(class: &str) -> Self {
        Self::new().with_class(class)
    }

    /// Shorthand for an id selector.
    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_ascii_lowercase());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && element.tag() != tag.as_str()
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.attr("id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs
            .iter()
            .all(|(name, value)| element.attr(name) == Some(value.as_str()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for (name, value) in &self.attrs {
            write!(f, "[{name}=\"{value}\"]")?;
        }
        if self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            f.write_str("*")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_as_css() {
        let sel = Selector::tag("input")
            .with_attr("type", "radio")
            .with_attr("name", "purchase[product_id]");
        assert_eq!(
            sel.to_string(),
            r#"input[type="radio"][name="purchase[product_id]"]"#
        );
        assert_eq!(Selector::class("orderFormBump").to_string(), ".orderFormBump");
        assert_eq!(Selector::new().to_string(), "*");
    }

    #[test]
    fn matches_every_part() {
        let mut el = Element::new("INPUT");
        el.set_attr("type", "radio");
        el.set_attr("value", "100");
        el.add_class("pick");

        assert!(Selector::tag("input").with_attr("value", "100").matches(&el));
        assert!(Selector::class("pick").matches(&el));
        assert!(!Selector::tag("input").with_attr("value", "200").matches(&el));
        assert!(!Selector::tag("select").matches(&el));
        assert!(!Selector::id("x").matches(&el));
    }
}
