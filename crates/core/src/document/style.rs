use std::fmt;

/// Declarations of an element's `style` attribute, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    /// Parse `prop: value; prop: value`. Malformed declarations are dropped.
    pub fn parse(source: &str) -> Self {
        let mut style = Self::default();
        for declaration in source.split(';') {
            if let Some((property, value)) = declaration.split_once(':') {
                let property = property.trim();
                let value = value.trim();
                if !property.is_empty() && !value.is_empty() {
                    style.set(property, value);
                }
            }
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(property))
            .map(|(_, v)| v.as_str())
    }

    /// Set a declaration, replacing an existing one in place.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let property = property.to_ascii_lowercase();
        let value = value.into();
        match self.declarations.iter_mut().find(|(p, _)| *p == property) {
            Some(existing) => existing.1 = value,
            None => self.declarations.push((property, value)),
        }
    }

    pub fn remove(&mut self, property: &str) {
        self.declarations
            .retain(|(p, _)| !p.eq_ignore_ascii_case(property));
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(p, v)| (p.as_str(), v.as_str()))
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", property, value)?;
        }
        Ok(())
    }
}

/// Inherited font properties resolved for one element.
///
/// `None` means no element on the ancestor chain sets the property, i.e. the
/// renderer default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedFont {
    pub font_size: Option<String>,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let style = InlineStyle::parse("Font-Size: 14px;; color:red ; bogus; margin:");
        assert_eq!(style.get("font-size"), Some("14px"));
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("margin"), None);
        assert_eq!(style.to_string(), "font-size: 14px; color: red;");
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = InlineStyle::parse("color: red; display: block");
        style.set("COLOR", "blue");
        style.remove("display");
        assert_eq!(style.to_string(), "color: blue;");
    }
}
