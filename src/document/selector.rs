//! Typed CSS selectors
//!
//! A small selector model covering what the page enhancements look up:
//! compound selectors (tag, id, classes, attributes), descendant chains and
//! comma-separated groups. Browser documents render it to CSS text; the
//! in-memory document matches it structurally.

use std::fmt;

/// Attribute condition inside a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: String,
    /// `None` means presence only (`[name]`)
    pub value: Option<String>,
}

/// A single compound selector such as `small[data-created-at]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

/// A group of descendant chains (`a b, c`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    fn single(compound: Compound) -> Self {
        Self {
            alternatives: vec![vec![compound]],
        }
    }

    /// `#id`
    pub fn id(id: impl Into<String>) -> Self {
        Self::single(Compound {
            id: Some(id.into()),
            ..Default::default()
        })
    }

    /// `.class`
    pub fn class(class: impl Into<String>) -> Self {
        Self::single(Compound {
            classes: vec![class.into()],
            ..Default::default()
        })
    }

    /// `tag`
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::single(Compound {
            tag: Some(tag.into().to_ascii_lowercase()),
            ..Default::default()
        })
    }

    fn last_compound(&mut self) -> &mut Compound {
        if self.alternatives.is_empty() {
            self.alternatives.push(Vec::new());
        }
        let last = self.alternatives.len() - 1;
        let chain = &mut self.alternatives[last];
        if chain.is_empty() {
            chain.push(Compound::default());
        }
        let tail = chain.len() - 1;
        &mut chain[tail]
    }

    /// Add a class to the rightmost compound
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.last_compound().classes.push(class.into());
        self
    }

    /// Require attribute presence on the rightmost compound
    pub fn with_attr(mut self, name: impl Into<String>) -> Self {
        self.last_compound().attrs.push(AttrMatch {
            name: name.into(),
            value: None,
        });
        self
    }

    /// Require an exact attribute value on the rightmost compound
    pub fn with_attr_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.last_compound().attrs.push(AttrMatch {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// `self descendant` for every alternative of `self` and `descendant`
    pub fn descendant(self, descendant: Selector) -> Self {
        let mut alternatives = Vec::new();
        for ancestor in &self.alternatives {
            for tail in &descendant.alternatives {
                let mut chain = ancestor.clone();
                chain.extend(tail.iter().cloned());
                alternatives.push(chain);
            }
        }
        Self { alternatives }
    }

    /// `self, other`
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    /// Descendant chains, outermost compound first
    pub fn alternatives(&self) -> &[Vec<Compound>] {
        &self.alternatives
    }
}

fn write_attr_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in value.chars() {
        match c {
            '\'' | '\\' => write!(f, "\\{}", c)?,
            '\n' => f.write_str("\\a ")?,
            _ => write!(f, "{}", c)?,
        }
    }
    f.write_str("'")
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut empty = true;
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
            empty = false;
        }
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
            empty = false;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
            empty = false;
        }
        for attr in &self.attrs {
            write!(f, "[{}", attr.name)?;
            if let Some(value) = &attr.value {
                f.write_str("=")?;
                write_attr_value(f, value)?;
            }
            f.write_str("]")?;
            empty = false;
        }
        if empty {
            f.write_str("*")?;
        }
        Ok(())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, compound) in chain.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", compound)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_compound_selectors() {
        assert_eq!(Selector::id("theme-toggle").to_string(), "#theme-toggle");
        assert_eq!(
            Selector::tag("small").with_attr("data-created-at").to_string(),
            "small[data-created-at]"
        );
        assert_eq!(
            Selector::class("category-card-container")
                .with_attr_value("data-category-id", "1")
                .to_string(),
            ".category-card-container[data-category-id='1']"
        );
    }

    #[test]
    fn test_renders_descendants_and_groups() {
        let stats = Selector::class("stat-item").descendant(Selector::tag("h3"));
        assert_eq!(stats.to_string(), ".stat-item h3");

        let cards = Selector::class("category-card").or(Selector::class("job-card"));
        assert_eq!(cards.to_string(), ".category-card, .job-card");

        let scoped = cards.descendant(Selector::tag("a"));
        assert_eq!(scoped.to_string(), ".category-card a, .job-card a");
    }

    #[test]
    fn test_escapes_attribute_values() {
        let sel = Selector::class("c").with_attr_value("data-category-id", "o'brien");
        assert_eq!(sel.to_string(), ".c[data-category-id='o\\'brien']");
    }
}
