//! Minimal CSS selector engine.
//!
//! Supported grammar:
//!
//! | Form | Example |
//! |------|---------|
//! | type / universal | `div`, `*` |
//! | id | `#main` |
//! | class | `.item` |
//! | attribute | `[name]`, `[type=text]`, `[data-x="a b"]` |
//! | descendant | `ul li` |
//! | child | `ul > li` |
//! | group | `h1, h2` |

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::identifiers::NodeId;

use super::tree::Tree;

// ============================================================================
// Patterns
// ============================================================================

static TYPE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*|[A-Za-z][A-Za-z0-9-]*)").expect("type selector pattern is valid")
});

static SIMPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"#(?P<id>[\w-]+)|\.(?P<class>[\w-]+)|\[\s*(?P<attr>[\w-]+)\s*(?:=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\]\s"']+))\s*)?\]"#,
    )
    .expect("simple selector pattern is valid")
});

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttrCondition>,
}

/// Compounds joined by combinators; `combinators[i]` sits between
/// `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// A parsed comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorGroup {
    alternatives: Vec<Complex>,
}

// ============================================================================
// Parsing
// ============================================================================

impl SelectorGroup {
    /// Parses a selector list.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSelector`] on anything outside the supported grammar.
    pub fn parse(selector: &str) -> Result<Self> {
        let alternatives = split_outside_brackets(selector, ',')
            .into_iter()
            .map(|part| parse_complex(selector, part.trim()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives })
    }

    /// Returns `true` if element `id` matches any alternative.
    pub(super) fn matches(&self, tree: &Tree, id: &NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(tree, id, complex.compounds.len() - 1))
    }
}

fn split_outside_brackets(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(full: &str, input: &str) -> Result<Complex> {
    if input.is_empty() {
        return Err(Error::invalid_selector(full, "empty selector"));
    }

    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut current = String::new();
    let mut pending: Option<Combinator> = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        let structural = quote.is_none() && depth == 0;
        if structural && (c.is_whitespace() || c == '>') {
            if !current.is_empty() {
                compounds.push(parse_compound(full, &current)?);
                current.clear();
            }
            if c == '>' {
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return Err(Error::invalid_selector(full, "dangling '>' combinator"));
                }
                pending = Some(Combinator::Child);
            } else if !compounds.is_empty() && pending.is_none() {
                pending = Some(Combinator::Descendant);
            }
            continue;
        }

        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            _ => {}
        }

        if current.is_empty() {
            if let Some(combinator) = pending.take() {
                combinators.push(combinator);
            }
        }
        current.push(c);
    }

    if quote.is_some() || depth != 0 {
        return Err(Error::invalid_selector(full, "unterminated attribute selector"));
    }
    if !current.is_empty() {
        compounds.push(parse_compound(full, &current)?);
    } else if pending == Some(Combinator::Child) {
        return Err(Error::invalid_selector(full, "dangling '>' combinator"));
    }

    Ok(Complex {
        compounds,
        combinators,
    })
}

fn parse_compound(full: &str, input: &str) -> Result<Compound> {
    let mut compound = Compound::default();
    let mut pos = 0;

    if let Some(m) = TYPE_PREFIX.find(input) {
        if m.as_str() != "*" {
            compound.tag = Some(m.as_str().to_ascii_lowercase());
        }
        pos = m.end();
    }

    let rest = &input[pos..];
    let mut consumed = 0;
    for caps in SIMPLE.captures_iter(rest) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() != consumed {
            break;
        }
        consumed = whole.end();

        if let Some(id) = caps.name("id") {
            compound.id = Some(id.as_str().to_string());
        } else if let Some(class) = caps.name("class") {
            compound.classes.push(class.as_str().to_string());
        } else if let Some(attr) = caps.name("attr") {
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().to_string());
            compound.attributes.push(AttrCondition {
                name: attr.as_str().to_ascii_lowercase(),
                value,
            });
        }
    }

    if consumed != rest.len() {
        return Err(Error::invalid_selector(
            full,
            format!("unsupported syntax near '{}'", &rest[consumed..]),
        ));
    }

    Ok(compound)
}

// ============================================================================
// Matching
// ============================================================================

impl Complex {
    fn matches_at(&self, tree: &Tree, id: &NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, id) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent_element(id)
                .is_some_and(|parent| self.matches_at(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = tree.parent_element(id);
                while let Some(node) = ancestor {
                    if self.matches_at(tree, node, index - 1) {
                        return true;
                    }
                    ancestor = tree.parent_element(node);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, tree: &Tree, id: &NodeId) -> bool {
        let Ok(node) = tree.node(id) else {
            return false;
        };
        let Some(tag) = node.tag() else {
            return false;
        };

        if self.tag.as_deref().is_some_and(|want| want != tag) {
            return false;
        }
        if let Some(want) = &self.id
            && node.attribute("id") != Some(want.as_str())
        {
            return false;
        }
        if !self.classes.is_empty() {
            let classes = node.attribute("class").unwrap_or_default();
            if !self
                .classes
                .iter()
                .all(|want| classes.split_whitespace().any(|c| c == want))
            {
                return false;
            }
        }
        self.attributes.iter().all(|cond| match (&cond.value, node.attribute(&cond.name)) {
            (None, actual) => actual.is_some(),
            (Some(want), Some(actual)) => want == actual,
            (Some(_), None) => false,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
