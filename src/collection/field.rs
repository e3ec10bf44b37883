//! Semantic field table.
//!
//! Every readable/writable field maps to one access path on the host:
//!
//! | Access | Host call | Fields |
//! |--------|-----------|--------|
//! | [`Access::Property`] | `get_property` / `set_property` | id, title, metrics, html, text, ... |
//! | [`Access::Attribute`] | `get_attribute` / `set_attribute` | name, type, href, src |
//! | [`Access::ValueAlias`] | property chosen by tag | value |
//!
//! Attribute-backed fields must round-trip through the attribute interface
//! to reflect correctly.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Access
// ============================================================================

/// How a [`Field`] reaches the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Direct property access with this key.
    Property(&'static str),
    /// Attribute get/set with this name.
    Attribute(&'static str),
    /// `value` on form controls, `innerHTML` elsewhere.
    ValueAlias,
}

/// Tags whose `value` alias maps to the native `value` property.
pub(crate) const VALUE_TAGS: &[&str] = &["input", "textarea", "select"];

// ============================================================================
// Field
// ============================================================================

/// A semantic field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "className")]
    ClassName,
    #[serde(rename = "clientWidth")]
    ClientWidth,
    #[serde(rename = "clientHeight")]
    ClientHeight,
    #[serde(rename = "offsetWidth")]
    OffsetWidth,
    #[serde(rename = "offsetHeight")]
    OffsetHeight,
    #[serde(rename = "offsetTop")]
    OffsetTop,
    #[serde(rename = "offsetLeft")]
    OffsetLeft,
    #[serde(rename = "scrollWidth")]
    ScrollWidth,
    #[serde(rename = "scrollHeight")]
    ScrollHeight,
    #[serde(rename = "scrollTop")]
    ScrollTop,
    #[serde(rename = "scrollLeft")]
    ScrollLeft,
    #[serde(rename = "readonly")]
    ReadOnly,
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "outerHtml")]
    OuterHtml,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "style")]
    Style,
    #[serde(rename = "data")]
    Dataset,
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "href")]
    Href,
    #[serde(rename = "src")]
    Src,
    #[serde(rename = "value")]
    Value,
}

impl Field {
    /// Every field, in table order.
    pub const ALL: [Field; 24] = [
        Self::Id,
        Self::Title,
        Self::ClassName,
        Self::ClientWidth,
        Self::ClientHeight,
        Self::OffsetWidth,
        Self::OffsetHeight,
        Self::OffsetTop,
        Self::OffsetLeft,
        Self::ScrollWidth,
        Self::ScrollHeight,
        Self::ScrollTop,
        Self::ScrollLeft,
        Self::ReadOnly,
        Self::Html,
        Self::OuterHtml,
        Self::Text,
        Self::Style,
        Self::Dataset,
        Self::Name,
        Self::Type,
        Self::Href,
        Self::Src,
        Self::Value,
    ];

    /// The semantic name callers use.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::ClassName => "className",
            Self::ClientWidth => "clientWidth",
            Self::ClientHeight => "clientHeight",
            Self::OffsetWidth => "offsetWidth",
            Self::OffsetHeight => "offsetHeight",
            Self::OffsetTop => "offsetTop",
            Self::OffsetLeft => "offsetLeft",
            Self::ScrollWidth => "scrollWidth",
            Self::ScrollHeight => "scrollHeight",
            Self::ScrollTop => "scrollTop",
            Self::ScrollLeft => "scrollLeft",
            Self::ReadOnly => "readonly",
            Self::Html => "html",
            Self::OuterHtml => "outerHtml",
            Self::Text => "text",
            Self::Style => "style",
            Self::Dataset => "data",
            Self::Name => "name",
            Self::Type => "type",
            Self::Href => "href",
            Self::Src => "src",
            Self::Value => "value",
        }
    }

    /// The host access path.
    #[must_use]
    pub fn access(self) -> Access {
        match self {
            Self::Id => Access::Property("id"),
            Self::Title => Access::Property("title"),
            Self::ClassName => Access::Property("className"),
            Self::ClientWidth => Access::Property("clientWidth"),
            Self::ClientHeight => Access::Property("clientHeight"),
            Self::OffsetWidth => Access::Property("offsetWidth"),
            Self::OffsetHeight => Access::Property("offsetHeight"),
            Self::OffsetTop => Access::Property("offsetTop"),
            Self::OffsetLeft => Access::Property("offsetLeft"),
            Self::ScrollWidth => Access::Property("scrollWidth"),
            Self::ScrollHeight => Access::Property("scrollHeight"),
            Self::ScrollTop => Access::Property("scrollTop"),
            Self::ScrollLeft => Access::Property("scrollLeft"),
            Self::ReadOnly => Access::Property("readOnly"),
            Self::Html => Access::Property("innerHTML"),
            Self::OuterHtml => Access::Property("outerHTML"),
            Self::Text => Access::Property("textContent"),
            Self::Style => Access::Property("style"),
            Self::Dataset => Access::Property("dataset"),
            Self::Name => Access::Attribute("name"),
            Self::Type => Access::Attribute("type"),
            Self::Href => Access::Attribute("href"),
            Self::Src => Access::Attribute("src"),
            Self::Value => Access::ValueAlias,
        }
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| Error::unknown_field(name))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
