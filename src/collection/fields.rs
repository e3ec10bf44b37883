//! Field reads and writes through the [`Field`] table.

use futures_util::future::try_join_all;
use rustc_hash::FxHashSet;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::{Target, stringify};
use crate::identifiers::NodeId;

use super::Collection;
use super::field::{Access, Field, VALUE_TAGS};

// ============================================================================
// Collection - Fields
// ============================================================================

impl Collection {
    /// Reads `field` from every held target, in order.
    ///
    /// # Errors
    ///
    /// [`Error::NotAnElement`] for attribute or `value` reads on a root.
    pub async fn get_field(&self, field: Field) -> Result<Vec<Value>> {
        let targets = self.targets();
        let values = try_join_all(targets.iter().map(|t| self.read(t, field))).await?;

        debug!(%field, count = values.len(), "Read field");
        Ok(values)
    }

    /// Writes `value` to `field` on every held target.
    ///
    /// Attribute fields store the string form of non-string values.
    pub async fn set_field(&self, field: Field, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let targets = self.targets();
        for target in &targets {
            self.write(target, field, value.clone()).await?;
        }

        debug!(%field, count = targets.len(), "Wrote field");
        Ok(())
    }

    /// Reads a field by semantic name.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownField`] when `name` is not a known field.
    pub async fn prop(&self, name: &str) -> Result<Vec<Value>> {
        self.get_field(name.parse()?).await
    }

    /// Writes a field by semantic name.
    pub async fn set_prop(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set_field(name.parse()?, value).await
    }

    /// `textContent` of every target.
    pub async fn text(&self) -> Result<Vec<Value>> {
        self.get_field(Field::Text).await
    }

    /// Sets `textContent` on every target.
    pub async fn set_text(&self, text: impl Into<Value>) -> Result<()> {
        self.set_field(Field::Text, text).await
    }

    /// `innerHTML` of every target.
    pub async fn html(&self) -> Result<Vec<Value>> {
        self.get_field(Field::Html).await
    }

    /// Sets `innerHTML` on every target.
    pub async fn set_html(&self, html: impl Into<Value>) -> Result<()> {
        self.set_field(Field::Html, html).await
    }

    /// Form value, or markup for non-form elements.
    pub async fn value(&self) -> Result<Vec<Value>> {
        self.get_field(Field::Value).await
    }

    /// Sets the form value, or markup for non-form elements.
    pub async fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        self.set_field(Field::Value, value).await
    }
}

// ============================================================================
// Collection - Classes
// ============================================================================

impl Collection {
    /// Class names across every held target, split on whitespace.
    ///
    /// First occurrence wins; duplicates are dropped. Targets without a
    /// class name contribute nothing.
    pub async fn classes(&self) -> Result<Vec<String>> {
        let names = self.get_field(Field::ClassName).await?;
        let mut seen = FxHashSet::default();
        let mut classes = Vec::new();

        for name in names.iter().filter_map(Value::as_str) {
            for class in name.split_whitespace() {
                if seen.insert(class) {
                    classes.push(class.to_string());
                }
            }
        }
        Ok(classes)
    }

    /// Sets the class list of every held target, joined with spaces.
    pub async fn set_classes<I>(&self, classes: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let joined = classes
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.set_field(Field::ClassName, joined).await
    }
}

// ============================================================================
// Access
// ============================================================================

impl Collection {
    async fn read(&self, target: &Target, field: Field) -> Result<Value> {
        let host = &self.inner.host;
        match field.access() {
            Access::Property(key) => host.get_property(target, key).await,
            Access::Attribute(name) => {
                let node = element(target, field)?;
                Ok(host
                    .get_attribute(node, name)
                    .await?
                    .map_or(Value::Null, Value::String))
            }
            Access::ValueAlias => {
                let key = self.value_key(target, field).await?;
                host.get_property(target, key).await
            }
        }
    }

    async fn write(&self, target: &Target, field: Field, value: Value) -> Result<()> {
        let host = &self.inner.host;
        match field.access() {
            Access::Property(key) => host.set_property(target, key, value).await,
            Access::Attribute(name) => {
                let node = element(target, field)?;
                host.set_attribute(node, name, &stringify(&value)).await
            }
            Access::ValueAlias => {
                let key = self.value_key(target, field).await?;
                host.set_property(target, key, value).await
            }
        }
    }

    async fn value_key(&self, target: &Target, field: Field) -> Result<&'static str> {
        let node = element(target, field)?;
        let tag = self.inner.host.tag_name(node).await?;
        Ok(if VALUE_TAGS.contains(&tag.as_str()) {
            "value"
        } else {
            "innerHTML"
        })
    }
}

fn element(target: &Target, field: Field) -> Result<&NodeId> {
    target
        .node()
        .ok_or_else(|| Error::not_an_element(format!("access '{field}'")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::Dom;
    use crate::host::MemoryDocument;

    #[tokio::test]
    async fn test_value_roundtrip_on_input() {
        let doc = MemoryDocument::new();
        doc.insert(None, "input", &[("type", "text")]).unwrap();
        let dom = Dom::new(doc);
        let input = dom.select("input").await.unwrap();

        input.set_value("hello").await.unwrap();
        assert_eq!(input.value().await.unwrap(), vec![json!("hello")]);
        assert_eq!(input.html().await.unwrap(), vec![json!("")]);
    }

    #[tokio::test]
    async fn test_value_on_div_writes_markup() {
        let doc = MemoryDocument::new();
        doc.insert(None, "div", &[]).unwrap();
        let dom = Dom::new(doc);
        let div = dom.select("div").await.unwrap();

        div.set_value("<b>bold</b>").await.unwrap();
        assert_eq!(div.html().await.unwrap(), vec![json!("<b>bold</b>")]);
        assert_eq!(div.value().await.unwrap(), vec![json!("<b>bold</b>")]);
    }

    #[tokio::test]
    async fn test_attribute_fields() {
        let doc = MemoryDocument::new();
        doc.insert(None, "a", &[("href", "/home")]).unwrap();
        doc.insert(None, "a", &[]).unwrap();
        let dom = Dom::new(doc);
        let links = dom.select("a").await.unwrap();

        assert_eq!(
            links.get_field(Field::Href).await.unwrap(),
            vec![json!("/home"), Value::Null]
        );

        links.set_prop("name", 7).await.unwrap();
        assert_eq!(links.prop("name").await.unwrap(), vec![json!("7"), json!("7")]);
    }

    #[tokio::test]
    async fn test_property_fields() {
        let doc = MemoryDocument::new();
        doc.insert(None, "p", &[("id", "intro"), ("data-user-id", "9")])
            .unwrap();
        let dom = Dom::new(doc);
        let p = dom.select("p").await.unwrap();

        assert_eq!(p.prop("id").await.unwrap(), vec![json!("intro")]);
        assert_eq!(p.prop("clientWidth").await.unwrap(), vec![json!(0)]);
        assert_eq!(p.prop("data").await.unwrap(), vec![json!({"userId": "9"})]);

        p.set_field(Field::ReadOnly, true).await.unwrap();
        assert_eq!(p.get_field(Field::ReadOnly).await.unwrap(), vec![json!(true)]);

        p.set_text("a < b").await.unwrap();
        assert_eq!(p.text().await.unwrap(), vec![json!("a < b")]);
        assert_eq!(
            p.get_field(Field::OuterHtml).await.unwrap(),
            vec![json!("<p id=\"intro\" data-user-id=\"9\" readonly=\"\">a &lt; b</p>")]
        );
    }

    #[tokio::test]
    async fn test_roots() {
        let dom = Dom::new(MemoryDocument::new());
        let document = dom.document();

        document.set_prop("title", "Home").await.unwrap();
        assert_eq!(document.prop("title").await.unwrap(), vec![json!("Home")]);

        let err = document.get_field(Field::Href).await.unwrap_err();
        assert!(err.is_element_error());
        let err = dom.window().set_value("x").await.unwrap_err();
        assert!(matches!(err, Error::NotAnElement { .. }));
    }

    #[tokio::test]
    async fn test_unknown_field() {
        let dom = Dom::new(MemoryDocument::new());
        let err = dom.window().prop("colour").await.unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }

    #[tokio::test]
    async fn test_classes_deduplicated_in_order() {
        let doc = MemoryDocument::new();
        doc.insert(None, "p", &[("class", "item  active")]).unwrap();
        doc.insert(None, "p", &[]).unwrap();
        doc.insert(None, "p", &[("class", "active wide item")]).unwrap();
        let dom = Dom::new(doc);
        let all = dom.select("p").await.unwrap();

        assert_eq!(all.classes().await.unwrap(), vec!["item", "active", "wide"]);
        assert!(dom.empty().classes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_classes_on_every_element() {
        let doc = MemoryDocument::new();
        doc.insert(None, "p", &[("class", "old")]).unwrap();
        doc.insert(None, "p", &[]).unwrap();
        let dom = Dom::new(doc);
        let all = dom.select("p").await.unwrap();

        all.set_classes(["a", "b"]).await.unwrap();
        assert_eq!(
            all.get_field(Field::ClassName).await.unwrap(),
            vec![json!("a b"), json!("a b")]
        );
        assert_eq!(dom.select("p.a.b").await.unwrap().len(), 2);

        all.set_classes(Vec::<String>::new()).await.unwrap();
        assert!(all.classes().await.unwrap().is_empty());
    }
}
