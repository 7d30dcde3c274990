//! DOM Element - a node of the page tree with attributes, classes and content.

use std::collections::BTreeMap;

/// Index of an element inside its `Document`.
pub type NodeId = usize;

/// What an element renders as its own content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Plain text, rendered escaped
    Text(String),
    /// Markup, rendered as HTML
    Markup(String),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

/// A DOM element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    content: Content,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            content: Content::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(self, id: &str) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle `class`; returns whether it is present afterwards.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Own text content; markup is returned as its source.
    pub fn text(&self) -> &str {
        match &self.content {
            Content::Text(text) | Content::Markup(text) => text,
        }
    }

    /// Replace the element's own text.
    ///
    /// Unlike a browser's `textContent`, child elements are kept: the legacy
    /// language selector relies on this to keep its `.globe-icon` while its
    /// label changes.
    pub fn set_text(&mut self, text: &str) {
        self.content = Content::Text(text.to_string());
    }

    /// Replace the element's own content with markup. Child elements are
    /// kept, as with `set_text`, where `innerHTML` would replace them.
    pub fn set_markup(&mut self, markup: &str) {
        self.content = Content::Markup(markup.to_string());
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_operations() {
        let mut el = Element::new("DIV").with_class("faq-item");
        assert_eq!(el.tag(), "div");
        assert!(el.has_class("faq-item"));

        el.add_class("faq-item");
        assert_eq!(el.classes().len(), 1);

        assert!(el.toggle_class("open"));
        assert!(!el.toggle_class("open"));
        assert!(!el.has_class("open"));
    }

    #[test]
    fn test_attributes() {
        let mut el = Element::new("input").with_id("email").with_attr("data-field", "email");
        assert_eq!(el.id(), Some("email"));
        assert!(el.has_attribute("data-field"));
        el.remove_attribute("data-field");
        assert!(!el.has_attribute("data-field"));
    }

    #[test]
    fn test_content_modes() {
        let mut el = Element::new("p").with_text("Hello");
        assert_eq!(el.content(), &Content::Text("Hello".to_string()));

        el.set_markup("Line<br>break");
        assert_eq!(el.content(), &Content::Markup("Line<br>break".to_string()));
        assert_eq!(el.text(), "Line<br>break");
    }
}
