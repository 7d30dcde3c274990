//! DOM Document - element arena and tree queries.

use crate::dom::{Element, NodeId};
use std::collections::HashMap;

/// A page document: an arena of elements rooted at `<html>`.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    id_map: HashMap<String, NodeId>,
    title: String,
    path: String,
}

impl Document {
    /// Create a document for the page at `path` (e.g. `/static/form.html`).
    pub fn new(path: &str) -> Self {
        Self {
            nodes: vec![Element::new("html")],
            id_map: HashMap::new(),
            title: String::new(),
            path: path.to_string(),
        }
    }

    /// The document element (`<html>`).
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn document_element(&self) -> &Element {
        &self.nodes[0]
    }

    pub fn document_element_mut(&mut self) -> &mut Element {
        &mut self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id)
    }

    /// Append `element` as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not exist.
    pub fn append(&mut self, parent: NodeId, mut element: Element) -> Option<NodeId> {
        if parent >= self.nodes.len() {
            return None;
        }

        let id = self.nodes.len();
        if let Some(id_attr) = element.id() {
            self.id_map.insert(id_attr.to_string(), id);
        }
        element.parent = Some(parent);
        self.nodes.push(element);
        self.nodes[parent].children.push(id);
        Some(id)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Descendants of `root` in document (pre-)order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = match self.get(root) {
            Some(el) => el.children.iter().rev().copied().collect(),
            None => return result,
        };

        while let Some(id) = stack.pop() {
            result.push(id);
            if let Some(el) = self.get(id) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        result
    }

    /// Every element, in document order, starting with the root.
    pub fn all(&self) -> Vec<NodeId> {
        let mut result = vec![self.root()];
        result.extend(self.descendants(self.root()));
        result
    }

    /// Elements carrying attribute `name`, in document order.
    pub fn query_attribute(&self, name: &str) -> Vec<NodeId> {
        self.all()
            .into_iter()
            .filter(|&id| self.nodes[id].has_attribute(name))
            .collect()
    }

    /// Elements carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.all()
            .into_iter()
            .filter(|&id| self.nodes[id].has_class(class))
            .collect()
    }

    /// `node` or its nearest ancestor carrying `class`.
    pub fn closest_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let el = self.get(id)?;
            if el.has_class(class) {
                return Some(id);
            }
            current = el.parent;
        }
        None
    }

    /// First descendant of `node` carrying `class`.
    pub fn find_descendant_with_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|&id| self.nodes[id].has_class(class))
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    pub fn is_inside(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).and_then(Element::parent);
        }
        false
    }
}
