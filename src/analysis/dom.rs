use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One element of an extracted document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomNode {
    /// Lowercase tag name
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Whitespace-collapsed text of the element's own text children
    pub text: String,
    pub children: Vec<DomNode>,
}

impl DomNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Adds an attribute, builder style
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Sets the own text, builder style
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = collapse_whitespace(text);
        self
    }

    /// Appends a child, builder style
    pub fn child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Text of this element and all descendants, whitespace-collapsed
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();
        self.collect_text(&mut parts);
        parts.join(" ")
    }

    fn collect_text<'a>(&'a self, parts: &mut Vec<&'a str>) {
        if !self.text.is_empty() {
            parts.push(&self.text);
        }
        for child in &self.children {
            child.collect_text(parts);
        }
    }

    /// Number of elements in this subtree, this one included
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(DomNode::element_count).sum::<usize>()
    }

    /// Canonical structural serialization, stable for equal trees
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&collapse_whitespace(value));
            out.push('"');
        }
        out.push('>');
        out.push_str(&self.text);
        for child in &self.children {
            child.write_canonical(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// An extracted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomTree {
    /// URL the document was loaded from
    pub url: String,
    pub title: String,
    pub root: DomNode,
}

impl DomTree {
    /// Visits every element depth-first together with a CSS selector for it
    ///
    /// Elements with an `id` are addressed as `#id`; all others by their
    /// child path from the nearest addressed ancestor, with `:nth-of-type`
    /// only where a tag repeats among siblings.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a DomNode, &str)) {
        let selector = own_id_selector(&self.root).unwrap_or_else(|| self.root.tag.clone());
        walk_node(&self.root, &selector, &mut visit);
    }
}

fn walk_node<'a>(node: &'a DomNode, selector: &str, visit: &mut impl FnMut(&'a DomNode, &str)) {
    visit(node, selector);

    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for child in &node.children {
        *totals.entry(child.tag.as_str()).or_default() += 1;
    }

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for child in &node.children {
        let index = seen.entry(child.tag.as_str()).or_default();
        *index += 1;

        let child_selector = match own_id_selector(child) {
            Some(id) => id,
            None if totals[child.tag.as_str()] > 1 => {
                format!("{} > {}:nth-of-type({})", selector, child.tag, index)
            }
            None => format!("{} > {}", selector, child.tag),
        };

        walk_node(child, &child_selector, visit);
    }
}

fn own_id_selector(node: &DomNode) -> Option<String> {
    node.get_attr("id")
        .map(str::trim)
        .filter(|id| !id.is_empty() && !id.contains(char::is_whitespace))
        .map(|id| format!("#{}", id))
}

/// Collapses runs of whitespace to single spaces and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
