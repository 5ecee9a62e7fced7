//! HTML analyzer
//!
//! Extracts the document through the engine's `outerHTML`, parses it with
//! `scraper` and classifies what it finds.
//!
//! # Navigable elements
//!
//! **Included:**
//! - `<a href="...">` links, including `rel="nofollow"`
//! - forms with an explicit `action`
//!
//! **Not navigable** (still counted as elements):
//! - `<a href="..." download>`
//! - `javascript:`, `mailto:`, `tel:` and `data:` links
//! - fragment-only anchors
//! - buttons and other click handlers, whose effect a static document cannot reveal

use super::dom::collapse_whitespace;
use super::{
    AnalysisError, DomNode, DomTree, ElementKind, FormField, FormModel, InteractiveElement,
    PageAnalyzer,
};
use crate::browser::{evaluate_as, BrowserEngine, OUTER_HTML};
use crate::url::resolve_link;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use sha2::{Digest, Sha256};

/// Elements dropped from the extracted tree
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// `PageAnalyzer` working from serialized HTML
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlAnalyzer;

impl HtmlAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl<E: BrowserEngine> PageAnalyzer<E> for HtmlAnalyzer {
    async fn extract_dom(&self, engine: &E, page: &E::Page) -> Result<DomTree, AnalysisError> {
        let html: String = evaluate_as(engine, page, OUTER_HTML).await?;
        let url = engine.current_url(page).await?;

        if html.trim().is_empty() {
            return Err(AnalysisError::EmptyDocument(url));
        }

        Ok(parse_dom(&html, &url))
    }

    fn classify_interactive_elements(&self, dom: &DomTree) -> Vec<InteractiveElement> {
        let mut elements = Vec::new();

        dom.walk(|node, selector| {
            let Some(kind) = element_kind(node) else {
                return;
            };

            let target_url = match kind {
                ElementKind::Link if !node.has_attr("download") => node
                    .get_attr("href")
                    .and_then(|href| resolve_link(href, &dom.url)),
                _ => None,
            };

            elements.push(InteractiveElement {
                kind,
                selector: selector.to_string(),
                text: element_label(node),
                target_url,
            });
        });

        elements
    }

    fn detect_forms(&self, dom: &DomTree) -> Vec<FormModel> {
        let mut forms = Vec::new();

        dom.walk(|node, selector| {
            if node.tag != "form" {
                return;
            }

            let method = node
                .get_attr("method")
                .map(|m| m.trim().to_ascii_uppercase())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GET".to_string());

            let action_url = node
                .get_attr("action")
                .filter(|a| !a.trim().is_empty())
                .and_then(|action| resolve_link(action, &dom.url));

            let mut fields = Vec::new();
            collect_fields(node, &mut fields);

            forms.push(FormModel {
                selector: selector.to_string(),
                method,
                action_url,
                fields,
            });
        });

        forms
    }

    fn hash_dom_content(&self, dom: &DomTree) -> String {
        let mut hasher = Sha256::new();
        hasher.update(dom.root.canonical().as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Parses an HTML document into a `DomTree`
///
/// Scripts, styles and templates are left out of the tree.
///
/// # Example
///
/// ```
/// use discovery_engine::analysis::parse_dom;
///
/// let html = r#"<html><head><title>Test</title></head>
///     <body><a href="/page">Link</a></body></html>"#;
/// let dom = parse_dom(html, "https://example.com/");
/// assert_eq!(dom.title, "Test");
/// assert_eq!(dom.root.tag, "html");
/// ```
pub fn parse_dom(html: &str, url: &str) -> DomTree {
    let document = Html::parse_document(html);

    DomTree {
        url: url.to_string(),
        title: extract_title(&document),
        root: convert_element(document.root_element()),
    }
}

fn extract_title(document: &Html) -> String {
    let Ok(selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .unwrap_or_default()
}

fn convert_element(element: ElementRef<'_>) -> DomNode {
    let mut node = DomNode::new(element.value().name());
    for (name, value) in element.value().attrs() {
        node.attributes.insert(name.to_string(), value.to_string());
    }

    let mut text = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(t) => {
                text.push(' ');
                text.push_str(t);
            }
            Node::Element(e) if SKIPPED_TAGS.contains(&e.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.children.push(convert_element(child_element));
                }
            }
            _ => {}
        }
    }
    node.text = collapse_whitespace(&text);

    node
}

fn element_kind(node: &DomNode) -> Option<ElementKind> {
    match node.tag.as_str() {
        "a" if node.has_attr("href") => Some(ElementKind::Link),
        "button" => Some(ElementKind::Button),
        "input" => match input_type(node).as_str() {
            "submit" | "button" | "reset" | "image" => Some(ElementKind::Button),
            "hidden" => None,
            _ => Some(ElementKind::Input),
        },
        "select" => Some(ElementKind::Select),
        "textarea" => Some(ElementKind::TextArea),
        _ if node.get_attr("role") == Some("button") || node.has_attr("onclick") => {
            Some(ElementKind::Button)
        }
        _ => None,
    }
}

fn input_type(node: &DomNode) -> String {
    node.get_attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

fn element_label(node: &DomNode) -> String {
    let text = node.text_content();
    if !text.is_empty() {
        return text;
    }

    ["aria-label", "value", "placeholder", "name", "title"]
        .iter()
        .find_map(|attr| node.get_attr(attr).map(collapse_whitespace).filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

fn collect_fields(node: &DomNode, fields: &mut Vec<FormField>) {
    for child in &node.children {
        let field_type = match child.tag.as_str() {
            "input" => Some(input_type(child))
                .filter(|t| !matches!(t.as_str(), "submit" | "button" | "reset" | "image")),
            "select" | "textarea" => Some(child.tag.clone()),
            _ => None,
        };

        if let Some(field_type) = field_type {
            fields.push(FormField {
                name: child.get_attr("name").map(str::to_string),
                field_type,
                required: child.has_attr("required"),
            });
        }

        collect_fields(child, fields);
    }
}
