//! Analysis collaborator
//!
//! Turns a loaded page into something the orchestrator can reason about:
//! - a `DomTree` extracted through the browser engine
//! - the interactive elements on it (links, buttons, inputs)
//! - the forms on it and their fields
//! - a content hash used for state fingerprinting

mod dom;
mod html;

pub use dom::{collapse_whitespace, DomNode, DomTree};
pub use html::{parse_dom, HtmlAnalyzer};

use crate::browser::{BrowserEngine, BrowserError};
use crate::graph::ActionType;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while analyzing a page
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Browser error during extraction: {0}")]
    Browser(#[from] BrowserError),

    #[error("Empty document at {0}")]
    EmptyDocument(String),
}

/// Broad category of an interactive element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Link,
    Button,
    Input,
    Select,
    TextArea,
}

/// An element a user can act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveElement {
    pub kind: ElementKind,
    /// CSS selector addressing the element on its page
    pub selector: String,
    /// Visible text or accessible label
    pub text: String,
    /// Absolute URL the element leads to, when it navigates
    pub target_url: Option<String>,
}

impl InteractiveElement {
    pub fn is_navigable(&self) -> bool {
        self.target_url.is_some()
    }

    /// Edge type recorded when this element is followed
    pub fn action_type(&self) -> ActionType {
        match self.kind {
            ElementKind::Link => ActionType::Navigation,
            _ => ActionType::Click,
        }
    }
}

/// One input of a form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: Option<String>,
    /// `type` attribute for inputs, tag name for `select` and `textarea`
    pub field_type: String,
    pub required: bool,
}

/// A form and where submitting it leads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormModel {
    pub selector: String,
    /// Uppercase HTTP method
    pub method: String,
    /// Absolute action URL; `None` when the form has no usable action
    pub action_url: Option<String>,
    pub fields: Vec<FormField>,
}

impl FormModel {
    /// True when the form asks for a password
    pub fn has_password_field(&self) -> bool {
        self.fields.iter().any(|f| f.field_type == "password")
    }
}

/// Page analysis primitives used by the orchestrator
#[async_trait]
pub trait PageAnalyzer<E: BrowserEngine>: Send + Sync {
    /// Extracts the current document of `page`
    async fn extract_dom(&self, engine: &E, page: &E::Page) -> Result<DomTree, AnalysisError>;

    /// Lists the interactive elements of a document in document order
    fn classify_interactive_elements(&self, dom: &DomTree) -> Vec<InteractiveElement>;

    /// Lists the forms of a document in document order
    fn detect_forms(&self, dom: &DomTree) -> Vec<FormModel>;

    /// Content hash of a document; equal for structurally equal documents
    fn hash_dom_content(&self, dom: &DomTree) -> String;
}
