//! Document Adapter
//!
//! The enhancements never touch a global DOM. They receive a [`Document`]
//! and work through typed [`Selector`]s and [`Element`] handles, so the same
//! logic drives the browser page (`jobboard-web`) and the headless
//! [`MemoryDocument`] used by tests and the CLI.

mod memory;
mod selector;

pub use memory::{MemoryDocument, MemoryElement};
pub use selector::{AttrMatch, Compound, Selector};

use thiserror::Error;

/// Events the binder listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Click,
    Focus,
    Blur,
    Input,
}

impl DomEvent {
    /// DOM event type name
    pub fn as_str(&self) -> &'static str {
        match self {
            DomEvent::Click => "click",
            DomEvent::Focus => "focus",
            DomEvent::Blur => "blur",
            DomEvent::Input => "input",
        }
    }
}

/// Options for a shared visibility observer
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityOptions {
    /// Fraction of the target that must be visible
    pub threshold: f64,
    /// CSS margin applied to the viewport (`top right bottom left`)
    pub root_margin: String,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
        }
    }
}

/// One visibility change reported by an observer
#[derive(Debug, Clone)]
pub struct Intersection<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Callback invoked with every batch of visibility changes
pub type VisibilityCallback<E> = Box<dyn FnMut(Vec<Intersection<E>>)>;

/// Document adapter errors
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The host environment lacks a required capability
    #[error("Unsupported by document: {0}")]
    Unsupported(String),

    /// The host rejected an operation
    #[error("Document operation failed: {0}")]
    Operation(String),
}

/// A handle to one element of a [`Document`]
pub trait Element: Clone + 'static {
    fn add_class(&self, class: &str);

    fn remove_class(&self, class: &str);

    fn has_class(&self, class: &str) -> bool;

    /// Flip `class` and report whether it is now present
    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    /// Replace the whole class attribute
    fn set_class_name(&self, value: &str);

    /// Set one inline style property (CSS property name, e.g. `box-shadow`)
    fn set_style(&self, property: &str, value: &str);

    /// Read one inline style property
    fn style(&self, property: &str) -> Option<String>;

    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    fn attribute(&self, name: &str) -> Option<String>;

    /// Current value of a form control; empty for other elements
    fn value(&self) -> String;

    /// Absolute link target of an anchor
    fn href(&self) -> Option<String>;

    /// First descendant matching `selector`
    fn query(&self, selector: &Selector) -> Option<Self> {
        self.query_all(selector).into_iter().next()
    }

    /// All descendants matching `selector`, in document order
    fn query_all(&self, selector: &Selector) -> Vec<Self>;

    fn parent(&self) -> Option<Self>;

    fn append_child(&self, child: &Self) -> Result<(), DocumentError>;

    /// Attach a listener for the lifetime of the page
    fn listen(&self, event: DomEvent, handler: Box<dyn FnMut()>);
}

/// Lookup and observation over a whole page
pub trait Document: Clone + 'static {
    type Element: Element;

    fn body(&self) -> Option<Self::Element>;

    fn by_id(&self, id: &str) -> Option<Self::Element>;

    fn query(&self, selector: &Selector) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &Selector) -> Vec<Self::Element>;

    /// Absolute URL of the current page
    fn location(&self) -> String;

    fn create_element(&self, tag: &str) -> Result<Self::Element, DocumentError>;

    /// Watch `targets` with one shared observer
    fn observe_visibility(
        &self,
        targets: &[Self::Element],
        options: &VisibilityOptions,
        callback: VisibilityCallback<Self::Element>,
    ) -> Result<(), DocumentError>;
}
