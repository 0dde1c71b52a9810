//! Browser document adapter
//!
//! Implements the library's document traits over `web-sys`. Selectors are
//! rendered to CSS and handed to `querySelectorAll`.

use jobboard::document::{
    Document, DocumentError, DomEvent, Element, Intersection, Selector, VisibilityCallback,
    VisibilityOptions,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlAnchorElement, HtmlElement, HtmlInputElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, NodeList,
};

fn js_error(context: &str, value: JsValue) -> DocumentError {
    DocumentError::Operation(format!("{}: {:?}", context, value))
}

fn collect(nodes: NodeList) -> Vec<WebElement> {
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(WebElement::new)
        .collect()
}

/// Handle to a live DOM element
#[derive(Debug, Clone, PartialEq)]
pub struct WebElement {
    element: web_sys::Element,
}

impl WebElement {
    pub fn new(element: web_sys::Element) -> Self {
        Self { element }
    }

    pub fn raw(&self) -> &web_sys::Element {
        &self.element
    }

    fn html(&self) -> Option<&HtmlElement> {
        self.element.dyn_ref::<HtmlElement>()
    }
}

impl Element for WebElement {
    fn add_class(&self, class: &str) {
        let _ = self.element.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.element.class_list().remove_1(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.element.class_list().contains(class)
    }

    fn set_class_name(&self, value: &str) {
        self.element.set_class_name(value);
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Some(html) = self.html() {
            let _ = html.style().set_property(property, value);
        }
    }

    fn style(&self, property: &str) -> Option<String> {
        self.html()
            .and_then(|html| html.style().get_property_value(property).ok())
            .filter(|value| !value.is_empty())
    }

    fn text(&self) -> String {
        self.element.text_content().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.element.set_text_content(Some(text));
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.element.get_attribute(name)
    }

    fn value(&self) -> String {
        match self.element.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.value(),
            None => String::new(),
        }
    }

    fn href(&self) -> Option<String> {
        self.element
            .dyn_ref::<HtmlAnchorElement>()
            .map(|anchor| anchor.href())
    }

    fn query_all(&self, selector: &Selector) -> Vec<Self> {
        match self.element.query_selector_all(&selector.to_string()) {
            Ok(nodes) => collect(nodes),
            Err(e) => {
                tracing::warn!("Selector {} rejected: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    fn parent(&self) -> Option<Self> {
        self.element.parent_element().map(WebElement::new)
    }

    fn append_child(&self, child: &Self) -> Result<(), DocumentError> {
        self.element
            .append_child(&child.element)
            .map(|_| ())
            .map_err(|e| js_error("appendChild", e))
    }

    fn listen(&self, event: DomEvent, handler: Box<dyn FnMut()>) {
        let closure = Closure::wrap(handler);
        match self
            .element
            .add_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())
        {
            // Listeners live as long as the page
            Ok(()) => closure.forget(),
            Err(e) => tracing::warn!("Failed to listen for {}: {:?}", event.as_str(), e),
        }
    }
}

/// The page's `document`
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// Document of the current window, if any
    pub fn current() -> Option<Self> {
        web_sys::window()
            .and_then(|window| window.document())
            .map(Self::new)
    }

    pub fn raw(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Document for WebDocument {
    type Element = WebElement;

    fn body(&self) -> Option<WebElement> {
        self.document
            .body()
            .map(|body| WebElement::new(body.unchecked_into()))
    }

    fn by_id(&self, id: &str) -> Option<WebElement> {
        self.document.get_element_by_id(id).map(WebElement::new)
    }

    fn query_all(&self, selector: &Selector) -> Vec<WebElement> {
        match self.document.query_selector_all(&selector.to_string()) {
            Ok(nodes) => collect(nodes),
            Err(e) => {
                tracing::warn!("Selector {} rejected: {:?}", selector, e);
                Vec::new()
            }
        }
    }

    fn location(&self) -> String {
        self.document
            .location()
            .and_then(|location| location.href().ok())
            .unwrap_or_default()
    }

    fn create_element(&self, tag: &str) -> Result<WebElement, DocumentError> {
        self.document
            .create_element(tag)
            .map(WebElement::new)
            .map_err(|e| js_error("createElement", e))
    }

    fn observe_visibility(
        &self,
        targets: &[WebElement],
        options: &VisibilityOptions,
        mut callback: VisibilityCallback<WebElement>,
    ) -> Result<(), DocumentError> {
        let on_change = Closure::wrap(Box::new(move |entries: js_sys::Array, _: JsValue| {
            let batch = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| Intersection {
                    target: WebElement::new(entry.target()),
                    is_intersecting: entry.is_intersecting(),
                    ratio: entry.intersection_ratio(),
                })
                .collect();
            callback(batch);
        }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);

        let observer = IntersectionObserver::new_with_options(on_change.as_ref().unchecked_ref(), &init)
            .map_err(|e| {
                DocumentError::Unsupported(format!("IntersectionObserver: {:?}", e))
            })?;

        for target in targets {
            observer.observe(target.raw());
        }

        // Observation continues for the life of the page
        on_change.forget();
        std::mem::forget(observer);
        Ok(())
    }
}
