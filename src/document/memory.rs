//! In-memory document
//!
//! A headless element tree implementing [`Document`]. Nodes live in an
//! arena; handles are cheap `Rc` clones. Events and visibility changes are
//! driven explicitly (`dispatch`, `type_text`, `scroll_into_view`).

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use super::{
    Compound, Document, DocumentError, DomEvent, Element, Intersection, Selector,
    VisibilityCallback, VisibilityOptions,
};

type Handler = Rc<RefCell<Box<dyn FnMut()>>>;

const BODY: usize = 0;

struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    value: String,
    parent: Option<usize>,
    children: Vec<usize>,
    listeners: Vec<(DomEvent, Handler)>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            value: String::new(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    fn matches(&self, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag {
            if &self.tag != tag {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if self.id.as_ref() != Some(id) {
                return false;
            }
        }
        if !compound.classes.iter().all(|c| self.classes.contains(c)) {
            return false;
        }
        compound.attrs.iter().all(|attr| match self.attribute(&attr.name) {
            Some(actual) => attr.value.as_ref().map_or(true, |v| *v == actual),
            None => false,
        })
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => {
                if self.classes.is_empty() {
                    None
                } else {
                    Some(self.classes.join(" "))
                }
            }
            _ => self.attrs.get(name).cloned(),
        }
    }
}

struct Observer {
    threshold: f64,
    targets: Vec<usize>,
    crossed: HashMap<usize, bool>,
    callback: Rc<RefCell<VisibilityCallback<MemoryElement>>>,
}

struct Tree {
    nodes: Vec<Node>,
    location: String,
    observers: Vec<Observer>,
}

impl Tree {
    /// Depth-first, document-order descendants of `root` (excluding it)
    fn descendants(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[root].children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            out.push(index);
            stack.extend(self.nodes[index].children.iter().rev().copied());
        }
        out
    }

    fn matches_chain(&self, index: usize, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !self.nodes[index].matches(last) {
            return false;
        }
        let mut remaining = ancestors;
        let mut cursor = self.nodes[index].parent;
        while let Some((wanted, rest)) = remaining.split_last() {
            loop {
                match cursor {
                    Some(ancestor) => {
                        cursor = self.nodes[ancestor].parent;
                        if self.nodes[ancestor].matches(wanted) {
                            break;
                        }
                    }
                    None => return false,
                }
            }
            remaining = rest;
        }
        true
    }

    fn select(&self, root: usize, selector: &Selector) -> Vec<usize> {
        self.descendants(root)
            .into_iter()
            .filter(|&index| {
                selector
                    .alternatives()
                    .iter()
                    .any(|chain| self.matches_chain(index, chain))
            })
            .collect()
    }
}

/// Headless document backed by an element arena
#[derive(Clone)]
pub struct MemoryDocument {
    tree: Rc<RefCell<Tree>>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("MemoryDocument")
            .field("location", &tree.location)
            .field("nodes", &tree.nodes.len())
            .finish()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Empty page with a `<body>` at `about:blank`
    pub fn new() -> Self {
        Self::with_location("about:blank")
    }

    /// Empty page at the given absolute URL
    pub fn with_location(location: &str) -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: vec![Node::new("body")],
                location: location.to_string(),
                observers: Vec::new(),
            })),
        }
    }

    /// The `<body>` element
    pub fn root(&self) -> MemoryElement {
        self.handle(BODY)
    }

    /// Create a detached element; attach it with [`MemoryElement::append_to`]
    pub fn element(&self, tag: &str) -> MemoryElement {
        let mut tree = self.tree.borrow_mut();
        tree.nodes.push(Node::new(tag));
        let index = tree.nodes.len() - 1;
        drop(tree);
        self.handle(index)
    }

    /// Report a new visible ratio for `target` to every observer watching it
    pub fn scroll_into_view(&self, target: &MemoryElement, ratio: f64) {
        let mut due = Vec::new();
        {
            let mut tree = self.tree.borrow_mut();
            for observer in tree.observers.iter_mut() {
                if !observer.targets.contains(&target.index) {
                    continue;
                }
                let crossed = ratio > 0.0 && ratio >= observer.threshold;
                let previous = observer.crossed.insert(target.index, crossed).unwrap_or(false);
                if crossed != previous {
                    due.push((Rc::clone(&observer.callback), crossed));
                }
            }
        }
        for (callback, crossed) in due {
            let entry = Intersection {
                target: target.clone(),
                is_intersecting: crossed,
                ratio,
            };
            (callback.borrow_mut())(vec![entry]);
        }
    }

    /// Number of visibility observers registered so far
    pub fn observer_count(&self) -> usize {
        self.tree.borrow().observers.len()
    }

    fn handle(&self, index: usize) -> MemoryElement {
        MemoryElement {
            doc: self.clone(),
            index,
        }
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;

    fn body(&self) -> Option<MemoryElement> {
        Some(self.root())
    }

    fn by_id(&self, id: &str) -> Option<MemoryElement> {
        self.query(&Selector::id(id))
    }

    fn query_all(&self, selector: &Selector) -> Vec<MemoryElement> {
        let indexes = self.tree.borrow().select(BODY, selector);
        indexes.into_iter().map(|i| self.handle(i)).collect()
    }

    fn location(&self) -> String {
        self.tree.borrow().location.clone()
    }

    fn create_element(&self, tag: &str) -> Result<MemoryElement, DocumentError> {
        Ok(self.element(tag))
    }

    fn observe_visibility(
        &self,
        targets: &[MemoryElement],
        options: &VisibilityOptions,
        callback: VisibilityCallback<MemoryElement>,
    ) -> Result<(), DocumentError> {
        self.tree.borrow_mut().observers.push(Observer {
            threshold: options.threshold,
            targets: targets.iter().map(|t| t.index).collect(),
            crossed: HashMap::new(),
            callback: Rc::new(RefCell::new(callback)),
        });
        Ok(())
    }
}

/// Handle to a node of a [`MemoryDocument`]
#[derive(Clone)]
pub struct MemoryElement {
    doc: MemoryDocument,
    index: usize,
}

impl PartialEq for MemoryElement {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && Rc::ptr_eq(&self.doc.tree, &other.doc.tree)
    }
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.doc.tree.borrow();
        let node = &tree.nodes[self.index];
        f.debug_struct("MemoryElement")
            .field("tag", &node.tag)
            .field("id", &node.id)
            .field("classes", &node.classes)
            .finish()
    }
}

impl MemoryElement {
    fn with_node<R>(&self, f: impl FnOnce(&Node) -> R) -> R {
        f(&self.doc.tree.borrow().nodes[self.index])
    }

    fn with_node_mut<R>(&self, f: impl FnOnce(&mut Node) -> R) -> R {
        f(&mut self.doc.tree.borrow_mut().nodes[self.index])
    }

    // Builders

    pub fn id(self, id: &str) -> Self {
        self.with_node_mut(|n| n.id = Some(id.to_string()));
        self
    }

    pub fn class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn text_content(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Attach under `parent` as its last child
    pub fn append_to(self, parent: &MemoryElement) -> Self {
        attach(parent, &self);
        self
    }

    // Mutation and inspection helpers

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.with_node_mut(|n| match name {
            "id" => n.id = Some(value.to_string()),
            "class" => n.classes = value.split_whitespace().map(str::to_string).collect(),
            _ => {
                n.attrs.insert(name.to_string(), value.to_string());
            }
        });
    }

    pub fn tag(&self) -> String {
        self.with_node(|n| n.tag.clone())
    }

    pub fn class_name(&self) -> String {
        self.with_node(|n| n.classes.join(" "))
    }

    pub fn children(&self) -> Vec<MemoryElement> {
        let children = self.with_node(|n| n.children.clone());
        children.into_iter().map(|i| self.doc.handle(i)).collect()
    }

    /// Set a form control value without firing events
    pub fn set_value(&self, value: &str) {
        self.with_node_mut(|n| n.value = value.to_string());
    }

    /// Set a form control value and fire `input`, like typing would
    pub fn type_text(&self, value: &str) {
        self.set_value(value);
        self.dispatch(DomEvent::Input);
    }

    /// Fire every listener registered for `event`, in registration order
    pub fn dispatch(&self, event: DomEvent) {
        let handlers: Vec<Handler> = self.with_node(|n| {
            n.listeners
                .iter()
                .filter(|(e, _)| *e == event)
                .map(|(_, h)| Rc::clone(h))
                .collect()
        });
        for handler in handlers {
            (handler.borrow_mut())();
        }
    }

    pub fn listener_count(&self, event: DomEvent) -> usize {
        self.with_node(|n| n.listeners.iter().filter(|(e, _)| *e == event).count())
    }
}

fn attach(parent: &MemoryElement, child: &MemoryElement) {
    let mut tree = parent.doc.tree.borrow_mut();
    if let Some(old) = tree.nodes[child.index].parent.take() {
        tree.nodes[old].children.retain(|&c| c != child.index);
    }
    tree.nodes[child.index].parent = Some(parent.index);
    tree.nodes[parent.index].children.push(child.index);
}

impl Element for MemoryElement {
    fn add_class(&self, class: &str) {
        self.with_node_mut(|n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, class: &str) {
        self.with_node_mut(|n| n.classes.retain(|c| c != class));
    }

    fn has_class(&self, class: &str) -> bool {
        self.with_node(|n| n.classes.iter().any(|c| c == class))
    }

    fn set_class_name(&self, value: &str) {
        self.set_attribute("class", value);
    }

    fn set_style(&self, property: &str, value: &str) {
        self.with_node_mut(|n| {
            n.style.insert(property.to_string(), value.to_string());
        });
    }

    fn style(&self, property: &str) -> Option<String> {
        self.with_node(|n| n.style.get(property).cloned())
    }

    fn text(&self) -> String {
        self.with_node(|n| n.text.clone())
    }

    fn set_text(&self, text: &str) {
        self.with_node_mut(|n| n.text = text.to_string());
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.with_node(|n| n.attribute(name))
    }

    fn value(&self) -> String {
        self.with_node(|n| n.value.clone())
    }

    fn href(&self) -> Option<String> {
        self.attribute("href")
    }

    fn query_all(&self, selector: &Selector) -> Vec<MemoryElement> {
        let indexes = self.doc.tree.borrow().select(self.index, selector);
        indexes.into_iter().map(|i| self.doc.handle(i)).collect()
    }

    fn parent(&self) -> Option<MemoryElement> {
        self.with_node(|n| n.parent).map(|i| self.doc.handle(i))
    }

    fn append_child(&self, child: &MemoryElement) -> Result<(), DocumentError> {
        if !Rc::ptr_eq(&self.doc.tree, &child.doc.tree) {
            return Err(DocumentError::Operation(
                "child belongs to another document".to_string(),
            ));
        }
        attach(self, child);
        Ok(())
    }

    fn listen(&self, event: DomEvent, handler: Box<dyn FnMut()>) {
        self.with_node_mut(|n| n.listeners.push((event, Rc::new(RefCell::new(handler)))));
    }
}
