//! An arena-backed live presentation tree.
//!
//! [`Document`] is a cheap, cloneable handle. Nodes are addressed by
//! [`NodeId`] and stay allocated until [`Document::release`] frees them, so a
//! detached node can be re-attached elsewhere. Fragments are transparent
//! containers: they keep their identity in the tree but contribute no markup
//! of their own.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use bitflags::bitflags;
use slotmap::{SlotMap, new_key_type};

use crate::error::DomError;

new_key_type! {
    pub struct NodeId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element(String),
    Text(String),
    Comment(String),
    Fragment,
    /// A named surface wrapping adopted content.
    Surface(String),
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListenerOptions: u8 {
        /// Run during the capture phase instead of the bubble phase.
        const CAPTURE = 1;
        /// Remove the listener after its first invocation.
        const ONCE = 1 << 1;
    }
}

pub type Listener = Rc<dyn Fn(&Event)>;

/// An event travelling through the tree.
pub struct Event {
    pub name: String,
    pub target: NodeId,
    pub detail: serde_json::Value,
    current: Cell<NodeId>,
    stopped: Cell<bool>,
}

impl Event {
    pub fn current_target(&self) -> NodeId {
        self.current.get()
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

struct ListenerEntry {
    id: ListenerId,
    event: String,
    options: ListenerOptions,
    handler: Listener,
}

struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    shadow: Option<NodeId>,
    id: Option<String>,
    class: Option<String>,
    style: Option<String>,
    attrs: BTreeMap<String, String>,
    props: BTreeMap<String, serde_json::Value>,
    html: Option<String>,
    key: Option<String>,
    listeners: Vec<ListenerEntry>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            shadow: None,
            id: None,
            class: None,
            style: None,
            attrs: BTreeMap::new(),
            props: BTreeMap::new(),
            html: None,
            key: None,
            listeners: Vec::new(),
        }
    }
}

struct DocInner {
    nodes: SlotMap<NodeId, NodeData>,
    body: NodeId,
    next_listener: u64,
}

impl DocInner {
    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id).ok_or(DomError::StaleNode(id))
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|c| *c != child);
            if p.shadow == Some(child) {
                p.shadow = None;
            }
        }
    }

    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::Hierarchy { parent, child });
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocInner>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(NodeData::new(NodeKind::Element("body".into())));
        Self {
            inner: Rc::new(RefCell::new(DocInner {
                nodes,
                body,
                next_listener: 0,
            })),
        }
    }

    pub fn body(&self) -> NodeId {
        self.inner.borrow().body
    }

    fn create(&self, kind: NodeKind) -> NodeId {
        self.inner.borrow_mut().nodes.insert(NodeData::new(kind))
    }

    pub fn create_element(&self, tag: &str) -> NodeId {
        self.create(NodeKind::Element(tag.to_string()))
    }

    pub fn create_text(&self, data: &str) -> NodeId {
        self.create(NodeKind::Text(data.to_string()))
    }

    pub fn create_comment(&self, data: &str) -> NodeId {
        self.create(NodeKind::Comment(data.to_string()))
    }

    pub fn create_fragment(&self) -> NodeId {
        self.create(NodeKind::Fragment)
    }

    /// A surface node named `name`. With `shadow`, content goes into a
    /// separate root reachable through [`Document::shadow_root`].
    pub fn create_surface(&self, name: &str, shadow: bool) -> NodeId {
        let host = self.create(NodeKind::Surface(name.to_string()));
        if shadow {
            let root = self.create(NodeKind::Fragment);
            let mut inner = self.inner.borrow_mut();
            if let Some(r) = inner.nodes.get_mut(root) {
                r.parent = Some(host);
            }
            if let Some(h) = inner.nodes.get_mut(host) {
                h.shadow = Some(root);
            }
        }
        host
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(host).and_then(|n| n.shadow)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().nodes.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.inner.borrow().nodes.get(node).map(|n| n.kind.clone())
    }

    /// Element or surface name.
    pub fn tag(&self, node: NodeId) -> Option<String> {
        match self.kind(node)? {
            NodeKind::Element(tag) | NodeKind::Surface(tag) => Some(tag),
            _ => None,
        }
    }

    // Tree structure

    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `reference`, or last when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(
        &self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.check_insert(parent, child)?;
        inner.detach(child);
        let p = inner.nodes.get_mut(parent).ok_or(DomError::StaleNode(parent))?;
        let pos = reference
            .and_then(|r| p.children.iter().position(|c| *c == r))
            .unwrap_or(p.children.len());
        p.children.insert(pos, child);
        if let Some(c) = inner.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        Ok(())
    }

    /// Detach `node` from its parent. The node stays allocated.
    pub fn remove(&self, node: NodeId) -> Result<(), DomError> {
        let mut inner = self.inner.borrow_mut();
        inner.node(node)?;
        inner.detach(node);
        Ok(())
    }

    /// Put `new` where `old` is, in one step. A detached `old` leaves `new`
    /// detached as well.
    pub fn replace(&self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        if old == new {
            return Ok(());
        }
        let mut inner = self.inner.borrow_mut();
        inner.node(new)?;
        let Some(parent) = inner.node(old)?.parent else {
            inner.detach(new);
            return Ok(());
        };
        if inner.is_inclusive_ancestor(new, parent) {
            return Err(DomError::Hierarchy { parent, child: new });
        }
        inner.detach(new);
        let p = inner.nodes.get_mut(parent).ok_or(DomError::StaleNode(parent))?;
        if p.shadow == Some(old) {
            p.shadow = Some(new);
        } else if let Some(pos) = p.children.iter().position(|c| *c == old) {
            p.children[pos] = new;
        }
        if let Some(o) = inner.nodes.get_mut(old) {
            o.parent = None;
        }
        if let Some(n) = inner.nodes.get_mut(new) {
            n.parent = Some(parent);
        }
        Ok(())
    }

    /// Detach `node` and free it together with its whole subtree.
    pub fn release(&self, node: NodeId) {
        let mut inner = self.inner.borrow_mut();
        if node == inner.body {
            log::warn!("refusing to release the document body");
            return;
        }
        inner.detach(node);
        let mut stack = vec![node];
        // Listener closures are dropped after the borrow ends.
        let mut freed = Vec::new();
        while let Some(id) = stack.pop() {
            if let Some(data) = inner.nodes.remove(id) {
                stack.extend(data.children.iter().copied());
                stack.extend(data.shadow);
                freed.push(data);
            }
        }
        drop(inner);
        drop(freed);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.borrow().nodes.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.inner
            .borrow()
            .nodes
            .get(node)
            .and_then(|n| n.children.first().copied())
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let inner = self.inner.borrow();
        let parent = inner.nodes.get(node)?.parent?;
        let siblings = &inner.nodes.get(parent)?.children;
        let pos = siblings.iter().position(|c| *c == node)?;
        siblings.get(pos + 1).copied()
    }

    /// Whether `node` is reachable from the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let inner = self.inner.borrow();
        inner.nodes.contains_key(node) && inner.is_inclusive_ancestor(inner.body, node)
    }

    // Fields. Writes to released nodes are ignored.

    fn with_node_mut(&self, node: NodeId, f: impl FnOnce(&mut NodeData)) {
        match self.inner.borrow_mut().nodes.get_mut(node) {
            Some(data) => f(data),
            None => log::debug!("write to released node {node:?} ignored"),
        }
    }

    fn read<R>(&self, node: NodeId, f: impl FnOnce(&NodeData) -> R) -> Option<R> {
        self.inner.borrow().nodes.get(node).map(f)
    }

    pub fn set_id(&self, node: NodeId, id: Option<&str>) {
        self.with_node_mut(node, |n| n.id = id.map(str::to_string));
    }

    pub fn id(&self, node: NodeId) -> Option<String> {
        self.read(node, |n| n.id.clone()).flatten()
    }

    pub fn set_class(&self, node: NodeId, class: Option<&str>) {
        self.with_node_mut(node, |n| n.class = class.map(str::to_string));
    }

    pub fn class(&self, node: NodeId) -> Option<String> {
        self.read(node, |n| n.class.clone()).flatten()
    }

    pub fn set_style(&self, node: NodeId, css: Option<&str>) {
        self.with_node_mut(node, |n| n.style = css.map(str::to_string));
    }

    pub fn style(&self, node: NodeId) -> Option<String> {
        self.read(node, |n| n.style.clone()).flatten()
    }

    pub fn set_attr(&self, node: NodeId, name: &str, value: Option<&str>) {
        self.with_node_mut(node, |n| match value {
            Some(v) => {
                n.attrs.insert(name.to_string(), v.to_string());
            }
            None => {
                n.attrs.remove(name);
            }
        });
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.read(node, |n| n.attrs.get(name).cloned()).flatten()
    }

    pub fn attrs(&self, node: NodeId) -> BTreeMap<String, String> {
        self.read(node, |n| n.attrs.clone()).unwrap_or_default()
    }

    pub fn set_prop(&self, node: NodeId, name: &str, value: Option<serde_json::Value>) {
        self.with_node_mut(node, |n| match value {
            Some(v) => {
                n.props.insert(name.to_string(), v);
            }
            None => {
                n.props.remove(name);
            }
        });
    }

    pub fn prop(&self, node: NodeId, name: &str) -> Option<serde_json::Value> {
        self.read(node, |n| n.props.get(name).cloned()).flatten()
    }

    /// Replace the data of a text or comment node.
    pub fn set_data(&self, node: NodeId, data: &str) {
        self.with_node_mut(node, |n| match &mut n.kind {
            NodeKind::Text(d) | NodeKind::Comment(d) => *d = data.to_string(),
            other => log::debug!("set_data on {other:?} ignored"),
        });
    }

    pub fn data(&self, node: NodeId) -> Option<String> {
        match self.kind(node)? {
            NodeKind::Text(d) | NodeKind::Comment(d) => Some(d),
            _ => None,
        }
    }

    /// Raw markup rendered in place of the node's children.
    pub fn set_html(&self, node: NodeId, html: Option<&str>) {
        self.with_node_mut(node, |n| n.html = html.map(str::to_string));
    }

    pub fn html(&self, node: NodeId) -> Option<String> {
        self.read(node, |n| n.html.clone()).flatten()
    }

    pub fn set_key(&self, node: NodeId, key: Option<&str>) {
        self.with_node_mut(node, |n| n.key = key.map(str::to_string));
    }

    pub fn key(&self, node: NodeId) -> Option<String> {
        self.read(node, |n| n.key.clone()).flatten()
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(n) = inner.nodes.get(id) else {
                continue;
            };
            if let NodeKind::Text(d) = &n.kind {
                out.push_str(d);
            }
            stack.extend(n.children.iter().rev().copied());
        }
        out
    }

    // Queries

    /// First node in document order matching `#id`, `.class`, `body` or a
    /// tag name.
    pub fn query(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = selector.trim();
        let valid_name = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        let matcher: Box<dyn Fn(&NodeData) -> bool> = if let Some(id) = selector.strip_prefix('#')
        {
            if !valid_name(id) {
                return Err(DomError::InvalidSelector(selector.to_string()));
            }
            let id = id.to_string();
            Box::new(move |n: &NodeData| n.id.as_deref() == Some(id.as_str()))
        } else if let Some(class) = selector.strip_prefix('.') {
            if !valid_name(class) {
                return Err(DomError::InvalidSelector(selector.to_string()));
            }
            let class = class.to_string();
            Box::new(move |n: &NodeData| {
                n.class
                    .as_deref()
                    .is_some_and(|c| c.split_whitespace().any(|c| c == class))
            })
        } else if valid_name(selector) {
            let tag = selector.to_ascii_lowercase();
            Box::new(move |n: &NodeData| match &n.kind {
                NodeKind::Element(t) | NodeKind::Surface(t) => *t == tag,
                _ => false,
            })
        } else {
            return Err(DomError::InvalidSelector(selector.to_string()));
        };

        let inner = self.inner.borrow();
        let mut stack = vec![inner.body];
        while let Some(id) = stack.pop() {
            let Some(n) = inner.nodes.get(id) else {
                continue;
            };
            if matcher(n) {
                return Ok(Some(id));
            }
            stack.extend(n.children.iter().rev().copied());
        }
        Ok(None)
    }

    // Events

    pub fn add_listener(
        &self,
        node: NodeId,
        event: &str,
        options: ListenerOptions,
        handler: Listener,
    ) -> Result<ListenerId, DomError> {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        let n = inner.nodes.get_mut(node).ok_or(DomError::StaleNode(node))?;
        n.listeners.push(ListenerEntry {
            id,
            event: event.to_string(),
            options,
            handler,
        });
        Ok(id)
    }

    /// Returns whether a listener was removed.
    pub fn remove_listener(&self, node: NodeId, listener: ListenerId) -> bool {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let Some(n) = inner.nodes.get_mut(node) else {
                return false;
            };
            let pos = n.listeners.iter().position(|l| l.id == listener);
            pos.map(|pos| n.listeners.remove(pos))
        };
        removed.is_some()
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.read(node, |n| n.listeners.len()).unwrap_or(0)
    }

    /// Deliver an event to `target`: capture listeners from the root down,
    /// then bubble listeners from the target up. Returns how many listeners
    /// ran.
    pub fn dispatch(&self, target: NodeId, name: &str, detail: serde_json::Value) -> usize {
        let path: Vec<NodeId> = {
            let inner = self.inner.borrow();
            let mut path = Vec::new();
            let mut cursor = inner.nodes.get(target).map(|_| target);
            while let Some(id) = cursor {
                path.push(id);
                cursor = inner.nodes.get(id).and_then(|n| n.parent);
            }
            path
        };
        let event = Event {
            name: name.to_string(),
            target,
            detail,
            current: Cell::new(target),
            stopped: Cell::new(false),
        };

        let mut fired = 0;
        for &node in path.iter().rev() {
            fired += self.fire(node, &event, true);
            if event.is_propagation_stopped() {
                return fired;
            }
        }
        for &node in &path {
            fired += self.fire(node, &event, false);
            if event.is_propagation_stopped() {
                break;
            }
        }
        fired
    }

    fn fire(&self, node: NodeId, event: &Event, capture: bool) -> usize {
        let matching: Vec<(ListenerId, ListenerOptions, Listener)> = self
            .read(node, |n| {
                n.listeners
                    .iter()
                    .filter(|l| {
                        l.event == event.name
                            && l.options.contains(ListenerOptions::CAPTURE) == capture
                    })
                    .map(|l| (l.id, l.options, l.handler.clone()))
                    .collect()
            })
            .unwrap_or_default();
        let mut fired = 0;
        for (id, options, handler) in matching {
            if options.contains(ListenerOptions::ONCE) {
                self.remove_listener(node, id);
            }
            event.current.set(node);
            handler(event);
            fired += 1;
        }
        fired
    }

    // Serialization

    pub fn to_html(&self, node: NodeId) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        write_node(&inner, node, &mut out);
        out
    }
}

fn write_node(inner: &DocInner, id: NodeId, out: &mut String) {
    let Some(n) = inner.nodes.get(id) else {
        return;
    };
    match &n.kind {
        NodeKind::Text(data) => out.push_str(&escape(data, false)),
        NodeKind::Comment(data) => {
            let _ = write!(out, "<!--{data}-->");
        }
        NodeKind::Fragment => write_content(inner, n, out),
        NodeKind::Element(tag) | NodeKind::Surface(tag) => {
            out.push('<');
            out.push_str(tag);
            let fields = [("id", &n.id), ("class", &n.class), ("style", &n.style)];
            for (name, value) in fields {
                if let Some(value) = value {
                    let _ = write!(out, " {name}=\"{}\"", escape(value, true));
                }
            }
            for (name, value) in &n.attrs {
                let _ = write!(out, " {name}=\"{}\"", escape(value, true));
            }
            out.push('>');
            if let Some(shadow) = n.shadow {
                out.push_str("<template shadowrootmode=\"open\">");
                write_node(inner, shadow, out);
                out.push_str("</template>");
            }
            write_content(inner, n, out);
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn write_content(inner: &DocInner, n: &NodeData, out: &mut String) {
    if let Some(html) = &n.html {
        out.push_str(html);
        return;
    }
    for child in &n.children {
        write_node(inner, *child, out);
    }
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_replace_keep_position() {
        let doc = Document::new();
        let list = doc.create_element("ul");
        let a = doc.create_element("li");
        let b = doc.create_element("li");
        let c = doc.create_element("li");
        doc.append_child(list, a).unwrap();
        doc.append_child(list, c).unwrap();
        doc.insert_before(list, b, Some(c)).unwrap();
        assert_eq!(doc.children(list), vec![a, b, c]);

        let d = doc.create_element("li");
        doc.replace(b, d).unwrap();
        assert_eq!(doc.children(list), vec![a, d, c]);
        assert_eq!(doc.parent(b), None);
        assert_eq!(doc.next_sibling(d), Some(c));
    }

    #[test]
    fn test_cannot_append_ancestor() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::Hierarchy {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn test_release_frees_subtree() {
        let doc = Document::new();
        let before = doc.len();
        let div = doc.create_element("div");
        let text = doc.create_text("hi");
        doc.append_child(div, text).unwrap();
        doc.append_child(doc.body(), div).unwrap();
        doc.release(div);
        assert!(!doc.contains(text));
        assert_eq!(doc.len(), before);
        assert!(doc.children(doc.body()).is_empty());
    }

    #[test]
    fn test_query() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.set_id(div, Some("app"));
        doc.set_class(div, Some("card wide"));
        doc.append_child(doc.body(), div).unwrap();

        assert_eq!(doc.query("#app"), Ok(Some(div)));
        assert_eq!(doc.query(".wide"), Ok(Some(div)));
        assert_eq!(doc.query("div"), Ok(Some(div)));
        assert_eq!(doc.query("body"), Ok(Some(doc.body())));
        assert_eq!(doc.query("#missing"), Ok(None));
        assert!(matches!(doc.query("div > p"), Err(DomError::InvalidSelector(_))));
    }

    #[test]
    fn test_dispatch_capture_then_bubble() {
        let doc = Document::new();
        let outer = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(outer, button).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let record = |label: &'static str| -> Listener {
            let log = log.clone();
            Rc::new(move |_: &Event| log.borrow_mut().push(label))
        };
        doc.add_listener(outer, "click", ListenerOptions::empty(), record("outer-bubble"))
            .unwrap();
        doc.add_listener(outer, "click", ListenerOptions::CAPTURE, record("outer-capture"))
            .unwrap();
        doc.add_listener(button, "click", ListenerOptions::ONCE, record("button"))
            .unwrap();

        assert_eq!(doc.dispatch(button, "click", serde_json::Value::Null), 3);
        assert_eq!(*log.borrow(), ["outer-capture", "button", "outer-bubble"]);
        assert_eq!(doc.dispatch(button, "click", serde_json::Value::Null), 2);
    }

    #[test]
    fn test_to_html() {
        let doc = Document::new();
        let div = doc.create_element("div");
        doc.set_class(div, Some("a\"b"));
        doc.set_attr(div, "title", Some("x"));
        let frag = doc.create_fragment();
        let text = doc.create_text("1 < 2");
        doc.append_child(frag, text).unwrap();
        doc.append_child(div, frag).unwrap();
        let note = doc.create_comment("note");
        doc.append_child(div, note).unwrap();
        assert_eq!(
            doc.to_html(div),
            "<div class=\"a&quot;b\" title=\"x\">1 &lt; 2<!--note--></div>"
        );
    }
}
