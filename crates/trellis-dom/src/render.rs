//! The synthesis engine: descriptors in, live nodes out.
//!
//! Each reactive field of a descriptor gets its own watcher that patches
//! only that field on the existing node, and only when the new value differs
//! from the last one. Structural changes (presence, identity key, producer
//! children) go through a region: the old content is discarded with its
//! scope and fresh content is synthesized in its place.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_core::{Scope, current_scope, effect, on_cleanup, open_scope, untracked, watch};

use crate::descriptor::{AttrMap, Descriptor, PropMap, Tag};
use crate::dom::{Document, NodeId};
use crate::lifecycle::LifecycleItem;
use crate::mountable::Mountable;
use crate::normalize::{Child, Normalized, normalize};
use crate::style::{Style, StyleSheet};
use crate::surface::SurfaceRegistry;
use crate::value::Value;

/// Labels and defaults used while synthesizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    /// Comment left in place of a node whose presence condition is false.
    pub placeholder_label: String,
    /// Comment standing in for a child that rendered as nothing.
    pub empty_label: String,
    /// Comment after which keyed list items are inserted.
    pub list_anchor_label: String,
    /// Data shown by a hidden comment node.
    pub hidden_comment: String,
    /// Item fields every list ignores when checking for changes.
    pub list_volatile_keys: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            placeholder_label: "trellis-if".into(),
            empty_label: "trellis-empty".into(),
            list_anchor_label: "trellis-list".into(),
            hidden_comment: "hidden".into(),
            list_volatile_keys: Vec::new(),
        }
    }
}

/// Where a piece of content currently lives. Regions follow the slot of
/// whatever they hold, so a parent always resolves to the current node.
#[derive(Clone)]
pub(crate) struct Slot(Rc<RefCell<SlotTarget>>);

enum SlotTarget {
    Node(NodeId),
    Follow(Slot),
}

impl Slot {
    pub(crate) fn node(node: NodeId) -> Self {
        Slot(Rc::new(RefCell::new(SlotTarget::Node(node))))
    }

    pub(crate) fn get(&self) -> NodeId {
        match &*self.0.borrow() {
            SlotTarget::Node(node) => *node,
            SlotTarget::Follow(other) => other.get(),
        }
    }

    pub(crate) fn set(&self, node: NodeId) {
        *self.0.borrow_mut() = SlotTarget::Node(node);
    }

    fn follow(&self, other: &Slot) {
        *self.0.borrow_mut() = SlotTarget::Follow(other.clone());
    }
}

/// A realized piece of content and its lifecycle item.
#[derive(Clone)]
pub(crate) struct Unit {
    pub(crate) slot: Slot,
    pub(crate) life: Rc<LifecycleItem>,
}

#[derive(Clone)]
pub struct Renderer {
    doc: Document,
    surfaces: SurfaceRegistry,
    config: Rc<RenderConfig>,
}

impl Renderer {
    pub fn new(doc: Document) -> Self {
        Self::with_registry(doc, SurfaceRegistry::new())
    }

    /// A renderer sharing an application-owned surface registry.
    pub fn with_registry(doc: Document, surfaces: SurfaceRegistry) -> Self {
        Self {
            doc,
            surfaces,
            config: Rc::new(RenderConfig::default()),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Synthesize `descriptor`. A descriptor that normalizes to nothing
    /// yields an empty placeholder.
    pub fn render(&self, descriptor: Descriptor) -> Mountable {
        if let Some(mountable) = self.render_child(descriptor) {
            return mountable;
        }
        let scope = open_scope();
        let unit = self.placeholder(&self.config.empty_label);
        Mountable::new(self.doc.clone(), unit, scope)
    }

    /// Synthesize any child shape. `None` when it normalizes to nothing;
    /// an already realized [`Mountable`] is returned as is.
    pub fn render_child(&self, child: impl Into<Child>) -> Option<Mountable> {
        let normalized = normalize(child.into());
        match normalized {
            Normalized::Nothing => None,
            Normalized::Mounted(mountable) => Some(mountable),
            normalized => {
                let scope = open_scope();
                match scope.run(|| self.render_normalized(normalized)) {
                    Some(unit) => Some(Mountable::new(self.doc.clone(), unit, scope)),
                    None => {
                        scope.dispose();
                        None
                    }
                }
            }
        }
    }

    pub(crate) fn render_unit(&self, child: Child) -> Option<Unit> {
        self.render_normalized(normalize(child))
    }

    fn render_normalized(&self, normalized: Normalized) -> Option<Unit> {
        match normalized {
            Normalized::Nothing => None,
            Normalized::Descriptor(d) => Some(self.render_descriptor(d)),
            Normalized::Mounted(mountable) => Some(self.adopt_mountable(mountable)),
            Normalized::Reactive(producer) => Some(self.render_producer(producer)),
        }
    }

    /// A realized node placed as a child becomes owned by the current scope.
    fn adopt_mountable(&self, mountable: Mountable) -> Unit {
        let unit = mountable.unit();
        on_cleanup(move || mountable.dispose_scope());
        unit
    }

    fn placeholder(&self, label: &str) -> Unit {
        let slot = Slot::node(self.doc.create_comment(label));
        Unit {
            life: LifecycleItem::new(Default::default(), slot.clone()),
            slot,
        }
    }

    fn render_producer(&self, producer: Rc<dyn Fn() -> Child>) -> Unit {
        let region = Region::new(self);
        let unit = region.unit();
        effect(move || {
            let child = producer();
            untracked(|| {
                region.swap(|renderer| {
                    renderer
                        .render_unit(child)
                        .unwrap_or_else(|| renderer.placeholder(&renderer.config.empty_label))
                })
            });
        });
        unit
    }

    fn render_descriptor(&self, mut d: Descriptor) -> Unit {
        let presence = d.dom_if.take();
        let key = d.key.take();
        let dynamic = presence.as_ref().is_some_and(Value::is_dynamic)
            || key.as_ref().is_some_and(Value::is_dynamic);

        if !dynamic {
            if presence.is_some_and(|p| !p.get()) {
                return self.placeholder(&self.config.placeholder_label);
            }
            return self.build(&d, key.map(|k| k.get()));
        }

        // Presence and key share one watcher: any change of either discards
        // the node and synthesizes it again.
        let watched = presence
            .unwrap_or(Value::Static(true))
            .zip(key.map_or(Value::Static(None), |k| k.map(Some)));
        let region = Region::new(self);
        let unit = region.unit();
        watch(
            move || watched.get(),
            move |state: &(bool, Option<String>), _: Option<&(bool, Option<String>)>| {
                let (present, key) = state;
                region.swap(|renderer| {
                    if *present {
                        renderer.build(&d, key.clone())
                    } else {
                        renderer.placeholder(&renderer.config.placeholder_label)
                    }
                });
            },
        );
        unit
    }

    fn build(&self, d: &Descriptor, key: Option<String>) -> Unit {
        let doc = &self.doc;
        let node = match &d.tag {
            Tag::Text | Tag::Comment => return self.build_leaf(d, key),
            Tag::Element(tag) => doc.create_element(tag),
            Tag::Fragment => doc.create_fragment(),
        };
        if let Some(key) = &key {
            doc.set_key(node, Some(key));
        }
        let slot = Slot::node(node);
        let life = LifecycleItem::new(d.hooks.clone(), slot.clone());

        if let Some(css) = d.css.clone() {
            self.bind_css(node, css);
        }
        self.bind_style(node, d.style.clone(), d.dom_show.clone());
        if let Some(id) = d.id.clone() {
            let doc = doc.clone();
            bind(id, move |id: &String, _| doc.set_id(node, non_empty(id)));
        }
        if let Some(class) = d.class.clone() {
            let doc = doc.clone();
            bind(class, move |class: &String, _| {
                doc.set_class(node, non_empty(class))
            });
        }

        if let Some(html) = d.html.clone() {
            let doc = doc.clone();
            bind(html, move |html: &String, _| doc.set_html(node, Some(html)));
        } else if let Some(text) = d.text.clone() {
            let text_node = doc.create_text("");
            self.attach(node, text_node);
            let doc = doc.clone();
            bind(text, move |text: &String, _| doc.set_data(text_node, text));
        } else {
            for child in &d.children {
                if let Some(unit) = self.render_unit(child.clone()) {
                    self.attach(node, unit.slot.get());
                    life.add_child(unit.life);
                }
            }
        }

        if let Some(attrs) = d.attrs.clone() {
            self.bind_attrs(node, attrs);
        }
        if let Some(props) = d.props.clone() {
            self.bind_props(node, props);
        }
        for binding in &d.on {
            match doc.add_listener(node, &binding.event, binding.options, binding.handler.clone()) {
                Ok(listener) => {
                    let doc = doc.clone();
                    on_cleanup(move || {
                        doc.remove_listener(node, listener);
                    });
                }
                Err(err) => log::warn!("`{}` listener not added: {err}", binding.event),
            }
        }
        if let Some(list) = d.list.clone() {
            life.add_child(self.render_list(node, list));
        }
        if let Some(options) = &d.surface {
            slot.set(self.surfaces.adopt(doc, options, node));
        }

        Unit { slot, life }
    }

    /// Text and comment nodes: content plus visibility, nothing else.
    fn build_leaf(&self, d: &Descriptor, key: Option<String>) -> Unit {
        let doc = self.doc.clone();
        let comment = d.tag == Tag::Comment;
        let node = if comment {
            doc.create_comment("")
        } else {
            doc.create_text("")
        };
        if let Some(key) = &key {
            doc.set_key(node, Some(key));
        }
        let content = d
            .text
            .clone()
            .unwrap_or_default()
            .zip(d.dom_show.clone().unwrap_or(Value::Static(true)));
        let hidden = self.config.hidden_comment.clone();
        bind(
            content,
            move |state: &(String, bool), _: Option<&(String, bool)>| {
                let (text, visible) = state;
                let data = match (*visible, comment) {
                    (true, _) => text.as_str(),
                    (false, true) => hidden.as_str(),
                    (false, false) => "",
                };
                doc.set_data(node, data);
            },
        );
        let slot = Slot::node(node);
        Unit {
            life: LifecycleItem::new(d.hooks.clone(), slot.clone()),
            slot,
        }
    }

    fn attach(&self, parent: NodeId, child: NodeId) {
        if let Err(err) = self.doc.append_child(parent, child) {
            log::warn!("child not attached: {err}");
        }
    }

    /// Cascading rules live in a `<style>` element that is the node's first
    /// child.
    fn bind_css(&self, node: NodeId, css: Value<StyleSheet>) {
        let doc = self.doc.clone();
        let style_el = doc.create_element("style");
        let text = doc.create_text("");
        self.attach(style_el, text);
        if let Err(err) = doc.insert_before(node, style_el, doc.first_child(node)) {
            log::warn!("style rules not attached: {err}");
        }
        bind(css, move |sheet: &StyleSheet, _| {
            doc.set_data(text, &sheet.to_css())
        });
    }

    /// Inline style and visibility fold into one effective style: hiding
    /// forces `display: none` on top of the current style.
    fn bind_style(&self, node: NodeId, style: Option<Value<Style>>, show: Option<Value<bool>>) {
        if style.is_none() && show.is_none() {
            return;
        }
        let effective = style
            .unwrap_or_default()
            .zip(show.unwrap_or(Value::Static(true)));
        let doc = self.doc.clone();
        bind(
            effective,
            move |state: &(Style, bool), _: Option<&(Style, bool)>| {
                let (style, visible) = state;
                let css = if *visible {
                    style.to_css()
                } else {
                    style.hidden().to_css()
                };
                doc.set_style(node, non_empty(&css));
            },
        );
    }

    fn bind_attrs(&self, node: NodeId, attrs: Value<AttrMap>) {
        let doc = self.doc.clone();
        bind(attrs, move |next: &AttrMap, prev: Option<&AttrMap>| {
            if let Some(prev) = prev {
                for name in prev.keys().filter(|k| !next.contains_key(*k)) {
                    doc.set_attr(node, name, None);
                }
            }
            for (name, value) in next {
                if prev.and_then(|p| p.get(name)) != Some(value) {
                    doc.set_attr(node, name, Some(value.as_str()));
                }
            }
        });
    }

    fn bind_props(&self, node: NodeId, props: Value<PropMap>) {
        let doc = self.doc.clone();
        bind(props, move |next: &PropMap, prev: Option<&PropMap>| {
            if let Some(prev) = prev {
                for name in prev.keys().filter(|k| !next.contains_key(*k)) {
                    doc.set_prop(node, name, None);
                }
            }
            for (name, value) in next {
                if prev.and_then(|p| p.get(name)) != Some(value) {
                    doc.set_prop(node, name, Some(value.clone()));
                }
            }
        });
    }
}

/// Apply a field once, or on every change of its producer.
fn bind<T>(value: Value<T>, mut apply: impl FnMut(&T, Option<&T>) + 'static)
where
    T: PartialEq + Clone + 'static,
{
    match value {
        Value::Static(v) => apply(&v, None),
        Value::Dynamic(f) => {
            watch(move || f(), apply);
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// A position whose content is replaced wholesale.
struct Region {
    renderer: Renderer,
    slot: Slot,
    life: Rc<LifecycleItem>,
    owner: Scope,
    current: RefCell<Option<(Scope, Unit)>>,
}

impl Region {
    fn new(renderer: &Renderer) -> Rc<Self> {
        let slot = Slot::node(NodeId::default());
        Rc::new(Self {
            renderer: renderer.clone(),
            life: LifecycleItem::new(Default::default(), slot.clone()),
            slot,
            owner: current_scope().unwrap_or_default(),
            current: RefCell::new(None),
        })
    }

    fn unit(&self) -> Unit {
        Unit {
            slot: self.slot.clone(),
            life: self.life.clone(),
        }
    }

    fn swap(&self, build: impl FnOnce(&Renderer) -> Unit) {
        let scope = self.owner.child();
        let unit = scope.run(|| build(&self.renderer));
        let old = self.current.borrow_mut().replace((scope, unit.clone()));
        let Some((old_scope, old_unit)) = old else {
            self.slot.follow(&unit.slot);
            self.life.set_children(vec![unit.life]);
            return;
        };

        let doc = self.renderer.document();
        let mounted = self.life.is_mounted();
        if mounted {
            unit.life.before_mount();
            let mut pending = Vec::new();
            old_unit.life.before_unmount(&mut pending);
            if !pending.is_empty() {
                log::debug!("region swap does not wait for {} pending unmount(s)", pending.len());
            }
        }
        let old_node = old_unit.slot.get();
        if let Err(err) = doc.replace(old_node, unit.slot.get()) {
            log::warn!("region swap failed: {err}");
        }
        self.slot.follow(&unit.slot);
        self.life.set_children(vec![unit.life.clone()]);
        if mounted {
            old_unit.life.unmounted();
        }
        old_scope.dispose();
        doc.release(old_node);
        if mounted {
            unit.life.mounted();
        }
    }
}
