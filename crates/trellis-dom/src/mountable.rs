use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use trellis_core::Scope;

use crate::dom::{Document, NodeId};
use crate::error::DomError;
use crate::lifecycle::Pending;
use crate::render::Unit;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MountState {
    Detached,
    Mounted,
    Unmounted,
}

/// Where to attach a realized node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Selector(String),
    Node(NodeId),
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Target::Node(node)
    }
}

/// A realized node together with everything that keeps it live.
///
/// Unmounting is final: the node's watchers are disposed and the node is
/// freed once every pending before-unmount operation has settled.
#[derive(Clone)]
pub struct Mountable(Rc<MountInner>);

struct MountInner {
    doc: Document,
    unit: Unit,
    scope: Scope,
    state: Cell<MountState>,
}

impl Mountable {
    pub(crate) fn new(doc: Document, unit: Unit, scope: Scope) -> Self {
        Self(Rc::new(MountInner {
            doc,
            unit,
            scope,
            state: Cell::new(MountState::Detached),
        }))
    }

    pub(crate) fn unit(&self) -> Unit {
        self.0.unit.clone()
    }

    /// Stop every watcher owned by this node without touching the tree.
    pub(crate) fn dispose_scope(&self) {
        self.0.scope.dispose();
    }

    /// The node currently standing for this content. It changes when a
    /// conditional or keyed root is re-synthesized.
    pub fn node(&self) -> NodeId {
        self.0.unit.slot.get()
    }

    pub fn document(&self) -> &Document {
        &self.0.doc
    }

    pub fn is_mounted(&self) -> bool {
        self.0.state.get() == MountState::Mounted
    }

    /// Like [`Mountable::try_mount`], but a missing target is only logged.
    pub fn mount(&self, target: impl Into<Target>) {
        if let Err(err) = self.try_mount(target) {
            log::debug!("mount skipped: {err}");
        }
    }

    pub fn try_mount(&self, target: impl Into<Target>) -> Result<(), DomError> {
        let doc = &self.0.doc;
        let parent = match target.into() {
            Target::Selector(selector) => doc
                .query(&selector)?
                .ok_or(DomError::TargetNotFound(selector))?,
            Target::Node(node) if doc.contains(node) => node,
            Target::Node(node) => return Err(DomError::StaleNode(node)),
        };
        match self.0.state.get() {
            MountState::Mounted => return Ok(()),
            MountState::Unmounted => return Err(DomError::StaleNode(self.node())),
            MountState::Detached => {}
        }

        let life = &self.0.unit.life;
        life.before_mount();
        doc.append_child(parent, self.node())?;
        self.0.state.set(MountState::Mounted);
        life.mounted();
        Ok(())
    }

    /// Run before-unmount hooks, then detach and free the node once all of
    /// their pending operations settle. Idempotent; the returned [`Pending`]
    /// settles when the node is gone.
    pub fn unmount(&self) -> Pending {
        let was_mounted = match self.0.state.replace(MountState::Unmounted) {
            MountState::Unmounted => return Pending::settled(),
            state => state == MountState::Mounted,
        };

        let mut pending = Vec::new();
        if was_mounted {
            self.0.unit.life.before_unmount(&mut pending);
        }
        let done = Pending::all(pending);
        let this = self.clone();
        done.on_settled(move || this.teardown(was_mounted));
        done
    }

    fn teardown(&self, was_mounted: bool) {
        let doc = &self.0.doc;
        let node = self.node();
        if let Err(err) = doc.remove(node) {
            log::debug!("unmount of a freed node: {err}");
        }
        if was_mounted {
            self.0.unit.life.unmounted();
        }
        self.0.scope.dispose();
        doc.release(node);
    }
}

impl fmt::Debug for Mountable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mountable")
            .field("node", &self.node())
            .field("state", &self.0.state.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::descriptor::Element;
    use crate::render::Renderer;

    #[test]
    fn test_mount_to_missing_target_is_a_no_op() {
        let r = Renderer::new(Document::new());
        let m = r.render(Element("p"));
        m.mount("#nowhere");
        assert!(!m.is_mounted());
        assert_eq!(
            m.try_mount("#nowhere"),
            Err(DomError::TargetNotFound("#nowhere".into()))
        );
        assert_eq!(
            m.try_mount("#"),
            Err(DomError::InvalidSelector("#".into()))
        );
    }

    #[test]
    fn test_unmount_waits_for_pending() {
        let doc = Document::new();
        let r = Renderer::new(doc.clone());
        let exit = Pending::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (on_exit, l1, l2) = (exit.clone(), log.clone(), log.clone());
        let m = r.render(
            Element("div")
                .before_unmount(move |_| {
                    l1.borrow_mut().push("before_unmount");
                    Some(on_exit.clone())
                })
                .unmounted(move || l2.borrow_mut().push("unmounted")),
        );
        m.mount("body");
        let node = m.node();
        assert!(doc.is_connected(node));

        let done = m.unmount();
        assert!(!m.is_mounted());
        assert!(!done.is_settled());
        assert!(doc.is_connected(node));
        assert_eq!(*log.borrow(), vec!["before_unmount"]);

        exit.resolve();
        assert!(done.is_settled());
        assert!(!doc.contains(node));
        assert_eq!(*log.borrow(), vec!["before_unmount", "unmounted"]);

        assert!(m.unmount().is_settled());
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_unmounted_content_cannot_be_remounted() {
        let r = Renderer::new(Document::new());
        let m = r.render(Element("p"));
        let node = m.node();
        assert!(m.unmount().is_settled());
        assert_eq!(m.try_mount("body"), Err(DomError::StaleNode(node)));
    }
}
