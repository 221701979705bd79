//! `Structural`: the immutable, shared-by-many-connections configuration
//! object. Holds reject masks, control-policy hooks, per-layer handler
//! overrides, and the operation registry. Built once through
//! [`StructuralBuilder`] and attached to connections behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::controls::ControlHook;
use crate::policy::RejectMask;
use crate::registry::OpRegistry;

/// A replaceable dispatch-layer handler. Each of the six ingress and six
/// egress layers is one of these; the default `None` means "use the
/// built-in cascade described in the dispatch module".
pub type LayerHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct IngressHandlers {
    pub dercursor: Option<LayerHandler>,
    pub ldapmessage: Option<LayerHandler>,
    pub opcode: Option<LayerHandler>,
    pub operation: Option<LayerHandler>,
    pub opresp: Option<LayerHandler>,
    pub controls: Option<LayerHandler>,
}

#[derive(Default)]
pub struct EgressHandlers {
    pub operation: Option<LayerHandler>,
    pub opcode: Option<LayerHandler>,
    pub ldapmessage: Option<LayerHandler>,
    pub dercursor: Option<LayerHandler>,
    pub opresp: Option<LayerHandler>,
    pub controls: Option<LayerHandler>,
}

/// The four control-policy hook slots of §4.8: a per-opcode hook keyed by
/// opcode, and an all-opcodes fallback, for each direction.
#[derive(Default)]
pub struct ControlPolicy {
    pub recv_by_opcode: HashMap<u32, ControlHook>,
    pub recv_all: Option<ControlHook>,
    pub send_by_opcode: HashMap<u32, ControlHook>,
    pub send_all: Option<ControlHook>,
}

/// Per-endpoint immutable configuration, shared read-only by every
/// `Connection` attached to it.
pub struct Structural {
    pub ingress_reject: RejectMask,
    pub egress_reject: RejectMask,
    pub controls: ControlPolicy,
    pub ingress: IngressHandlers,
    pub egress: EgressHandlers,
    pub registry: OpRegistry,
}

impl Structural {
    pub fn builder() -> StructuralBuilder {
        StructuralBuilder::new()
    }
}

/// Assembles a [`Structural`]. There is no file-backed configuration format;
/// a `Structural` is built once, in code, and shared via `Arc`.
#[derive(Default)]
pub struct StructuralBuilder {
    ingress_reject: RejectMask,
    egress_reject: RejectMask,
    controls: ControlPolicy,
    ingress: IngressHandlers,
    egress: EgressHandlers,
    registry: OpRegistry,
}

impl StructuralBuilder {
    pub fn new() -> Self {
        StructuralBuilder::default()
    }

    pub fn ingress_reject(mut self, mask: RejectMask) -> Self {
        self.ingress_reject = mask;
        self
    }

    pub fn egress_reject(mut self, mask: RejectMask) -> Self {
        self.egress_reject = mask;
        self
    }

    pub fn recv_hook(mut self, opcode: u32, hook: ControlHook) -> Self {
        self.controls.recv_by_opcode.insert(opcode, hook);
        self
    }

    pub fn recv_all_hook(mut self, hook: ControlHook) -> Self {
        self.controls.recv_all = Some(hook);
        self
    }

    pub fn send_hook(mut self, opcode: u32, hook: ControlHook) -> Self {
        self.controls.send_by_opcode.insert(opcode, hook);
        self
    }

    pub fn send_all_hook(mut self, hook: ControlHook) -> Self {
        self.controls.send_all = Some(hook);
        self
    }

    pub fn registry(mut self, registry: OpRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn build(self) -> Arc<Structural> {
        Arc::new(Structural {
            ingress_reject: self.ingress_reject,
            egress_reject: self.egress_reject,
            controls: self.controls,
            ingress: self.ingress,
            egress: self.egress,
            registry: self.registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_builder_rejects_nothing() {
        let structural = Structural::builder().build();
        assert_eq!(structural.ingress_reject, RejectMask::new());
        assert!(structural.controls.recv_all.is_none());
    }
}
