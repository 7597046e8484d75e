use std::sync::Arc;

use tracing::trace;

use super::{
    assembler::{NodeAssembler, Slot},
    prototype::NodePrototype,
    typed_node::TypedNode,
};

/// Owns the destination of one value under construction.
#[derive(Debug)]
pub struct NodeBuilder {
    prototype: NodePrototype,
    slot: Slot,
}

impl NodeBuilder {
    pub(crate) fn new(prototype: NodePrototype) -> Self {
        Self {
            prototype,
            slot: Slot::Empty,
        }
    }

    pub fn prototype(&self) -> &NodePrototype {
        &self.prototype
    }

    /// The assembler for the root value. The root is never nullable.
    pub fn assembler(&mut self) -> NodeAssembler<'_> {
        NodeAssembler::new(
            &self.prototype.ts,
            self.prototype.id,
            self.prototype.view,
            false,
            &mut self.slot,
        )
    }

    /// The finished value. Panics if assembly has not finished.
    pub fn build(&self) -> TypedNode {
        match &self.slot {
            Slot::Value(value) => TypedNode {
                ts: Arc::clone(&self.prototype.ts),
                id: self.prototype.id,
                view: self.prototype.view,
                value: Arc::clone(value),
            },
            _ => panic!("invalid state: cannot call build on an assembler that's not finished"),
        }
    }

    /// Discards any value, finished or not, so the builder can be used again.
    pub fn reset(&mut self) {
        trace!(prototype = ?self.prototype, "resetting builder");
        self.slot = Slot::Empty;
    }
}

#[cfg(test)]
mod tests {
    use ipld_schema::{Compiler, PreludeOverwriteAction, RegisterPrelude};

    use super::*;
    use crate::node::Node;

    fn int_builder() -> NodeBuilder {
        let ts = Compiler::new(RegisterPrelude::Yes, PreludeOverwriteAction::Deny)
            .compile()
            .unwrap();
        NodePrototype::new(&Arc::new(ts), "Int")
            .unwrap()
            .new_builder()
    }

    #[test]
    #[should_panic(expected = "invalid state: cannot call build on an assembler that's not finished")]
    fn build_before_assign_panics() {
        int_builder().build();
    }

    #[test]
    fn finished_nodes_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypedNode>();
        assert_send_sync::<NodePrototype>();
    }

    #[test]
    fn reset_is_idempotent() {
        let mut builder = int_builder();
        builder.assembler().assign_int(1).unwrap();
        let first = builder.build();
        builder.reset();
        builder.reset();
        builder.assembler().assign_int(2).unwrap();

        assert_eq!(first.as_int(), Ok(1));
        assert_eq!(builder.build().as_int(), Ok(2));
    }

    #[test]
    fn rejected_assignment_leaves_builder_unfinished() {
        let mut builder = int_builder();
        assert!(builder.assembler().assign_string("one").is_err());
        builder.reset();
        builder.assembler().assign_int(1).unwrap();
        assert_eq!(builder.build().as_int(), Ok(1));
    }
}
