use std::fmt;
use std::sync::Arc;

use ipld_schema::{Type, TypeId, TypeSystem};

use super::{builder::NodeBuilder, type_label, typed_node::TypedNode, View};
use crate::{error::NodeError, node::Node};

/// Produces builders for one type of a type system, in one view.
#[derive(Clone)]
pub struct NodePrototype {
    pub(crate) ts: Arc<TypeSystem>,
    pub(crate) id: TypeId,
    pub(crate) view: View,
}

impl NodePrototype {
    /// The type-level prototype of the type named (or anonymously referenced) by `reference`.
    pub fn new(ts: &Arc<TypeSystem>, reference: &str) -> Option<Self> {
        let id = ts.lookup_id(reference)?;
        Some(Self {
            ts: Arc::clone(ts),
            id,
            view: View::Type,
        })
    }

    /// The same type, assembled from its serialized shape.
    pub fn representation(&self) -> Self {
        Self {
            view: View::Representation,
            ..self.clone()
        }
    }

    pub fn type_(&self) -> &Type {
        self.ts.get(self.id)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn new_builder(&self) -> NodeBuilder {
        NodeBuilder::new(self.clone())
    }

    /// Builds a value of this prototype's type out of any node of a matching shape.
    pub fn from_node(&self, node: &dyn Node) -> Result<TypedNode, NodeError> {
        let mut builder = self.new_builder();
        builder.assembler().assign_node(node)?;
        Ok(builder.build())
    }
}

impl fmt::Debug for NodePrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodePrototype({})", type_label(self.type_(), self.view))
    }
}
