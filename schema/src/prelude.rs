use lazy_static::lazy_static;

use super::{compiler::Compiler, names::TypeName};

lazy_static! {
    pub static ref PRELUDE_BOOL_NAME: TypeName = TypeName::from("Bool");
    pub static ref PRELUDE_STRING_NAME: TypeName = TypeName::from("String");
    pub static ref PRELUDE_BYTES_NAME: TypeName = TypeName::from("Bytes");
    pub static ref PRELUDE_INT_NAME: TypeName = TypeName::from("Int");
    pub static ref PRELUDE_FLOAT_NAME: TypeName = TypeName::from("Float");
    /// The unconstrained link type
    pub static ref PRELUDE_LINK_NAME: TypeName = TypeName::from("Link");
}

pub fn prelude_names() -> [&'static TypeName; 6] {
    [
        &*PRELUDE_BOOL_NAME,
        &*PRELUDE_STRING_NAME,
        &*PRELUDE_BYTES_NAME,
        &*PRELUDE_INT_NAME,
        &*PRELUDE_FLOAT_NAME,
        &*PRELUDE_LINK_NAME,
    ]
}

/// Declares one type per scalar kind, named after the kind.
pub(super) fn register_prelude(compiler: &mut Compiler) {
    compiler.declare_bool(PRELUDE_BOOL_NAME.clone());
    compiler.declare_string(PRELUDE_STRING_NAME.clone());
    compiler.declare_bytes(PRELUDE_BYTES_NAME.clone());
    compiler.declare_int(PRELUDE_INT_NAME.clone());
    compiler.declare_float(PRELUDE_FLOAT_NAME.clone());
    compiler.declare_link(PRELUDE_LINK_NAME.clone(), None);
}
