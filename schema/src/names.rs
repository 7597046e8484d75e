use std::borrow::Borrow;
use std::fmt;

/// Name of a struct field.
pub type FieldName = String;

/// The name of a declared type. Unique within one [`TypeSystem`](crate::TypeSystem).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this name collides with the syntax reserved for anonymous type references.
    pub(crate) fn is_reserved(&self) -> bool {
        self.0.starts_with('{') || self.0.starts_with('[')
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A reference to a type at a use site: either a [`TypeName`] or the inline descriptor of an
/// anonymous map or list type (`{Key:Value}`, `[Value]`, optionally with `nullable` before the
/// value type).
///
/// References are resolved against the owning type system when it is compiled.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeReference(String);

impl TypeReference {
    /// The reference of the anonymous map type with the given key and value types.
    pub fn anonymous_map(key: &TypeName, value: &TypeReference, value_nullable: bool) -> Self {
        let nullable = if value_nullable { "nullable " } else { "" };
        Self(format!("{{{key}:{nullable}{value}}}"))
    }

    /// The reference of the anonymous list type with the given value type.
    pub fn anonymous_list(value: &TypeReference, value_nullable: bool) -> Self {
        let nullable = if value_nullable { "nullable " } else { "" };
        Self(format!("[{nullable}{value}]"))
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.starts_with('{') || self.0.starts_with('[')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TypeName> for TypeReference {
    fn from(name: TypeName) -> Self {
        Self(name.0)
    }
}

impl From<&TypeName> for TypeReference {
    fn from(name: &TypeName) -> Self {
        Self(name.0.clone())
    }
}

impl From<&str> for TypeReference {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}

impl AsRef<str> for TypeReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets the type system index be queried with a plain `&str`; `Hash` and `Eq` agree with `str`'s
// since both are derived from the single `String` field.
impl Borrow<str> for TypeReference {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_references_are_recognized() {
        let int = TypeReference::from("Int");
        let list = TypeReference::anonymous_list(&int, false);
        assert_eq!(list.as_str(), "[Int]");
        assert!(list.is_anonymous());
        assert!(!int.is_anonymous());

        let map = TypeReference::anonymous_map(&"String".into(), &list, true);
        assert_eq!(map.as_str(), "{String:nullable [Int]}");
        assert!(map.is_anonymous());
    }

    #[test]
    fn reserved_names() {
        assert!(TypeName::from("[Int]").is_reserved());
        assert!(!TypeName::from("Int").is_reserved());
    }
}
