//! Column metadata, consumed (not owned) by this core. Only the type and
//! nullability are interpreted here; the expression references are opaque
//! handles owned by the schema layer.

use crate::types::{TypeRef, Value};

#[derive(Clone)]
pub struct Column {
    pub name: String,
    pub ty: TypeRef,
    pub nullable: bool,
    /// Opaque default-expression reference, if any.
    pub default: Option<String>,
    /// Opaque generated-expression reference, if any.
    pub generated: Option<String>,
    /// Opaque on-update expression reference, if any.
    pub on_update: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: TypeRef, nullable: bool) -> Self {
        Column {
            name: name.into(),
            ty,
            nullable,
            default: None,
            generated: None,
            on_update: None,
        }
    }

    /// Whether the value is assignable to this column: nil on a nullable
    /// column, or anything the column type converts.
    pub fn check(&self, v: &Value) -> bool {
        if v.is_null() {
            return self.nullable;
        }
        self.ty.convert(v.clone()).is_ok()
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("nullable", &self.nullable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NumberType;
    use std::sync::Arc;

    #[test]
    fn test_check() {
        let nullable = Column::new("a", Arc::new(NumberType::INT32), true);
        let required = Column::new("b", Arc::new(NumberType::INT32), false);
        assert!(nullable.check(&Value::Null));
        assert!(!required.check(&Value::Null));
        assert!(required.check(&Value::I64(5)));
        assert!(!required.check(&Value::Str("five".into())));
    }
}
