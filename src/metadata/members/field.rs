use std::{fmt, sync::Arc};

use crate::metadata::typesystem::{ClassRc, ClassRef, Modifiers};

/// A reference-counted pointer to a `Field`
pub type FieldRc = Arc<Field>;

/// A field declared on a class, with its type resolved by the Link Gate
pub struct Field {
    /// Field name
    pub name: String,
    /// Field modifiers
    pub flags: Modifiers,
    /// Raw field descriptor
    pub descriptor: String,
    field_type: ClassRef,
    declaring_class: ClassRef,
}

impl Field {
    pub(crate) fn new(
        name: String,
        flags: Modifiers,
        descriptor: String,
        field_type: ClassRef,
        declaring_class: ClassRef,
    ) -> Self {
        Field {
            name,
            flags,
            descriptor,
            field_type,
            declaring_class,
        }
    }

    /// The declared type of the field
    #[must_use]
    pub fn field_type(&self) -> Option<ClassRc> {
        self.field_type.upgrade()
    }

    /// The class declaring this field
    #[must_use]
    pub fn declaring_class(&self) -> Option<ClassRc> {
        self.declaring_class.upgrade()
    }

    /// Modifier bits of this field
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.flags
    }

    /// Returns `true` if the field is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags.contains(Modifiers::PUBLIC)
    }

    /// Returns `true` if the field is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(Modifiers::STATIC)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}",
            self.field_type.name(),
            self.declaring_class.name(),
            self.name
        )
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("flags", &self.flags)
            .finish()
    }
}
