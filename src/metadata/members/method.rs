use std::{fmt, ops::Deref, sync::Arc};

use crate::metadata::{
    annotations::AnnotationValue,
    names::{is_reserved, CONSTRUCTOR_NAME},
    typesystem::{ClassRc, ClassRef, Modifiers},
};

/// A reference-counted pointer to a `Method`
pub type MethodRc = Arc<Method>;

/// A method declared on a class. Constructors and static initializers are methods with
/// the reserved names `<init>` and `<clinit>`.
pub struct Method {
    /// Method name
    pub name: String,
    /// Method modifiers
    pub flags: Modifiers,
    /// Raw method descriptor
    pub descriptor: String,
    parameter_types: Vec<ClassRef>,
    return_type: ClassRef,
    declaring_class: ClassRef,
    annotation_default: Option<AnnotationValue>,
    vtable_index: Option<u16>,
}

impl Method {
    pub(crate) fn new(
        name: String,
        flags: Modifiers,
        descriptor: String,
        parameter_types: Vec<ClassRef>,
        return_type: ClassRef,
        declaring_class: ClassRef,
    ) -> Self {
        Method {
            name,
            flags,
            descriptor,
            parameter_types,
            return_type,
            declaring_class,
            annotation_default: None,
            vtable_index: None,
        }
    }

    pub(crate) fn with_annotation_default(mut self, value: Option<AnnotationValue>) -> Self {
        self.annotation_default = value;
        self
    }

    pub(crate) fn with_vtable_index(mut self, index: Option<u16>) -> Self {
        self.vtable_index = index;
        self
    }

    /// Declared parameter types, in order
    #[must_use]
    pub fn parameter_types(&self) -> Vec<ClassRc> {
        self.parameter_types
            .iter()
            .filter_map(ClassRef::upgrade)
            .collect()
    }

    /// Number of declared parameters
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_types.len()
    }

    pub(crate) fn parameter_refs(&self) -> &[ClassRef] {
        &self.parameter_types
    }

    /// Declared return type
    #[must_use]
    pub fn return_type(&self) -> Option<ClassRc> {
        self.return_type.upgrade()
    }

    /// The class declaring this method
    #[must_use]
    pub fn declaring_class(&self) -> Option<ClassRc> {
        self.declaring_class.upgrade()
    }

    /// Modifier bits of this method
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.flags
    }

    /// Returns `true` if the method is public
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.flags.contains(Modifiers::PUBLIC)
    }

    /// Returns `true` if the method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(Modifiers::STATIC)
    }

    /// Returns `true` for constructors and static initializers
    #[must_use]
    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }

    /// Returns `true` for constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Default value of an annotation interface element
    #[must_use]
    pub fn annotation_default(&self) -> Option<&AnnotationValue> {
        self.annotation_default.as_ref()
    }

    /// Slot of this method in the virtual table of its declaring class, if it is virtual
    #[must_use]
    pub fn vtable_index(&self) -> Option<u16> {
        self.vtable_index
    }

    /// Returns `true` if the method takes part in virtual dispatch
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        !self.is_reserved() && !self.flags.intersects(Modifiers::STATIC | Modifiers::PRIVATE)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{}(",
            self.return_type.name(),
            self.declaring_class.name(),
            self.name
        )?;
        for (i, param) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&param.name())?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .field("flags", &self.flags)
            .field("vtable_index", &self.vtable_index)
            .finish()
    }
}

/// A constructor: a view of an `<init>` method
#[derive(Clone, Debug)]
pub struct Constructor {
    method: MethodRc,
}

impl Constructor {
    pub(crate) fn new(method: MethodRc) -> Self {
        debug_assert!(method.is_constructor());
        Constructor { method }
    }

    /// The underlying `<init>` method
    #[must_use]
    pub fn method(&self) -> &MethodRc {
        &self.method
    }
}

impl Deref for Constructor {
    type Target = Method;

    fn deref(&self) -> &Method {
        &self.method
    }
}

impl PartialEq for Constructor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.method, &other.method)
    }
}

impl fmt::Display for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.method.declaring_class.name())?;
        for (i, param) in self.method.parameter_types.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(&param.name())?;
        }
        f.write_str(")")
    }
}
