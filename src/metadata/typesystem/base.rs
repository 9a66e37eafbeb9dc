use std::{
    any::Any,
    fmt,
    sync::{Arc, Weak},
};

use bitflags::bitflags;

use crate::metadata::typesystem::{Class, ClassRc};

/// A smart reference to a `Class` that automatically handles weak references
/// to prevent circular reference memory leaks while providing a clean API.
///
/// Descriptors are owned by the registry of their loader. Links that may form cycles
/// (interfaces, member types, annotation values) are `ClassRef`s; the superclass and the
/// component of a reference array are held strongly.
#[derive(Clone)]
pub struct ClassRef {
    weak_ref: Weak<Class>,
}

impl ClassRef {
    /// Create a new `ClassRef` from a strong reference
    pub fn new(strong_ref: &ClassRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    pub(crate) fn from_weak(weak_ref: Weak<Class>) -> Self {
        Self { weak_ref }
    }

    /// Get a strong reference to the class, returning None if the class has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<ClassRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced class is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Returns `true` if this reference points at `class`
    #[must_use]
    pub fn is(&self, class: &Class) -> bool {
        std::ptr::eq(self.weak_ref.as_ptr(), class)
    }

    /// Identity comparison of two references
    #[must_use]
    pub fn ptr_eq(&self, other: &ClassRef) -> bool {
        Weak::ptr_eq(&self.weak_ref, &other.weak_ref)
    }

    /// Display name of the referenced class, or `<dropped>`
    #[must_use]
    pub fn name(&self) -> String {
        self.upgrade()
            .map_or_else(|| "<dropped>".to_string(), |class| class.name().to_string())
    }
}

impl From<ClassRc> for ClassRef {
    fn from(strong_ref: ClassRc) -> Self {
        Self::new(&strong_ref)
    }
}

impl From<&ClassRc> for ClassRef {
    fn from(strong_ref: &ClassRc) -> Self {
        Self::new(strong_ref)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassRef({})", self.name())
    }
}

bitflags! {
    /// Access and property modifiers of classes, fields and methods.
    ///
    /// A single set is shared by all three, as the bits never collide in meaning for
    /// the element they are applied to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        /// Accessible from everywhere
        const PUBLIC = 0x0001;
        /// Accessible only from the declaring class
        const PRIVATE = 0x0002;
        /// Accessible from subclasses and the package
        const PROTECTED = 0x0004;
        /// Member belongs to the class, not to instances
        const STATIC = 0x0008;
        /// Cannot be overridden, subclassed or reassigned
        const FINAL = 0x0010;
        /// Method acquires the monitor of its receiver
        const SYNCHRONIZED = 0x0020;
        /// Field is never cached thread-locally
        const VOLATILE = 0x0040;
        /// Field is not part of the persistent state
        const TRANSIENT = 0x0080;
        /// Method is implemented natively
        const NATIVE = 0x0100;
        /// Class is an interface
        const INTERFACE = 0x0200;
        /// Class or method is abstract
        const ABSTRACT = 0x0400;
        /// Method uses strict floating point
        const STRICT = 0x0800;
        /// Generated by the compiler
        const SYNTHETIC = 0x1000;
        /// Class is an annotation interface
        const ANNOTATION = 0x2000;
        /// Class is an enum, or field is an enum constant
        const ENUM = 0x4000;
    }
}

bitflags! {
    /// Runtime-internal class flags, invisible to reflection consumers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VmFlags: u16 {
        /// The class is one of the primitive singletons
        const PRIMITIVE = 1 << 5;
    }
}

/// Content of a class's static-storage slot.
///
/// Reference-array classes have no statics of their own, so the slot is reused to hold
/// their component type.
pub enum StaticTable {
    /// Component class of a reference array
    Component(ClassRc),
    /// Static field storage installed by the runtime (opaque to this crate)
    Storage(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for StaticTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticTable::Component(component) => {
                f.debug_tuple("Component").field(&component.name()).finish()
            }
            StaticTable::Storage(_) => f.write_str("Storage(..)"),
        }
    }
}

/// Opaque signer information attached to a class (certificate bytes)
pub type Signer = Arc<[u8]>;

/// Externally visible lifecycle state of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassState {
    /// Raw definition present, member tables not yet materialized
    Unlinked,
    /// Member tables materialized, static setup not yet run
    Linked,
    /// Static setup is running on some thread
    Initializing,
    /// Static setup completed successfully
    Initialized,
    /// Static setup failed; the class can never be initialized
    Erroneous,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::{primitive_class, PrimitiveKind};

    #[test]
    fn test_class_ref_identity() {
        let int = primitive_class(PrimitiveKind::Int);
        let long = primitive_class(PrimitiveKind::Long);

        let first = ClassRef::new(&int);
        let second: ClassRef = int.clone().into();
        let other = ClassRef::new(&long);

        assert!(first.ptr_eq(&second));
        assert!(!first.ptr_eq(&other));
        assert!(first.is(&int));
        assert!(!first.is(&long));
        assert!(first.is_valid());
        assert_eq!(first.name(), "int");
    }

    #[test]
    fn test_dropped_ref() {
        let class = Class::new_primitive(PrimitiveKind::Byte);
        let weak = ClassRef::new(&class);
        drop(class);
        assert!(!weak.is_valid());
        assert!(weak.upgrade().is_none());
        assert_eq!(weak.name(), "<dropped>");
    }

    #[test]
    fn test_modifiers() {
        let flags = Modifiers::from_bits_truncate(0x0601);
        assert!(flags.contains(Modifiers::PUBLIC));
        assert!(flags.contains(Modifiers::INTERFACE));
        assert!(flags.contains(Modifiers::ABSTRACT));
        assert!(!flags.contains(Modifiers::FINAL));
    }
}
