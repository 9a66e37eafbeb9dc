//! Class descriptors: the runtime representation of every loaded type.
//!
//! This module provides [`Class`], one per loaded class, interface, array and primitive,
//! together with the supporting pieces needed to create and relate them.
//!
//! # Key Components
//!
//! - [`Class`]: The descriptor, with lazily linked member tables and a one-time
//!   initialization state
//! - [`ClassRef`]: Weak, non-owning link between descriptors
//! - [`ClassRegistry`]: Per-loader arena that owns descriptors for the loader's lifetime
//! - [`ClassBuilder`] / [`ClassDefinition`]: Raw, unlinked class metadata
//! - [`primitive_class`]: The process-wide primitive singletons
//!
//! # Descriptor Kinds
//!
//! Exactly one of the following holds for every descriptor:
//! - **Primitive**: carries [`VmFlags::PRIMITIVE`] and is one of the nine singletons
//! - **Array**: has a non-zero dimension count; the component type of a reference array
//!   is kept in the static-storage slot, primitive components come from a fixed table
//! - **Composite**: an ordinary class or interface created from a [`ClassDefinition`]
//!
//! # Examples
//!
//! ```rust
//! use classscope::{loader::{ClassLoader, MemoryLoader}, metadata::typesystem::ClassBuilder};
//!
//! let loader = MemoryLoader::system();
//! loader.add_definition(ClassBuilder::new("com/acme/Outer$Inner").extends("java/lang/Object").build());
//!
//! let inner = loader.load_class("com.acme.Outer$Inner")?;
//! assert_eq!(inner.name(), "com.acme.Outer$Inner");
//! assert_eq!(inner.canonical_name(), "com.acme.Outer.Inner");
//! assert_eq!(inner.simple_name(), "Inner");
//! # Ok::<(), classscope::Error>(())
//! ```

mod base;
mod builder;
mod primitives;
mod registry;
mod relations;

use std::{
    fmt,
    io::Cursor,
    sync::{Arc, OnceLock, Weak},
};

pub use base::{ClassRef, ClassState, Modifiers, Signer, StaticTable, VmFlags};
pub use builder::{
    AnnotationDefinition, ClassBuilder, ClassDefinition, FieldDefinition, MethodDefinition,
};
pub use primitives::{primitive_class, primitive_kind_of, PrimitiveKind};
pub use registry::ClassRegistry;

use crate::{
    loader::{ClassLoader, Resource},
    metadata::{init::InitLock, link::LinkGate, names},
    Error, Result,
};

/// Reference to a `Class`
pub type ClassRc = Arc<Class>;

/// Weak handle to the loader that defined a class
pub type LoaderRef = Weak<dyn ClassLoader>;

/// The runtime descriptor of one loaded type.
///
/// Descriptors are created unlinked by a loader, link their member tables on first
/// structural access and run their static setup at most once. All mutable state is held
/// in once-cells or behind the link and initialization locks, so a `Class` can be shared
/// freely between threads.
pub struct Class {
    /// Modifier flags
    flags: Modifiers,
    /// Runtime-internal flags
    vm_flags: VmFlags,
    /// Fixed instance size in bytes (value size for primitives)
    fixed_size: u16,
    /// Size in bytes of one array element (0 for non-arrays)
    array_element_size: u8,
    /// Number of array dimensions (0 for non-arrays)
    array_dimensions: u8,
    /// Object-reference bitmap for the collector
    object_mask: Option<Box<[u32]>>,
    /// Internal name bytes, NUL terminated; filled lazily for primitives
    name: OnceLock<Box<[u8]>>,
    /// Cached display name
    display_name: OnceLock<String>,
    /// Source file name, if recorded
    source_file: Option<String>,
    /// Superclass, absent for the root class, interfaces and primitives. Held strongly:
    /// the superclass chain is acyclic and must outlive the registry that defined it.
    super_class: Option<ClassRc>,
    /// Defining loader, absent for primitives
    loader: Option<LoaderRef>,
    /// Static storage, or the component type of a reference array
    static_table: OnceLock<StaticTable>,
    /// Signers of this class
    signers: OnceLock<Box<[Signer]>>,
    /// Handle to this descriptor, used to link members back to their declaring class
    this: Weak<Class>,
    pub(crate) link: LinkGate,
    pub(crate) init: InitLock,
}

impl Class {
    /// Create one of the primitive singletons. Only the primitive table may call this.
    pub(crate) fn new_primitive(kind: PrimitiveKind) -> ClassRc {
        Arc::new_cyclic(|this| Class {
            flags: Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ABSTRACT,
            vm_flags: VmFlags::PRIMITIVE,
            fixed_size: u16::from(kind.size()),
            array_element_size: 0,
            array_dimensions: 0,
            object_mask: None,
            name: OnceLock::new(),
            display_name: OnceLock::new(),
            source_file: None,
            super_class: None,
            loader: None,
            static_table: OnceLock::new(),
            signers: OnceLock::new(),
            this: this.clone(),
            link: LinkGate::without_members(),
            init: InitLock::new(),
        })
    }

    /// Create an unlinked class from its raw definition.
    pub(crate) fn from_definition(
        definition: ClassDefinition,
        super_class: Option<&ClassRc>,
        loader: LoaderRef,
    ) -> ClassRc {
        Arc::new_cyclic(|this| {
            let name = OnceLock::new();
            name.set(names::encode_internal(&definition.name)).ok();

            let signers = OnceLock::new();
            if !definition.signers.is_empty() {
                signers
                    .set(definition.signers.clone().into_boxed_slice())
                    .ok();
            }

            Class {
                flags: definition.flags,
                vm_flags: VmFlags::empty(),
                fixed_size: definition.fixed_size,
                array_element_size: 0,
                array_dimensions: 0,
                object_mask: definition.object_mask.clone().map(Vec::into_boxed_slice),
                name,
                display_name: OnceLock::new(),
                source_file: definition.source_file.clone(),
                super_class: super_class.cloned(),
                loader: Some(loader),
                static_table: OnceLock::new(),
                signers,
                this: this.clone(),
                link: LinkGate::new(definition),
                init: InitLock::new(),
            }
        })
    }

    /// Create an array class over `component`.
    pub(crate) fn new_array(
        name: &str,
        component: &ClassRc,
        super_class: Option<&ClassRc>,
        loader: Option<LoaderRef>,
    ) -> ClassRc {
        let element_size = if component.is_primitive() {
            component.fixed_size as u8
        } else {
            std::mem::size_of::<usize>() as u8
        };
        let access = component.flags & (Modifiers::PUBLIC | Modifiers::PRIVATE | Modifiers::PROTECTED);

        Arc::new_cyclic(|this| {
            let internal = OnceLock::new();
            internal.set(names::encode_internal(name)).ok();

            let static_table = OnceLock::new();
            if !component.is_primitive() {
                static_table
                    .set(StaticTable::Component(component.clone()))
                    .ok();
            }

            Class {
                flags: access | Modifiers::FINAL | Modifiers::ABSTRACT,
                vm_flags: VmFlags::empty(),
                fixed_size: 0,
                array_element_size: element_size,
                array_dimensions: component.array_dimensions.saturating_add(1),
                object_mask: None,
                name: internal,
                display_name: OnceLock::new(),
                source_file: None,
                super_class: super_class.cloned(),
                loader,
                static_table,
                signers: OnceLock::new(),
                this: this.clone(),
                link: LinkGate::without_members(),
                init: InitLock::new(),
            }
        })
    }

    /// A weak handle to this descriptor
    #[must_use]
    pub fn class_ref(&self) -> ClassRef {
        ClassRef::from_weak(self.this.clone())
    }

    /// A strong handle to this descriptor
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if the owning registry has already been dropped.
    pub fn to_rc(&self) -> Result<ClassRc> {
        self.this
            .upgrade()
            .ok_or_else(|| Error::TypeNotFound(self.internal_name().to_string()))
    }

    /// The primitive kind of this descriptor, checked by identity against the singletons.
    ///
    /// # Panics
    /// Panics if the descriptor carries the primitive marker without being one of the
    /// singletons; that state cannot be constructed through the public API.
    fn expect_primitive_kind(&self) -> PrimitiveKind {
        match primitive_kind_of(self) {
            Some(kind) => kind,
            None => panic!("descriptor carries the primitive marker but is not a primitive singleton"),
        }
    }

    /// Internal name bytes (NUL terminated), materializing them for primitives.
    fn raw_name(&self) -> &[u8] {
        self.name
            .get_or_init(|| names::encode_internal(self.expect_primitive_kind().name()))
    }

    /// The internal binary name (`java/lang/String`, `[I`)
    #[must_use]
    pub fn internal_name(&self) -> &str {
        std::str::from_utf8(names::trim_nul(self.raw_name())).unwrap_or_default()
    }

    /// The display name (`java.lang.String`, `[I`, `int`)
    ///
    /// Primitives always answer one of the nine fixed literals.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name.get_or_init(|| {
            if self.is_primitive() {
                self.expect_primitive_kind().name().to_string()
            } else {
                names::display_name(self.raw_name())
            }
        })
    }

    /// The canonical name (`java.util.Map.Entry`, `java.lang.String[]`)
    #[must_use]
    pub fn canonical_name(&self) -> String {
        if self.is_primitive() {
            self.name().to_string()
        } else if self.is_array() {
            match self.component_type() {
                Some(component) => format!("{}[]", component.canonical_name()),
                None => names::canonical_from_display(self.name()),
            }
        } else {
            names::canonical_from_display(self.name())
        }
    }

    /// The simple name: canonical name after its last `.`
    #[must_use]
    pub fn simple_name(&self) -> String {
        if self.is_primitive() {
            return self.name().to_string();
        }
        names::simple_name(&self.canonical_name()).to_string()
    }

    /// The package part of the canonical name; absent for primitives, arrays and
    /// classes in the unnamed package
    #[must_use]
    pub fn package_name(&self) -> Option<String> {
        if self.is_primitive() || self.is_array() {
            return None;
        }
        names::package_name(&self.canonical_name()).map(str::to_string)
    }

    /// Modifier flags
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.flags
    }

    /// Runtime-internal flags
    #[must_use]
    pub fn vm_flags(&self) -> VmFlags {
        self.vm_flags
    }

    /// Returns `true` for interfaces (annotation interfaces included)
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags.contains(Modifiers::INTERFACE)
    }

    /// Returns `true` for annotation interfaces
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.flags.contains(Modifiers::ANNOTATION)
    }

    /// Returns `true` for enum classes
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.flags.contains(Modifiers::ENUM)
    }

    /// Returns `true` for array classes
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.array_dimensions != 0
    }

    /// Returns `true` for the primitive singletons
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.vm_flags.contains(VmFlags::PRIMITIVE)
    }

    /// Returns `true` for the root of the class hierarchy: an ordinary class without
    /// superclass
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.super_class.is_none() && !self.is_interface() && !self.is_primitive() && !self.is_array()
    }

    /// Fixed instance size in bytes
    #[must_use]
    pub fn fixed_size(&self) -> u16 {
        self.fixed_size
    }

    /// Size of one array element in bytes (0 for non-arrays)
    #[must_use]
    pub fn array_element_size(&self) -> u8 {
        self.array_element_size
    }

    /// Number of array dimensions (0 for non-arrays)
    #[must_use]
    pub fn array_dimensions(&self) -> u8 {
        self.array_dimensions
    }

    /// Object-reference bitmap, if the loader provided one
    #[must_use]
    pub fn object_mask(&self) -> Option<&[u32]> {
        self.object_mask.as_deref()
    }

    /// Source file the class was compiled from
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// The superclass; `None` for the root class, interfaces and primitives
    #[must_use]
    pub fn superclass(&self) -> Option<ClassRc> {
        self.super_class.clone()
    }

    /// The component type of an array class, `None` for everything else.
    ///
    /// Primitive arrays are answered from a fixed table; reference arrays keep their
    /// component in the static-storage slot.
    #[must_use]
    pub fn component_type(&self) -> Option<ClassRc> {
        if !self.is_array() {
            return None;
        }

        let primitive = match self.internal_name() {
            "[Z" => Some(PrimitiveKind::Boolean),
            "[B" => Some(PrimitiveKind::Byte),
            "[S" => Some(PrimitiveKind::Short),
            "[C" => Some(PrimitiveKind::Char),
            "[I" => Some(PrimitiveKind::Int),
            "[F" => Some(PrimitiveKind::Float),
            "[J" => Some(PrimitiveKind::Long),
            "[D" => Some(PrimitiveKind::Double),
            _ => None,
        };
        if let Some(kind) = primitive {
            return Some(primitive_class(kind));
        }

        match self.static_table.get() {
            Some(StaticTable::Component(component)) => Some(component.clone()),
            _ => None,
        }
    }

    /// The loader that defined this class; `None` for primitives
    #[must_use]
    pub fn class_loader(&self) -> Option<Arc<dyn ClassLoader>> {
        self.loader.as_ref().and_then(Weak::upgrade)
    }

    /// The static-storage slot
    #[must_use]
    pub fn static_table(&self) -> Option<&StaticTable> {
        self.static_table.get()
    }

    /// Install the static storage of this class. Returns `false` if the slot is taken.
    pub fn set_static_storage(&self, storage: Arc<dyn std::any::Any + Send + Sync>) -> bool {
        if self.is_primitive() || self.is_array() {
            return false;
        }
        self.static_table.set(StaticTable::Storage(storage)).is_ok()
    }

    /// Signers of this class
    #[must_use]
    pub fn signers(&self) -> Option<&[Signer]> {
        self.signers.get().map(AsRef::as_ref)
    }

    /// Attach signers if none are recorded yet; empty lists are ignored.
    /// Returns `true` if the signers were stored.
    pub fn set_signers(&self, signers: Vec<Signer>) -> bool {
        if signers.is_empty() {
            return false;
        }
        self.signers.set(signers.into_boxed_slice()).is_ok()
    }

    /// Assertions are never enabled by this runtime
    #[must_use]
    pub fn desired_assertion_status(&self) -> bool {
        false
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ClassState {
        match self.init.state() {
            Some(state) => state,
            None if self.link.is_linked() => ClassState::Linked,
            None => ClassState::Unlinked,
        }
    }

    /// Find a resource relative to this class's package (or absolute, with a leading
    /// `/`) through the defining loader
    #[must_use]
    pub fn get_resource(&self, path: &str) -> Option<Resource> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            match names::package_directory(self.internal_name()) {
                Some(directory) => format!("{directory}/{path}"),
                None => path.to_string(),
            }
        };
        self.class_loader()?.get_resource(&path)
    }

    /// Open a resource found by [`Class::get_resource`]
    #[must_use]
    pub fn get_resource_as_stream(&self, path: &str) -> Option<Cursor<Arc<[u8]>>> {
        self.get_resource(path).map(|resource| resource.open())
    }

    /// Generic type parameters are not recorded
    ///
    /// # Errors
    /// Always returns [`Error::UnsupportedOperation`].
    pub fn type_parameters(&self) -> Result<Vec<ClassRc>> {
        Err(Error::UnsupportedOperation("type parameters"))
    }

    /// Enclosing classes are not recorded
    ///
    /// # Errors
    /// Always returns [`Error::UnsupportedOperation`].
    pub fn enclosing_class(&self) -> Result<Option<ClassRc>> {
        Err(Error::UnsupportedOperation("enclosing class"))
    }

    /// Enclosing methods are not recorded
    ///
    /// # Errors
    /// Always returns [`Error::UnsupportedOperation`].
    pub fn enclosing_method(&self) -> Result<Option<crate::metadata::members::MethodRc>> {
        Err(Error::UnsupportedOperation("enclosing method"))
    }

    /// Enclosing constructors are not recorded
    ///
    /// # Errors
    /// Always returns [`Error::UnsupportedOperation`].
    pub fn enclosing_constructor(&self) -> Result<Option<crate::metadata::members::Constructor>> {
        Err(Error::UnsupportedOperation("enclosing constructor"))
    }

    /// Member classes are not recorded
    ///
    /// # Errors
    /// Always returns [`Error::UnsupportedOperation`].
    pub fn declared_classes(&self) -> Result<Vec<ClassRc>> {
        Err(Error::UnsupportedOperation("declared classes"))
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name())
            .field("flags", &self.flags)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loader::ClassLoader, test::zoo};

    #[test]
    fn test_primitive_names() {
        let expected = [
            (PrimitiveKind::Void, "void"),
            (PrimitiveKind::Boolean, "boolean"),
            (PrimitiveKind::Byte, "byte"),
            (PrimitiveKind::Char, "char"),
            (PrimitiveKind::Short, "short"),
            (PrimitiveKind::Int, "int"),
            (PrimitiveKind::Float, "float"),
            (PrimitiveKind::Long, "long"),
            (PrimitiveKind::Double, "double"),
        ];

        for (kind, literal) in expected {
            let class = primitive_class(kind);
            assert_eq!(class.name(), literal);
            assert_eq!(class.name(), literal);
            assert_eq!(class.canonical_name(), literal);
            assert_eq!(class.simple_name(), literal);
            assert_eq!(class.package_name(), None);
            assert_eq!(class.internal_name(), literal);
            assert!(class.is_primitive());
            assert!(!class.is_array());
            assert!(class.superclass().is_none());
            assert!(class.class_loader().is_none());
        }
    }

    #[test]
    fn test_class_names() {
        let loader = zoo();
        let entry = loader.resolve("com/acme/Zoo$Keeper").unwrap();

        assert_eq!(entry.internal_name(), "com/acme/Zoo$Keeper");
        assert_eq!(entry.name(), "com.acme.Zoo$Keeper");
        assert_eq!(entry.canonical_name(), "com.acme.Zoo.Keeper");
        assert_eq!(entry.simple_name(), "Keeper");
        assert_eq!(entry.package_name().as_deref(), Some("com.acme.Zoo"));
        assert_eq!(entry.to_string(), "com.acme.Zoo$Keeper");
    }

    #[test]
    fn test_array_names() {
        let loader = zoo();
        let dogs = loader.resolve("[[Lcom/acme/Dog;").unwrap();

        assert!(dogs.is_array());
        assert_eq!(dogs.array_dimensions(), 2);
        assert_eq!(dogs.name(), "[[Lcom.acme.Dog;");
        assert_eq!(dogs.canonical_name(), "com.acme.Dog[][]");
        assert_eq!(dogs.simple_name(), "Dog[][]");
        assert_eq!(dogs.package_name(), None);

        let ints = loader.resolve("[I").unwrap();
        assert_eq!(ints.canonical_name(), "int[]");
        assert_eq!(ints.simple_name(), "int[]");
        assert_eq!(ints.array_element_size(), 4);
    }

    #[test]
    fn test_component_types() {
        let loader = zoo();

        let ints = loader.resolve("[I").unwrap();
        let component = ints.component_type().unwrap();
        assert!(Arc::ptr_eq(&component, &primitive_class(PrimitiveKind::Int)));
        assert!(ints.static_table().is_none());

        let dogs = loader.resolve("[Lcom/acme/Dog;").unwrap();
        let dog = loader.resolve("com/acme/Dog").unwrap();
        assert!(Arc::ptr_eq(&dogs.component_type().unwrap(), &dog));
        assert!(matches!(dogs.static_table(), Some(StaticTable::Component(_))));

        let nested = loader.resolve("[[I").unwrap();
        assert!(Arc::ptr_eq(&nested.component_type().unwrap(), &ints));

        assert!(dog.component_type().is_none());
    }

    #[test]
    fn test_unsupported_queries() {
        let loader = zoo();
        let dog = loader.resolve("com/acme/Dog").unwrap();
        assert!(matches!(dog.type_parameters(), Err(Error::UnsupportedOperation(_))));
        assert!(matches!(dog.enclosing_class(), Err(Error::UnsupportedOperation(_))));
        assert!(matches!(dog.enclosing_method(), Err(Error::UnsupportedOperation(_))));
        assert!(matches!(dog.enclosing_constructor(), Err(Error::UnsupportedOperation(_))));
        assert!(matches!(dog.declared_classes(), Err(Error::UnsupportedOperation(_))));
        assert!(!dog.desired_assertion_status());
    }

    #[test]
    fn test_signers_and_static_storage() {
        let loader = zoo();
        let dog = loader.resolve("com/acme/Dog").unwrap();

        assert!(dog.signers().is_none());
        assert!(!dog.set_signers(Vec::new()));
        assert!(dog.set_signers(vec![Arc::from(&b"cert"[..])]));
        assert!(!dog.set_signers(vec![Arc::from(&b"other"[..])]));
        assert_eq!(dog.signers().unwrap().len(), 1);

        assert!(dog.set_static_storage(Arc::new(42u32)));
        assert!(!dog.set_static_storage(Arc::new(43u32)));
        assert!(!primitive_class(PrimitiveKind::Int).set_static_storage(Arc::new(1u8)));
    }

    #[test]
    fn test_resources() {
        let loader = zoo();
        let dog = loader.resolve("com/acme/Dog").unwrap();

        let relative = dog.get_resource("bark.wav").unwrap();
        assert_eq!(relative.path(), "com/acme/bark.wav");

        let absolute = dog.get_resource("/readme.txt").unwrap();
        assert_eq!(absolute.bytes(), b"zoo");

        assert!(dog.get_resource("missing.txt").is_none());

        let mut text = String::new();
        std::io::Read::read_to_string(&mut dog.get_resource_as_stream("/readme.txt").unwrap(), &mut text)
            .unwrap();
        assert_eq!(text, "zoo");
    }
}
