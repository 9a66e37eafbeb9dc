//! The reflection entry point and the hooks the embedding runtime provides.
//!
//! [`Runtime`] bundles what the reflection operations need from their surroundings: the
//! system loader that resolves names when no loader is given, the [`Natives`] hook that
//! runs static initializers and constructors, and the [`ProxyFactory`] that wraps
//! annotations.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use classscope::prelude::*;
//!
//! fn no_setup(_: &Class) -> classscope::Result<()> {
//!     Ok(())
//! }
//!
//! let system = MemoryLoader::system();
//! system.add_definition(ClassBuilder::new("com/acme/App").extends("java/lang/Object").build());
//!
//! let runtime = Runtime::new(system, Arc::new(no_setup));
//! let app = runtime.for_name("com.acme.App", true, None)?;
//! assert_eq!(app.state(), ClassState::Initialized);
//!
//! let ints = runtime.for_canonical_name(None, "[I")?;
//! assert_eq!(ints.canonical_name(), "int[]");
//! # Ok::<(), classscope::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    config::RuntimeConfig,
    loader::{ClassLoader, MemoryLoader},
    metadata::{
        annotations::{AnnotationRc, DefaultProxyFactory, ProxyFactory},
        members::Constructor,
        names::to_internal_name,
        typesystem::{primitive_class, Class, ClassRc, Modifiers, PrimitiveKind},
    },
    Error, Result,
};

/// An object of the managed heap, as far as reflection is concerned
pub trait Object: Send + Sync {
    /// The runtime class of this object
    fn class(&self) -> ClassRc;
}

/// Reference to a managed object
pub type ObjectRc = Arc<dyn Object>;

/// Hooks into the execution engine
pub trait Natives: Send + Sync {
    /// Run the static initializer of `class`. Called at most once per class.
    ///
    /// # Errors
    /// Any error makes the class permanently erroneous.
    fn run_initializer(&self, class: &Class) -> Result<()>;

    /// Allocate an instance and run `constructor` on it.
    ///
    /// # Errors
    /// The default implementation always returns [`Error::UnsupportedOperation`].
    fn construct(&self, constructor: &Constructor) -> Result<ObjectRc> {
        let _ = constructor;
        Err(Error::UnsupportedOperation("object construction"))
    }
}

impl<F> Natives for F
where
    F: Fn(&Class) -> Result<()> + Send + Sync,
{
    fn run_initializer(&self, class: &Class) -> Result<()> {
        self(class)
    }
}

/// Reflection entry point bound to a system loader and the runtime's hooks
pub struct Runtime {
    system: Arc<dyn ClassLoader>,
    natives: Arc<dyn Natives>,
    proxies: Arc<dyn ProxyFactory>,
}

impl Runtime {
    /// Create a runtime using the [`DefaultProxyFactory`]
    pub fn new(system: Arc<dyn ClassLoader>, natives: Arc<dyn Natives>) -> Self {
        Runtime {
            system,
            natives,
            proxies: Arc::new(DefaultProxyFactory),
        }
    }

    /// Create a runtime over a fresh system [`MemoryLoader`] built from `config`
    pub fn with_config(config: RuntimeConfig, natives: Arc<dyn Natives>) -> Self {
        Self::new(MemoryLoader::system_with_config(config), natives)
    }

    /// Replace the annotation proxy factory
    #[must_use]
    pub fn with_proxy_factory(mut self, proxies: Arc<dyn ProxyFactory>) -> Self {
        self.proxies = proxies;
        self
    }

    /// The loader used when no loader is given
    #[must_use]
    pub fn system_loader(&self) -> &Arc<dyn ClassLoader> {
        &self.system
    }

    /// The native hooks
    #[must_use]
    pub fn natives(&self) -> &Arc<dyn Natives> {
        &self.natives
    }

    /// Resolve a class by display name (`com.acme.Dog`, `[Lcom.acme.Dog;`) and link it.
    ///
    /// ## Arguments
    /// * 'name' - Display name of the class
    /// * 'initialize' - Also run its static setup
    /// * 'loader' - Loader to resolve through; the system loader if `None`
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for unknown names, linking errors unchanged and
    /// [`Error::Initialization`] if the requested setup fails.
    pub fn for_name(&self, name: &str, initialize: bool, loader: Option<&Arc<dyn ClassLoader>>) -> Result<ClassRc> {
        let loader = loader.unwrap_or(&self.system);
        let class = loader.resolve(&to_internal_name(name))?;
        class.ensure_linked_with(loader.as_ref())?;

        if initialize {
            class.initialize(self.natives.as_ref())?;
        }
        Ok(class)
    }

    /// Resolve a class by the name form used in descriptors: `[...` arrays,
    /// `Lname;` classes or a single primitive descriptor character. Classes found this
    /// way are initialized.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] for names of none of these forms.
    pub fn for_canonical_name(&self, loader: Option<&Arc<dyn ClassLoader>>, name: &str) -> Result<ClassRc> {
        if name.starts_with('[') {
            return self.for_name(name, true, loader);
        }
        if let Some(class) = name.strip_prefix('L').and_then(|rest| rest.strip_suffix(';')) {
            return self.for_name(class, true, loader);
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(descriptor), None) => PrimitiveKind::from_descriptor(descriptor)
                .map(primitive_class)
                .ok_or_else(|| Error::TypeNotFound(name.to_string())),
            _ => Err(Error::TypeNotFound(name.to_string())),
        }
    }

    /// Run the static setup of `class`
    ///
    /// # Errors
    /// See [`Class::initialize`].
    pub fn initialize(&self, class: &Class) -> Result<()> {
        class.initialize(self.natives.as_ref())
    }

    /// Find an annotation on `class` or its superclasses
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_annotation(&self, class: &Class, annotation_type: &Class) -> Result<Option<AnnotationRc>> {
        class.get_annotation(annotation_type, self.proxies.as_ref())
    }

    /// Every annotation of `class` and its superclasses
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_annotations(&self, class: &Class) -> Result<Vec<AnnotationRc>> {
        class.get_annotations(self.proxies.as_ref())
    }

    /// Every annotation applied directly to `class`
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_declared_annotations(&self, class: &Class) -> Result<Vec<AnnotationRc>> {
        class.get_declared_annotations(self.proxies.as_ref())
    }

    /// Create an instance of `class` through its no-argument constructor
    ///
    /// # Errors
    /// Returns [`Error::Instantiation`] for interfaces, abstract classes, arrays and
    /// primitives, [`Error::MemberNotFound`] without a no-argument constructor, and
    /// whatever initialization or the native constructor reports.
    pub fn new_instance(&self, class: &Class) -> Result<ObjectRc> {
        if class.is_primitive()
            || class.is_array()
            || class.is_interface()
            || class.modifiers().contains(Modifiers::ABSTRACT)
        {
            return Err(Error::Instantiation(class.name().to_string()));
        }

        class.initialize(self.natives.as_ref())?;
        let constructor = class.get_constructor(&[])?;
        self.natives.construct(&constructor)
    }
}
