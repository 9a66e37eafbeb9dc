use std::{
    cell::RefCell,
    sync::{Arc, Weak},
};

use dashmap::DashMap;

use crate::{
    config::RuntimeConfig,
    loader::{ClassLoader, Resource},
    metadata::{
        link::linking_in_progress,
        names::{array_component, parse_field_descriptor, TypeDescriptor},
        typesystem::{
            primitive_class, ClassBuilder, ClassDefinition, ClassRc, ClassRegistry, LoaderRef, Modifiers,
            PrimitiveKind,
        },
    },
    Error, Result,
};

thread_local! {
    /// Names of the classes being defined on this thread, outermost first
    static DEFINING: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Tracks one class definition on the thread's definition stack
struct DefinitionGuard;

impl DefinitionGuard {
    fn enter(name: &str, max_depth: usize) -> Result<Self> {
        DEFINING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|defining| defining == name) {
                return Err(malformed_error!("Class circularity while defining {}", name));
            }
            if stack.len() >= max_depth {
                return Err(Error::RecursionLimit(max_depth));
            }
            stack.push(name.to_string());
            Ok(DefinitionGuard)
        })
    }

    fn outermost() -> bool {
        DEFINING.with(|stack| stack.borrow().is_empty())
    }
}

impl Drop for DefinitionGuard {
    fn drop(&mut self) {
        DEFINING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// A class loader serving classes and resources from memory.
///
/// Raw definitions are registered up front with [`MemoryLoader::add_definition`] and
/// turned into descriptors on first resolution. Resolution delegates to the parent loader
/// first; only names the parent does not know are defined here. Array classes are
/// defined by the loader of their component type.
///
/// The loader's registry owns its descriptors. A descriptor that outlives the loader keeps
/// its superclass chain and array component, but can no longer be linked:
/// [`Class::ensure_linked`](crate::metadata::typesystem::Class::ensure_linked) then fails
/// with [`Error::LoaderDropped`](crate::Error::LoaderDropped).
///
/// # Examples
///
/// ```rust
/// use classscope::{loader::{ClassLoader, MemoryLoader}, metadata::typesystem::ClassBuilder};
///
/// let system = MemoryLoader::system();
/// let app = MemoryLoader::new("app", Some(system.clone()));
/// app.add_definition(ClassBuilder::new("com/acme/App").extends("java/lang/Object").build());
///
/// let class = app.resolve("com/acme/App")?;
/// let object = app.resolve("java/lang/Object")?;
/// assert_eq!(class.class_loader().unwrap().name(), "app");
/// assert_eq!(object.class_loader().unwrap().name(), "system");
/// # Ok::<(), classscope::Error>(())
/// ```
pub struct MemoryLoader {
    name: String,
    parent: Option<Arc<dyn ClassLoader>>,
    config: RuntimeConfig,
    definitions: DashMap<String, ClassDefinition>,
    resources: DashMap<String, Arc<[u8]>>,
    registry: ClassRegistry,
    this: Weak<MemoryLoader>,
}

impl MemoryLoader {
    /// Create an empty loader
    ///
    /// ## Arguments
    /// * 'name' - Name of the loader, for diagnostics
    /// * 'parent' - Loader asked first for every name
    pub fn new(name: &str, parent: Option<Arc<dyn ClassLoader>>) -> Arc<Self> {
        Self::with_config(name, parent, RuntimeConfig::default())
    }

    /// Create an empty loader with a custom configuration
    pub fn with_config(name: &str, parent: Option<Arc<dyn ClassLoader>>, config: RuntimeConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| MemoryLoader {
            name: name.to_string(),
            parent,
            config,
            definitions: DashMap::new(),
            resources: DashMap::new(),
            registry: ClassRegistry::new(),
            this: this.clone(),
        })
    }

    /// Create a loader named `system` that knows the bootstrap classes: the root class,
    /// `java/lang/String` and `java/lang/Class`
    #[must_use]
    pub fn system() -> Arc<Self> {
        Self::system_with_config(RuntimeConfig::default())
    }

    /// Create a system loader with a custom configuration
    #[must_use]
    pub fn system_with_config(config: RuntimeConfig) -> Arc<Self> {
        let root = config.root_class.clone();
        let loader = Self::with_config("system", None, config);

        loader.add_definition(
            ClassBuilder::new(&root)
                .public()
                .constructor("()V", Modifiers::PUBLIC)
                .method("hashCode", "()I", Modifiers::PUBLIC | Modifiers::NATIVE)
                .method(
                    "equals",
                    &format!("(L{root};)Z"),
                    Modifiers::PUBLIC,
                )
                .method("toString", "()Ljava/lang/String;", Modifiers::PUBLIC)
                .build(),
        );
        loader.add_definition(
            ClassBuilder::new("java/lang/String")
                .extends(&root)
                .flags(Modifiers::PUBLIC | Modifiers::FINAL)
                .constructor("()V", Modifiers::PUBLIC)
                .method("length", "()I", Modifiers::PUBLIC)
                .build(),
        );
        loader.add_definition(
            ClassBuilder::new("java/lang/Class")
                .extends(&root)
                .flags(Modifiers::PUBLIC | Modifiers::FINAL)
                .method("getName", "()Ljava/lang/String;", Modifiers::PUBLIC)
                .build(),
        );

        loader
    }

    /// Register a raw definition, defined on first resolution of its name
    pub fn add_definition(&self, definition: ClassDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    /// Register resource bytes under a path (a leading `/` is ignored)
    pub fn add_resource(&self, path: &str, data: impl Into<Arc<[u8]>>) {
        self.resources
            .insert(path.trim_start_matches('/').to_string(), data.into());
    }

    /// Define a class right away. If the name is already defined by this loader, the
    /// existing descriptor is returned.
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if the superclass cannot be resolved,
    /// [`Error::Malformed`] for an invalid hierarchy and [`Error::RecursionLimit`] for
    /// superclass chains deeper than the configured limit.
    pub fn define_class(&self, definition: ClassDefinition) -> Result<ClassRc> {
        let class = self.define_unlinked(definition)?;

        if self.config.link_on_define && DefinitionGuard::outermost() && !linking_in_progress() {
            class.ensure_linked()?;
        }
        Ok(class)
    }

    /// The registry owning this loader's classes
    #[must_use]
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// The configuration of this loader
    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The parent loader
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<dyn ClassLoader>> {
        self.parent.as_ref()
    }

    fn loader_ref(&self) -> LoaderRef {
        self.this.clone()
    }

    fn is_self(&self, loader: &Arc<dyn ClassLoader>) -> bool {
        std::ptr::eq(Arc::as_ptr(loader).cast::<()>(), (self as *const Self).cast::<()>())
    }

    fn define_unlinked(&self, definition: ClassDefinition) -> Result<ClassRc> {
        if let Some(existing) = self.registry.get(&definition.name) {
            return Ok(existing);
        }

        let _guard = DefinitionGuard::enter(&definition.name, self.config.max_definition_depth)?;

        let super_class = match &definition.super_class {
            Some(name) => Some(self.resolve(name)?),
            None => None,
        };

        match &super_class {
            Some(super_class) => {
                if super_class.is_interface() || super_class.is_array() || super_class.is_primitive() {
                    return Err(malformed_error!(
                        "{} cannot extend {}",
                        definition.name,
                        super_class.name()
                    ));
                }
                if super_class.modifiers().contains(Modifiers::FINAL) {
                    return Err(malformed_error!(
                        "{} cannot extend final class {}",
                        definition.name,
                        super_class.name()
                    ));
                }
            }
            None => {
                let is_interface = definition.flags.contains(Modifiers::INTERFACE);
                if !is_interface && definition.name != self.config.root_class {
                    return Err(malformed_error!(
                        "{} has no superclass but is not the root class {}",
                        definition.name,
                        self.config.root_class
                    ));
                }
            }
        }

        Ok(self
            .registry
            .define(definition, super_class.as_ref(), self.loader_ref()))
    }

    fn define_array(&self, name: &str) -> Result<ClassRc> {
        let descriptor = array_component(name).ok_or_else(|| Error::TypeNotFound(name.to_string()))?;
        let component = match parse_field_descriptor(descriptor)? {
            TypeDescriptor::Primitive(PrimitiveKind::Void) => {
                return Err(malformed_error!("Array of void - {}", name));
            }
            TypeDescriptor::Primitive(kind) => primitive_class(kind),
            TypeDescriptor::Class(component) | TypeDescriptor::Array(component) => self.resolve(component)?,
        };

        // arrays belong to the loader of their component
        match component.class_loader() {
            Some(owner) if !self.is_self(&owner) => return owner.resolve(name),
            None => {
                if let Some(parent) = &self.parent {
                    return parent.resolve(name);
                }
            }
            _ => {}
        }

        if component.array_dimensions() >= self.config.max_array_dimensions {
            return Err(malformed_error!(
                "{} exceeds the limit of {} array dimensions",
                name,
                self.config.max_array_dimensions
            ));
        }

        let root = self.resolve(&self.config.root_class)?;
        Ok(self
            .registry
            .define_array(name, &component, Some(&root), Some(self.loader_ref())))
    }
}

impl ClassLoader for MemoryLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn resolve(&self, internal_name: &str) -> Result<ClassRc> {
        if let Some(class) = self.registry.get(internal_name) {
            return Ok(class);
        }

        if internal_name.starts_with('[') {
            return self.define_array(internal_name);
        }

        if let Some(parent) = &self.parent {
            match parent.resolve(internal_name) {
                Ok(class) => return Ok(class),
                Err(Error::TypeNotFound(missing)) if missing == internal_name => {}
                Err(error) => return Err(error),
            }
        }

        let definition = self
            .definitions
            .get(internal_name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::TypeNotFound(internal_name.to_string()))?;

        self.define_class(definition)
    }

    fn get_resource(&self, path: &str) -> Option<Resource> {
        let path = path.trim_start_matches('/');
        if let Some(resource) = self.parent.as_ref().and_then(|parent| parent.get_resource(path)) {
            return Some(resource);
        }
        self.resources
            .get(path)
            .map(|entry| Resource::new(path, entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        metadata::typesystem::{ClassState, StaticTable},
        test::zoo,
    };

    #[test]
    fn test_resolution_is_cached() {
        let loader = zoo();
        let first = loader.resolve("com/acme/Dog").unwrap();
        let second = loader.load_class("com.acme.Dog").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_class() {
        let loader = MemoryLoader::system();
        let err = loader.load_class("com.example.Missing").unwrap_err();
        assert!(matches!(err, Error::TypeNotFound(name) if name == "com/example/Missing"));
    }

    #[test]
    fn test_parent_first_delegation() {
        let system = MemoryLoader::system();
        let child = MemoryLoader::new("child", Some(system.clone()));
        child.add_definition(ClassBuilder::new("java/lang/String").extends("java/lang/Object").build());
        child.add_definition(ClassBuilder::new("app/Main").extends("java/lang/Object").build());

        let string = child.resolve("java/lang/String").unwrap();
        assert_eq!(string.class_loader().unwrap().name(), "system");

        let main = child.resolve("app/Main").unwrap();
        assert_eq!(main.class_loader().unwrap().name(), "child");
        assert!(system.resolve("app/Main").is_err());
    }

    #[test]
    fn test_arrays_belong_to_their_component_loader() {
        let system = MemoryLoader::system();
        let child = MemoryLoader::new("child", Some(system.clone()));
        child.add_definition(ClassBuilder::new("app/Main").extends("java/lang/Object").build());

        let objects = child.resolve("[Ljava/lang/Object;").unwrap();
        assert!(Arc::ptr_eq(&objects, &system.resolve("[Ljava/lang/Object;").unwrap()));

        let mains = child.resolve("[Lapp/Main;").unwrap();
        assert_eq!(mains.class_loader().unwrap().name(), "child");
        assert!(child.registry().contains("[Lapp/Main;"));

        let ints = child.resolve("[I").unwrap();
        assert!(Arc::ptr_eq(&ints, &system.resolve("[I").unwrap()));
    }

    #[test]
    fn test_array_shape() {
        let loader = zoo();
        let dogs = loader.resolve("[Lcom/acme/Dog;").unwrap();
        let dog = loader.resolve("com/acme/Dog").unwrap();

        assert!(dogs.modifiers().contains(Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ABSTRACT));
        assert_eq!(dogs.superclass().unwrap().name(), "java.lang.Object");
        match dogs.static_table() {
            Some(StaticTable::Component(component)) => assert!(Arc::ptr_eq(component, &dog)),
            other => panic!("unexpected static table {other:?}"),
        }
        assert_eq!(dogs.state(), ClassState::Linked);
    }

    #[test]
    fn test_invalid_arrays() {
        let loader = MemoryLoader::system_with_config(RuntimeConfig::default().with_max_array_dimensions(2));
        assert!(loader.resolve("[[I").is_ok());
        assert!(matches!(loader.resolve("[[[I"), Err(Error::Malformed { .. })));
        assert!(matches!(loader.resolve("[V"), Err(Error::Malformed { .. })));
        assert!(matches!(loader.resolve("[Lmissing/Thing;"), Err(Error::TypeNotFound(_))));
    }

    #[test]
    fn test_invalid_hierarchies() {
        let loader = zoo();
        loader.add_definition(ClassBuilder::new("bad/Orphan").build());
        loader.add_definition(ClassBuilder::new("bad/Impostor").extends("com/acme/Pet").build());
        loader.add_definition(ClassBuilder::new("bad/Heir").extends("java/lang/String").build());
        loader.add_definition(ClassBuilder::new("bad/Ouroboros").extends("bad/Ouroboros").build());

        for name in ["bad/Orphan", "bad/Impostor", "bad/Heir", "bad/Ouroboros"] {
            assert!(matches!(loader.resolve(name), Err(Error::Malformed { .. })), "{name}");
        }
        assert!(!loader.registry().contains("bad/Ouroboros"));
    }

    #[test]
    fn test_definition_depth_limit() {
        let loader = MemoryLoader::system_with_config(RuntimeConfig::default().with_max_definition_depth(4));
        loader.add_definition(ClassBuilder::new("deep/C0").extends("java/lang/Object").build());
        for i in 1..8 {
            loader.add_definition(
                ClassBuilder::new(&format!("deep/C{i}"))
                    .extends(&format!("deep/C{}", i - 1))
                    .build(),
            );
        }

        assert!(matches!(loader.resolve("deep/C7"), Err(Error::RecursionLimit(4))));
        // defining bottom-up keeps every single resolution shallow
        for i in 0..8 {
            loader.resolve(&format!("deep/C{i}")).unwrap();
        }
    }

    #[test]
    fn test_link_on_define() {
        let loader = MemoryLoader::system_with_config(RuntimeConfig::eager());
        loader.add_definition(
            ClassBuilder::new("eager/Parent")
                .extends("java/lang/Object")
                .method("child", "()Leager/Child;", Modifiers::PUBLIC)
                .build(),
        );
        loader.add_definition(ClassBuilder::new("eager/Child").extends("eager/Parent").build());

        let child = loader.resolve("eager/Child").unwrap();
        assert!(child.is_linked());
        assert!(loader.resolve("eager/Parent").unwrap().is_linked());
    }

    #[test]
    fn test_resources() {
        let system = MemoryLoader::system();
        system.add_resource("/shared.txt", &b"system"[..]);
        let child = MemoryLoader::new("child", Some(system.clone()));
        child.add_resource("shared.txt", &b"child"[..]);
        child.add_resource("only/child.txt", &b"mine"[..]);

        assert_eq!(child.get_resource("shared.txt").unwrap().bytes(), b"system");
        assert_eq!(child.get_resource("/only/child.txt").unwrap().bytes(), b"mine");
        assert!(system.get_resource("only/child.txt").is_none());
    }

    #[test]
    fn test_descriptors_outlive_their_loader() {
        let loader = zoo();
        let string = loader.resolve("java/lang/String").unwrap();
        let dogs = loader.resolve("[Lcom/acme/Dog;").unwrap();
        let weak = Arc::downgrade(&loader);
        drop(loader);
        assert!(weak.upgrade().is_none());

        assert_eq!(string.superclass().unwrap().name(), "java.lang.Object");
        let dog = dogs.component_type().unwrap();
        assert_eq!(dog.name(), "com.acme.Dog");
        assert_eq!(dog.superclass().unwrap().name(), "com.acme.Animal");
        assert!(string.class_loader().is_none());

        assert!(matches!(
            string.ensure_linked(),
            Err(Error::LoaderDropped(name)) if name == "java.lang.String"
        ));
        assert!(matches!(string.get_method("length", &[]), Err(Error::LoaderDropped(_))));
    }
}
