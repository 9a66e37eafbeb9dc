//! The Link Gate: lazy, one-time materialization of a class's member tables.
//!
//! A class is created holding only its raw [`ClassDefinition`]. The first structural
//! access (fields, methods, interfaces, annotations) goes through
//! [`Class::ensure_linked`], which resolves every descriptor through the loader and
//! publishes the resulting [`LinkedTables`] through a once-cell. Linking of one class is
//! serialized by a per-class mutex; readers only ever observe complete tables.
//!
//! A failed link leaves the class unlinked with its raw definition intact, so a later
//! call (for example after the missing class has been defined) may succeed.

use std::{
    cell::RefCell,
    sync::{Arc, OnceLock},
};

use parking_lot::Mutex;

use crate::{
    loader::ClassLoader,
    metadata::{
        annotations::{AnnotationEntry, AnnotationValue, ElementValue},
        members::{Field, FieldRc, Method, MethodRc},
        names::{parse_field_descriptor, parse_method_descriptor, TypeDescriptor, CONSTRUCTOR_NAME},
        typesystem::{primitive_class, Class, ClassDefinition, ClassRc, ClassRef, PrimitiveKind},
    },
    Error, Result,
};

thread_local! {
    /// Classes currently being linked on this thread, by address
    static LINKING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// One entry of the flattened interface table
pub struct InterfaceEntry {
    pub(crate) interface: ClassRef,
    pub(crate) slots: Option<Box<[Option<u16>]>>,
}

impl InterfaceEntry {
    /// The implemented interface
    #[must_use]
    pub fn interface(&self) -> Option<ClassRc> {
        self.interface.upgrade()
    }

    /// Virtual-table slot of each interface method, in the interface's declaration order.
    ///
    /// `None` for entries of an interface's own table. A slot is `None` if the class
    /// leaves the method unimplemented (abstract classes).
    #[must_use]
    pub fn slots(&self) -> Option<&[Option<u16>]> {
        self.slots.as_deref()
    }
}

/// The member tables of a linked class. Never mutated once published.
#[derive(Default)]
pub struct LinkedTables {
    pub(crate) interfaces: Vec<InterfaceEntry>,
    pub(crate) virtual_table: Vec<MethodRc>,
    pub(crate) fields: Vec<FieldRc>,
    pub(crate) methods: Vec<MethodRc>,
    pub(crate) annotations: Vec<AnnotationEntry>,
}

/// Per-class linking state: the raw definition until linked, the tables afterwards.
pub(crate) struct LinkGate {
    raw: Mutex<Option<ClassDefinition>>,
    tables: OnceLock<LinkedTables>,
}

impl LinkGate {
    /// Gate of a class that still needs linking
    pub(crate) fn new(definition: ClassDefinition) -> Self {
        LinkGate {
            raw: Mutex::new(Some(definition)),
            tables: OnceLock::new(),
        }
    }

    /// Gate of a class without declared members (primitives, arrays); linked from birth
    pub(crate) fn without_members() -> Self {
        let tables = OnceLock::new();
        tables.set(LinkedTables::default()).ok();
        LinkGate {
            raw: Mutex::new(None),
            tables,
        }
    }

    pub(crate) fn is_linked(&self) -> bool {
        self.tables.get().is_some()
    }
}

/// Returns `true` while this thread is inside a link operation
pub(crate) fn linking_in_progress() -> bool {
    LINKING.with(|stack| !stack.borrow().is_empty())
}

/// Pops the class off the thread's linking stack when linking ends
struct LinkingGuard(usize);

impl LinkingGuard {
    fn enter(class: &Class) -> Result<Self> {
        let address = class as *const Class as usize;
        LINKING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.contains(&address) {
                return Err(malformed_error!(
                    "Circular interface hierarchy involving {}",
                    class.name()
                ));
            }
            stack.push(address);
            Ok(LinkingGuard(address))
        })
    }
}

impl Drop for LinkingGuard {
    fn drop(&mut self) {
        LINKING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().rposition(|&entry| entry == self.0) {
                stack.remove(position);
            }
        });
    }
}

impl Class {
    /// Link this class through its own loader, if not done yet.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if a referenced class cannot be resolved,
    /// [`crate::Error::Malformed`] for inconsistent raw metadata and
    /// [`crate::Error::LoaderDropped`] once the defining loader is gone. The class stays
    /// unlinked.
    pub fn ensure_linked(&self) -> Result<&LinkedTables> {
        if let Some(tables) = self.link.tables.get() {
            return Ok(tables);
        }

        let loader = self
            .class_loader()
            .ok_or_else(|| Error::LoaderDropped(self.name().to_string()))?;
        self.link_with(loader.as_ref())
    }

    /// Link this class resolving cross references through `loader`, if not done yet.
    ///
    /// # Errors
    /// Same as [`Class::ensure_linked`].
    pub fn ensure_linked_with(&self, loader: &dyn ClassLoader) -> Result<&LinkedTables> {
        if let Some(tables) = self.link.tables.get() {
            return Ok(tables);
        }
        self.link_with(loader)
    }

    /// Returns `true` once the member tables are available
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.link.is_linked()
    }

    /// The virtual table: inherited slots first, overrides in place, new methods appended
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn virtual_table(&self) -> Result<&[MethodRc]> {
        Ok(&self.ensure_linked()?.virtual_table)
    }

    /// The flattened interface table
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn interface_table(&self) -> Result<&[InterfaceEntry]> {
        Ok(&self.ensure_linked()?.interfaces)
    }

    fn link_with(&self, loader: &dyn ClassLoader) -> Result<&LinkedTables> {
        let _guard = LinkingGuard::enter(self)?;
        let mut raw = self.link.raw.lock();
        if let Some(tables) = self.link.tables.get() {
            return Ok(tables);
        }

        let Some(definition) = raw.as_ref() else {
            return Err(malformed_error!("Class {} lost its raw definition", self.name()));
        };

        tracing::trace!(class = %self.name(), loader = loader.name(), "linking class");
        let tables = Linker { class: self, loader }.link(definition)?;
        tracing::debug!(
            class = %self.name(),
            fields = tables.fields.len(),
            methods = tables.methods.len(),
            interfaces = tables.interfaces.len(),
            vtable = tables.virtual_table.len(),
            "linked class"
        );

        if self.link.tables.set(tables).is_err() {
            return Err(malformed_error!("Class {} was linked twice", self.name()));
        }
        *raw = None;

        self.link
            .tables
            .get()
            .ok_or_else(|| malformed_error!("Class {} has no tables after linking", self.name()))
    }
}

/// Builds the [`LinkedTables`] of one class from its raw definition
struct Linker<'a> {
    class: &'a Class,
    loader: &'a dyn ClassLoader,
}

impl Linker<'_> {
    fn link(&self, definition: &ClassDefinition) -> Result<LinkedTables> {
        let super_class = self.class.superclass();
        let super_tables = match &super_class {
            Some(super_class) => Some(self.link_related(super_class)?),
            None => None,
        };

        let fields = definition
            .fields
            .iter()
            .map(|field| {
                let field_type = self.resolve_descriptor(&field.descriptor)?;
                Ok(Arc::new(Field::new(
                    field.name.clone(),
                    field.flags,
                    field.descriptor.clone(),
                    ClassRef::new(&field_type),
                    self.class.class_ref(),
                )))
            })
            .collect::<Result<Vec<FieldRc>>>()?;

        let mut virtual_table: Vec<MethodRc> = super_tables
            .map(|tables| tables.virtual_table.clone())
            .unwrap_or_default();
        let mut methods = Vec::with_capacity(definition.methods.len());

        for raw in &definition.methods {
            let (params, returns) = parse_method_descriptor(&raw.descriptor)?;
            if raw.name == CONSTRUCTOR_NAME && returns != TypeDescriptor::Primitive(PrimitiveKind::Void) {
                return Err(malformed_error!(
                    "Constructor of {} must return void - {}",
                    self.class.name(),
                    raw.descriptor
                ));
            }

            let parameter_types = params
                .iter()
                .map(|param| self.resolve(*param).map(|class| ClassRef::new(&class)))
                .collect::<Result<Vec<_>>>()?;
            let return_type = self.resolve(returns)?;
            let annotation_default = match &raw.annotation_default {
                Some(value) => Some(self.resolve_value(value)?),
                None => None,
            };

            let method = Method::new(
                raw.name.clone(),
                raw.flags,
                raw.descriptor.clone(),
                parameter_types,
                ClassRef::new(&return_type),
                self.class.class_ref(),
            )
            .with_annotation_default(annotation_default);

            if !method.is_virtual() {
                methods.push(Arc::new(method));
                continue;
            }

            let slot = virtual_table
                .iter()
                .position(|inherited| inherited.name == raw.name && inherited.descriptor == raw.descriptor)
                .unwrap_or(virtual_table.len());
            let index = u16::try_from(slot).map_err(|_| {
                malformed_error!("Virtual table of {} is too large", self.class.name())
            })?;

            let method = Arc::new(method.with_vtable_index(Some(index)));
            if slot < virtual_table.len() {
                virtual_table[slot] = method.clone();
            } else {
                virtual_table.push(method.clone());
            }
            methods.push(method);
        }

        let interfaces = self.flatten_interfaces(definition, super_tables, &virtual_table)?;

        let annotations = definition
            .annotations
            .iter()
            .map(|annotation| {
                let annotation_type = self.resolve_descriptor(&annotation.type_descriptor)?;
                if !annotation_type.is_annotation() {
                    return Err(malformed_error!(
                        "Annotation on {} has non-annotation type {}",
                        self.class.name(),
                        annotation_type.name()
                    ));
                }
                let values = annotation
                    .elements
                    .iter()
                    .map(|(name, value)| Ok((name.clone(), self.resolve_value(value)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(AnnotationEntry::new(ClassRef::new(&annotation_type), values.into()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LinkedTables {
            interfaces,
            virtual_table,
            fields,
            methods,
            annotations,
        })
    }

    /// Superclass entries first, then each declared interface followed by its
    /// super-interfaces; de-duplicated by identity.
    fn flatten_interfaces(
        &self,
        definition: &ClassDefinition,
        super_tables: Option<&LinkedTables>,
        virtual_table: &[MethodRc],
    ) -> Result<Vec<InterfaceEntry>> {
        let mut flattened: Vec<ClassRc> = super_tables
            .into_iter()
            .flat_map(|tables| tables.interfaces.iter())
            .filter_map(InterfaceEntry::interface)
            .collect();

        for name in &definition.interfaces {
            let interface = self.loader.resolve(name)?;
            if !interface.is_interface() {
                return Err(malformed_error!(
                    "{} implements {}, which is not an interface",
                    self.class.name(),
                    interface.name()
                ));
            }

            let inherited: Vec<ClassRc> = self
                .link_related(&interface)?
                .interfaces
                .iter()
                .filter_map(InterfaceEntry::interface)
                .collect();

            for candidate in std::iter::once(interface).chain(inherited) {
                if !flattened.iter().any(|known| Arc::ptr_eq(known, &candidate)) {
                    flattened.push(candidate);
                }
            }
        }

        flattened
            .into_iter()
            .map(|interface| {
                let slots = if self.class.is_interface() {
                    None
                } else {
                    Some(self.interface_slots(&interface, virtual_table)?)
                };
                Ok(InterfaceEntry {
                    interface: ClassRef::new(&interface),
                    slots,
                })
            })
            .collect()
    }

    fn interface_slots(&self, interface: &Class, virtual_table: &[MethodRc]) -> Result<Box<[Option<u16>]>> {
        let tables = interface.ensure_linked_with(self.loader)?;
        Ok(tables
            .methods
            .iter()
            .filter(|method| method.is_virtual())
            .map(|method| {
                virtual_table
                    .iter()
                    .position(|entry| entry.name == method.name && entry.descriptor == method.descriptor)
                    .and_then(|slot| u16::try_from(slot).ok())
            })
            .collect())
    }

    /// Link a superclass or interface, through its own loader when it has one
    fn link_related<'c>(&self, class: &'c ClassRc) -> Result<&'c LinkedTables> {
        if class.class_loader().is_some() {
            class.ensure_linked()
        } else {
            class.ensure_linked_with(self.loader)
        }
    }

    fn resolve(&self, descriptor: TypeDescriptor<'_>) -> Result<ClassRc> {
        match descriptor {
            TypeDescriptor::Primitive(kind) => Ok(primitive_class(kind)),
            TypeDescriptor::Class(name) | TypeDescriptor::Array(name) => self.loader.resolve(name),
        }
    }

    fn resolve_descriptor(&self, descriptor: &str) -> Result<ClassRc> {
        self.resolve(parse_field_descriptor(descriptor)?)
    }

    fn resolve_value(&self, value: &ElementValue) -> Result<AnnotationValue> {
        Ok(match value {
            ElementValue::Const(constant) => AnnotationValue::Const(constant.clone()),
            ElementValue::Class(descriptor) => {
                AnnotationValue::Class(ClassRef::new(&self.resolve_descriptor(descriptor)?))
            }
            ElementValue::Enum {
                type_descriptor,
                constant,
            } => AnnotationValue::Enum {
                enum_type: ClassRef::new(&self.resolve_descriptor(type_descriptor)?),
                constant: constant.clone(),
            },
            ElementValue::Array(values) => AnnotationValue::Array(
                values
                    .iter()
                    .map(|value| self.resolve_value(value))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }
}
