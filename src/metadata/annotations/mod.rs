//! Annotation materialization.
//!
//! Annotations applied to a class are linked into [`AnnotationEntry`]s: the resolved
//! annotation type, the explicitly given element values and a once-cell caching the
//! proxy object handed to consumers. The proxy is built through a [`ProxyFactory`] the
//! first time the entry is requested and the very same instance is returned from then
//! on, to every thread.
//!
//! # Lookup
//!
//! [`Class::get_annotation`] walks the superclass chain, scanning each class's own
//! annotation table for an entry whose type is identical to the requested one. Requests
//! for a type that is not an annotation interface yield `None`.
//!
//! # Example
//!
//! ```rust
//! use classscope::{
//!     loader::{ClassLoader, MemoryLoader},
//!     metadata::{
//!         annotations::{Constant, DefaultProxyFactory, ElementValue},
//!         typesystem::{AnnotationDefinition, ClassBuilder},
//!     },
//! };
//!
//! let loader = MemoryLoader::system();
//! loader.add_definition(
//!     ClassBuilder::annotation_type("com/acme/Marker")
//!         .element_with_default("value", "()I", ElementValue::Const(Constant::Int(1)))
//!         .build(),
//! );
//! loader.add_definition(
//!     ClassBuilder::new("com/acme/Dog")
//!         .extends("java/lang/Object")
//!         .annotation(AnnotationDefinition::new("com/acme/Marker"))
//!         .build(),
//! );
//!
//! let dog = loader.resolve("com/acme/Dog")?;
//! let marker = loader.resolve("com/acme/Marker")?;
//! let annotation = dog.get_annotation(&marker, &DefaultProxyFactory)?.unwrap();
//! assert_eq!(annotation.invoke("value")?.as_const(), Some(&Constant::Int(1)));
//! # Ok::<(), classscope::Error>(())
//! ```

mod proxy;
mod types;

use std::{fmt, sync::OnceLock};

pub use proxy::{Annotation, AnnotationHandler, AnnotationProxy, AnnotationRc, DefaultProxyFactory, ProxyFactory};
pub use types::{AnnotationValue, AnnotationValues, Constant, ElementValue, RawElement};

use crate::{
    metadata::typesystem::{Class, ClassRc, ClassRef},
    Result,
};

/// One annotation applied to a class: type, values and the cached proxy
pub struct AnnotationEntry {
    proxy: OnceLock<AnnotationRc>,
    annotation_type: ClassRef,
    values: AnnotationValues,
}

impl AnnotationEntry {
    pub(crate) fn new(annotation_type: ClassRef, values: AnnotationValues) -> Self {
        AnnotationEntry {
            proxy: OnceLock::new(),
            annotation_type,
            values,
        }
    }

    /// The annotation interface
    #[must_use]
    pub fn annotation_type(&self) -> Option<ClassRc> {
        self.annotation_type.upgrade()
    }

    /// Explicitly given element values, in declaration order
    #[must_use]
    pub fn values(&self) -> &[(String, AnnotationValue)] {
        &self.values
    }

    /// Returns `true` once the proxy has been built
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.proxy.get().is_some()
    }

    /// The proxy of this entry, built on first request
    pub fn materialize(&self, declaring: &Class, factory: &dyn ProxyFactory) -> AnnotationRc {
        self.proxy
            .get_or_init(|| {
                tracing::trace!(
                    class = %declaring.name(),
                    annotation = %self.annotation_type.name(),
                    "materializing annotation"
                );
                let handler = AnnotationHandler::new(self.annotation_type.clone(), self.values.clone());
                factory.new_proxy(declaring.class_loader(), handler)
            })
            .clone()
    }
}

impl fmt::Debug for AnnotationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationEntry")
            .field("annotation_type", &self.annotation_type)
            .field("values", &self.values.len())
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

impl Class {
    /// Find the annotation of type `annotation_type` on this class or the nearest
    /// superclass carrying it.
    ///
    /// Returns `Ok(None)` if no class in the chain carries it, and for every type that
    /// is not an annotation interface.
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_annotation(
        &self,
        annotation_type: &Class,
        factory: &dyn ProxyFactory,
    ) -> Result<Option<AnnotationRc>> {
        if !annotation_type.is_annotation() {
            return Ok(None);
        }

        let mut current = self.to_rc().ok();
        while let Some(class) = current {
            let entry = class
                .ensure_linked()?
                .annotations
                .iter()
                .find(|entry| entry.annotation_type.is(annotation_type));
            if let Some(entry) = entry {
                return Ok(Some(entry.materialize(&class, factory)));
            }
            current = class.superclass();
        }
        Ok(None)
    }

    /// Returns `true` if this class or a superclass carries an annotation of this type
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn is_annotation_present(&self, annotation_type: &Class, factory: &dyn ProxyFactory) -> Result<bool> {
        Ok(self.get_annotation(annotation_type, factory)?.is_some())
    }

    /// Every annotation applied directly to this class
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_declared_annotations(&self, factory: &dyn ProxyFactory) -> Result<Vec<AnnotationRc>> {
        Ok(self
            .ensure_linked()?
            .annotations
            .iter()
            .map(|entry| entry.materialize(self, factory))
            .collect())
    }

    /// Every annotation of this class and its superclasses, nearest class first
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_annotations(&self, factory: &dyn ProxyFactory) -> Result<Vec<AnnotationRc>> {
        let mut annotations = self.get_declared_annotations(factory)?;
        let mut current = self.superclass();
        while let Some(class) = current {
            annotations.extend(class.get_declared_annotations(factory)?);
            current = class.superclass();
        }
        Ok(annotations)
    }
}
