use std::{fmt, sync::Arc};

use crate::{
    error::MemberKind,
    loader::ClassLoader,
    metadata::{
        annotations::{AnnotationValue, AnnotationValues},
        typesystem::{ClassRc, ClassRef},
    },
    Error, Result,
};

/// A materialized annotation, as returned to consumers
pub trait Annotation: Send + Sync + fmt::Debug {
    /// The annotation interface this object implements
    fn annotation_type(&self) -> Option<ClassRc>;

    /// Call the element accessor `accessor`, returning its value
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if the annotation type has no such element or
    /// the element has neither an explicit nor a default value.
    fn invoke(&self, accessor: &str) -> Result<AnnotationValue>;
}

/// Reference to a materialized annotation
pub type AnnotationRc = Arc<dyn Annotation>;

/// Answers element accessor calls for one annotation from its value list, falling back
/// to the defaults declared on the annotation interface
#[derive(Clone)]
pub struct AnnotationHandler {
    annotation_type: ClassRef,
    values: AnnotationValues,
}

impl AnnotationHandler {
    pub(crate) fn new(annotation_type: ClassRef, values: AnnotationValues) -> Self {
        AnnotationHandler {
            annotation_type,
            values,
        }
    }

    /// The annotation interface
    #[must_use]
    pub fn annotation_type(&self) -> Option<ClassRc> {
        self.annotation_type.upgrade()
    }

    /// Explicitly given values
    #[must_use]
    pub fn values(&self) -> &[(String, AnnotationValue)] {
        &self.values
    }

    /// Value of the element `accessor`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if the element has no value and no default.
    pub fn invoke(&self, accessor: &str) -> Result<AnnotationValue> {
        if let Some((_, value)) = self.values.iter().find(|(name, _)| name == accessor) {
            return Ok(value.clone());
        }

        let annotation_type = self
            .annotation_type()
            .ok_or_else(|| Error::TypeNotFound(self.annotation_type.name()))?;
        let element = annotation_type.get_declared_method(accessor, &[])?;
        element
            .annotation_default()
            .cloned()
            .ok_or_else(|| Error::member_not_found(MemberKind::Method, accessor, "()".to_string()))
    }
}

impl fmt::Debug for AnnotationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationHandler")
            .field("annotation_type", &self.annotation_type)
            .field("values", &self.values)
            .finish()
    }
}

/// Builds the proxy objects annotations are exposed as
pub trait ProxyFactory: Send + Sync {
    /// Create a proxy for one annotation.
    ///
    /// ## Arguments
    /// * 'loader' - Loader of the class carrying the annotation
    /// * 'handler' - Answers the proxy's accessor calls
    fn new_proxy(&self, loader: Option<Arc<dyn ClassLoader>>, handler: AnnotationHandler) -> AnnotationRc;
}

/// Creates [`AnnotationProxy`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProxyFactory;

impl ProxyFactory for DefaultProxyFactory {
    fn new_proxy(&self, _loader: Option<Arc<dyn ClassLoader>>, handler: AnnotationHandler) -> AnnotationRc {
        Arc::new(AnnotationProxy { handler })
    }
}

/// Annotation object forwarding every accessor call to its [`AnnotationHandler`]
#[derive(Debug)]
pub struct AnnotationProxy {
    handler: AnnotationHandler,
}

impl AnnotationProxy {
    /// The handler behind this proxy
    #[must_use]
    pub fn handler(&self) -> &AnnotationHandler {
        &self.handler
    }
}

impl Annotation for AnnotationProxy {
    fn annotation_type(&self) -> Option<ClassRc> {
        self.handler.annotation_type()
    }

    fn invoke(&self, accessor: &str) -> Result<AnnotationValue> {
        self.handler.invoke(accessor)
    }
}

impl fmt::Display for AnnotationProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}(", self.handler.annotation_type.name())?;
        for (i, (name, value)) in self.handler.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}
