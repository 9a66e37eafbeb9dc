//! Raw class definitions and a fluent builder for them.
//!
//! A [`ClassDefinition`] is the unlinked form of a class as a loader hands it to the
//! registry: names and descriptors only, no resolved references. The Link Gate turns it
//! into member tables on first structural access.
//!
//! # Example
//!
//! ```rust
//! use classscope::metadata::typesystem::{ClassBuilder, Modifiers};
//!
//! let dog = ClassBuilder::new("com/acme/Dog")
//!     .extends("com/acme/Animal")
//!     .public()
//!     .field("age", "I", Modifiers::PUBLIC)
//!     .constructor("()V", Modifiers::PUBLIC)
//!     .method("bark", "(Ljava/lang/String;)V", Modifiers::PUBLIC)
//!     .build();
//!
//! assert_eq!(dog.name, "com/acme/Dog");
//! assert_eq!(dog.methods.len(), 2);
//! ```

use crate::metadata::{
    annotations::{ElementValue, RawElement},
    names::{CONSTRUCTOR_NAME, STATIC_INITIALIZER_NAME},
    typesystem::{Modifiers, Signer},
};

/// Raw field metadata
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Field descriptor (`I`, `Ljava/lang/String;`)
    pub descriptor: String,
    /// Modifiers
    pub flags: Modifiers,
}

/// Raw method metadata, constructors and static initializers included
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    /// Method name; `<init>` and `<clinit>` are reserved
    pub name: String,
    /// Method descriptor (`(ILjava/lang/String;)V`)
    pub descriptor: String,
    /// Modifiers
    pub flags: Modifiers,
    /// Default value, for elements of annotation interfaces
    pub annotation_default: Option<ElementValue>,
}

/// Raw annotation applied to a class
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationDefinition {
    /// Field descriptor of the annotation interface (`Lcom/acme/Marker;`)
    pub type_descriptor: String,
    /// Explicitly given elements, in declaration order
    pub elements: Vec<RawElement>,
}

impl AnnotationDefinition {
    /// An annotation of the class with internal name `annotation_type`, without elements
    pub fn new(annotation_type: &str) -> Self {
        AnnotationDefinition {
            type_descriptor: format!("L{annotation_type};"),
            elements: Vec::new(),
        }
    }

    /// Add an element
    #[must_use]
    pub fn element(mut self, name: &str, value: ElementValue) -> Self {
        self.elements.push((name.to_string(), value));
        self
    }
}

/// The unlinked metadata of one class, as provided by a loader
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDefinition {
    /// Internal binary name (`com/acme/Dog`)
    pub name: String,
    /// Internal name of the superclass; `None` for the root class and interfaces
    pub super_class: Option<String>,
    /// Internal names of the directly implemented (or extended) interfaces
    pub interfaces: Vec<String>,
    /// Class modifiers
    pub flags: Modifiers,
    /// Fixed instance size in bytes
    pub fixed_size: u16,
    /// Object-reference bitmap for the collector (opaque to this crate)
    pub object_mask: Option<Vec<u32>>,
    /// Source file the class was compiled from
    pub source_file: Option<String>,
    /// Declared fields, in declaration order
    pub fields: Vec<FieldDefinition>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodDefinition>,
    /// Annotations applied to the class
    pub annotations: Vec<AnnotationDefinition>,
    /// Signers of the class
    pub signers: Vec<Signer>,
}

/// Provides a fluent API for building [`ClassDefinition`]s
pub struct ClassBuilder {
    definition: ClassDefinition,
}

impl ClassBuilder {
    /// Start building a class with the given internal name
    ///
    /// ## Arguments
    /// * 'name' - Internal binary name, `/` separated
    pub fn new(name: &str) -> Self {
        ClassBuilder {
            definition: ClassDefinition {
                name: name.to_string(),
                ..ClassDefinition::default()
            },
        }
    }

    /// Start building an interface with the given internal name
    pub fn interface(name: &str) -> Self {
        Self::new(name).flags(Modifiers::INTERFACE | Modifiers::ABSTRACT)
    }

    /// Start building an annotation interface with the given internal name
    pub fn annotation_type(name: &str) -> Self {
        Self::interface(name).flags(Modifiers::ANNOTATION)
    }

    /// Set the superclass
    #[must_use]
    pub fn extends(mut self, super_class: &str) -> Self {
        self.definition.super_class = Some(super_class.to_string());
        self
    }

    /// Add a directly implemented interface
    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.definition.interfaces.push(interface.to_string());
        self
    }

    /// Add modifiers to the class
    #[must_use]
    pub fn flags(mut self, flags: Modifiers) -> Self {
        self.definition.flags |= flags;
        self
    }

    /// Mark the class public
    #[must_use]
    pub fn public(self) -> Self {
        self.flags(Modifiers::PUBLIC)
    }

    /// Set the fixed instance size
    #[must_use]
    pub fn fixed_size(mut self, size: u16) -> Self {
        self.definition.fixed_size = size;
        self
    }

    /// Set the object-reference bitmap
    #[must_use]
    pub fn object_mask(mut self, mask: Vec<u32>) -> Self {
        self.definition.object_mask = Some(mask);
        self
    }

    /// Set the source file name
    #[must_use]
    pub fn source_file(mut self, file: &str) -> Self {
        self.definition.source_file = Some(file.to_string());
        self
    }

    /// Add a field
    #[must_use]
    pub fn field(mut self, name: &str, descriptor: &str, flags: Modifiers) -> Self {
        self.definition.fields.push(FieldDefinition {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            flags,
        });
        self
    }

    /// Add a method
    #[must_use]
    pub fn method(mut self, name: &str, descriptor: &str, flags: Modifiers) -> Self {
        self.definition.methods.push(MethodDefinition {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            flags,
            annotation_default: None,
        });
        self
    }

    /// Add an element of an annotation interface with a default value
    ///
    /// `descriptor` is the accessor's method descriptor, e.g. `()I` for an `int` element.
    #[must_use]
    pub fn element_with_default(mut self, name: &str, descriptor: &str, default: ElementValue) -> Self {
        self.definition.methods.push(MethodDefinition {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            flags: Modifiers::PUBLIC | Modifiers::ABSTRACT,
            annotation_default: Some(default),
        });
        self
    }

    /// Add a constructor with the given descriptor (return type must be `V`)
    #[must_use]
    pub fn constructor(self, descriptor: &str, flags: Modifiers) -> Self {
        self.method(CONSTRUCTOR_NAME, descriptor, flags)
    }

    /// Add a static initializer
    #[must_use]
    pub fn static_initializer(self) -> Self {
        self.method(STATIC_INITIALIZER_NAME, "()V", Modifiers::STATIC)
    }

    /// Apply an annotation to the class
    #[must_use]
    pub fn annotation(mut self, annotation: AnnotationDefinition) -> Self {
        self.definition.annotations.push(annotation);
        self
    }

    /// Add a signer
    #[must_use]
    pub fn signer(mut self, signer: Signer) -> Self {
        self.definition.signers.push(signer);
        self
    }

    /// Finish the definition
    #[must_use]
    pub fn build(self) -> ClassDefinition {
        self.definition
    }
}
