//! Annotation value types, in raw (loader-provided) and linked form.
//!
//! Raw element values name their types by descriptor string; linking resolves those to
//! [`ClassRef`]s. Constants are shared by both forms.

use std::{fmt, sync::Arc};

use crate::metadata::typesystem::ClassRef;

/// A constant annotation element
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char`
    Char(char),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `java.lang.String`
    String(String),
}

impl Constant {
    /// Try to convert to a boolean value
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Constant::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Try to convert to an integer value, widening smaller integral kinds
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Constant::Byte(value) => Some(i32::from(*value)),
            Constant::Short(value) => Some(i32::from(*value)),
            Constant::Char(value) => i32::try_from(u32::from(*value)).ok(),
            Constant::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Try to convert to a long value, widening smaller integral kinds
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Constant::Long(value) => Some(*value),
            other => other.as_i32().map(i64::from),
        }
    }

    /// Try to convert to a double value
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Constant::Float(value) => Some(f64::from(*value)),
            Constant::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrow the string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Boolean(value) => write!(f, "{value}"),
            Constant::Byte(value) => write!(f, "{value}"),
            Constant::Char(value) => write!(f, "'{value}'"),
            Constant::Short(value) => write!(f, "{value}"),
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Long(value) => write!(f, "{value}L"),
            Constant::Float(value) => write!(f, "{value}f"),
            Constant::Double(value) => write!(f, "{value}"),
            Constant::String(value) => write!(f, "\"{value}\""),
        }
    }
}

/// An annotation element as stored in raw class metadata
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    /// A constant
    Const(Constant),
    /// A class literal, by field descriptor (`Ljava/lang/String;`, `I`, `[J`)
    Class(String),
    /// An enum constant, by the enum's field descriptor and the constant name
    Enum {
        /// Descriptor of the enum type
        type_descriptor: String,
        /// Name of the constant
        constant: String,
    },
    /// An array of elements
    Array(Vec<ElementValue>),
}

/// A named raw element of an annotation
pub type RawElement = (String, ElementValue);

/// An annotation element with its type references resolved
#[derive(Debug, Clone)]
pub enum AnnotationValue {
    /// A constant
    Const(Constant),
    /// A class literal
    Class(ClassRef),
    /// An enum constant
    Enum {
        /// The enum type
        enum_type: ClassRef,
        /// Name of the constant
        constant: String,
    },
    /// An array of elements
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    /// Borrow the constant, if this is one
    #[must_use]
    pub fn as_const(&self) -> Option<&Constant> {
        match self {
            AnnotationValue::Const(constant) => Some(constant),
            _ => None,
        }
    }

    /// Borrow the elements, if this is an array
    #[must_use]
    pub fn as_array(&self) -> Option<&[AnnotationValue]> {
        match self {
            AnnotationValue::Array(values) => Some(values),
            _ => None,
        }
    }
}

impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnnotationValue::Const(a), AnnotationValue::Const(b)) => a == b,
            (AnnotationValue::Class(a), AnnotationValue::Class(b)) => a.ptr_eq(b),
            (
                AnnotationValue::Enum {
                    enum_type: a_type,
                    constant: a_constant,
                },
                AnnotationValue::Enum {
                    enum_type: b_type,
                    constant: b_constant,
                },
            ) => a_type.ptr_eq(b_type) && a_constant == b_constant,
            (AnnotationValue::Array(a), AnnotationValue::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Const(constant) => write!(f, "{constant}"),
            AnnotationValue::Class(class) => write!(f, "{}.class", class.name()),
            AnnotationValue::Enum {
                enum_type,
                constant,
            } => write!(f, "{}.{}", enum_type.name(), constant),
            AnnotationValue::Array(values) => {
                f.write_str("{")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Resolved element list of one annotation, shared between its entry and its proxy
pub type AnnotationValues = Arc<[(String, AnnotationValue)]>;
