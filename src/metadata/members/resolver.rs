use std::iter::successors;

use crate::{
    error::MemberKind,
    metadata::{
        members::{Constructor, FieldRc, MethodRc},
        names::{is_reserved, CONSTRUCTOR_NAME},
        typesystem::{Class, ClassRc},
    },
    Error, Result,
};

/// Renders a requested parameter list as `(a, b)` for error reporting
fn render_signature(parameter_types: &[ClassRc]) -> String {
    let names: Vec<&str> = parameter_types.iter().map(|class| class.name()).collect();
    format!("({})", names.join(", "))
}

/// Returns `true` if `method` accepts arguments of the requested types: same arity and
/// every declared parameter type assignable from the requested one
fn accepts(method: &MethodRc, parameter_types: &[ClassRc]) -> bool {
    let declared = method.parameter_refs();
    declared.len() == parameter_types.len()
        && declared.iter().zip(parameter_types).all(|(declared, requested)| {
            declared
                .upgrade()
                .is_some_and(|declared| declared.is_assignable_from(requested))
        })
}

impl Class {
    /// This class followed by its superclass chain
    fn with_superclasses(&self) -> impl Iterator<Item = ClassRc> {
        successors(self.to_rc().ok(), |class| class.superclass())
    }

    fn find_declared_field(&self, name: &str) -> Result<Option<FieldRc>> {
        Ok(self
            .ensure_linked()?
            .fields
            .iter()
            .find(|field| field.name == name)
            .cloned())
    }

    fn find_declared_method(&self, name: &str, parameter_types: &[ClassRc]) -> Result<Option<MethodRc>> {
        Ok(self
            .ensure_linked()?
            .methods
            .iter()
            .find(|method| method.name == name && accepts(method, parameter_types))
            .cloned())
    }

    /// Find a field declared directly on this class.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if no field of that name is declared here.
    pub fn get_declared_field(&self, name: &str) -> Result<FieldRc> {
        self.find_declared_field(name)?
            .ok_or_else(|| Error::member_not_found(MemberKind::Field, name, String::new()))
    }

    /// Find a field on this class or the nearest superclass declaring it.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if no class in the chain declares the field.
    pub fn get_field(&self, name: &str) -> Result<FieldRc> {
        for class in self.with_superclasses() {
            if let Some(field) = class.find_declared_field(name)? {
                return Ok(field);
            }
        }
        Err(Error::member_not_found(MemberKind::Field, name, String::new()))
    }

    /// Find a method declared directly on this class, first match in declaration order.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if nothing matches, and for every reserved name.
    pub fn get_declared_method(&self, name: &str, parameter_types: &[ClassRc]) -> Result<MethodRc> {
        if !is_reserved(name) {
            if let Some(method) = self.find_declared_method(name, parameter_types)? {
                return Ok(method);
            }
        }
        Err(Error::member_not_found(
            MemberKind::Method,
            name,
            render_signature(parameter_types),
        ))
    }

    /// Find a method on this class or the nearest superclass declaring a match.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if nothing matches, and for every reserved name.
    pub fn get_method(&self, name: &str, parameter_types: &[ClassRc]) -> Result<MethodRc> {
        if !is_reserved(name) {
            for class in self.with_superclasses() {
                if let Some(method) = class.find_declared_method(name, parameter_types)? {
                    return Ok(method);
                }
            }
        }
        Err(Error::member_not_found(
            MemberKind::Method,
            name,
            render_signature(parameter_types),
        ))
    }

    /// Find a constructor of this class, first match in declaration order.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if no constructor accepts the parameter types.
    pub fn get_constructor(&self, parameter_types: &[ClassRc]) -> Result<Constructor> {
        self.find_declared_method(CONSTRUCTOR_NAME, parameter_types)?
            .map(Constructor::new)
            .ok_or_else(|| {
                Error::member_not_found(
                    MemberKind::Constructor,
                    CONSTRUCTOR_NAME,
                    render_signature(parameter_types),
                )
            })
    }

    /// Find a constructor of this class, **last** match in declaration order.
    ///
    /// Unlike every other lookup, a later declaration wins over an earlier one when both
    /// accept the requested types.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if no constructor accepts the parameter types.
    pub fn get_declared_constructor(&self, parameter_types: &[ClassRc]) -> Result<Constructor> {
        self.ensure_linked()?
            .methods
            .iter()
            .rev()
            .find(|method| method.is_constructor() && accepts(method, parameter_types))
            .cloned()
            .map(Constructor::new)
            .ok_or_else(|| {
                Error::member_not_found(
                    MemberKind::Constructor,
                    CONSTRUCTOR_NAME,
                    render_signature(parameter_types),
                )
            })
    }

    /// All fields declared on this class, in declaration order
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_declared_fields(&self) -> Result<Vec<FieldRc>> {
        Ok(self.ensure_linked()?.fields.clone())
    }

    /// Public fields declared on this class
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_fields(&self) -> Result<Vec<FieldRc>> {
        Ok(self
            .ensure_linked()?
            .fields
            .iter()
            .filter(|field| field.is_public())
            .cloned()
            .collect())
    }

    /// Methods declared on this class, without constructors and static initializer
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_declared_methods(&self) -> Result<Vec<MethodRc>> {
        Ok(self
            .ensure_linked()?
            .methods
            .iter()
            .filter(|method| !method.is_reserved())
            .cloned()
            .collect())
    }

    /// Public methods declared on this class, without constructors and static initializer
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_methods(&self) -> Result<Vec<MethodRc>> {
        Ok(self
            .ensure_linked()?
            .methods
            .iter()
            .filter(|method| method.is_public() && !method.is_reserved())
            .cloned()
            .collect())
    }

    /// Constructors declared on this class
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_declared_constructors(&self) -> Result<Vec<Constructor>> {
        Ok(self
            .ensure_linked()?
            .methods
            .iter()
            .filter(|method| method.is_constructor())
            .cloned()
            .map(Constructor::new)
            .collect())
    }

    /// Public constructors declared on this class
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_constructors(&self) -> Result<Vec<Constructor>> {
        Ok(self
            .get_declared_constructors()?
            .into_iter()
            .filter(|constructor| constructor.is_public())
            .collect())
    }

    /// Every interface in the flattened interface table
    ///
    /// # Errors
    /// Propagates linking failures.
    pub fn get_interfaces(&self) -> Result<Vec<ClassRc>> {
        Ok(self
            .ensure_linked()?
            .interfaces
            .iter()
            .filter_map(|entry| entry.interface())
            .collect())
    }
}
