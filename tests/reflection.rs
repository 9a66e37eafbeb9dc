//! Integration tests for reflection queries through the public API.
//!
//! A small class hierarchy is defined on an in-memory loader and queried the way a
//! reflection layer would: names, member lookup, assignability and annotations.

use std::sync::Arc;

use classscope::{prelude::*, MemberKind};

fn no_setup(_: &Class) -> Result<()> {
    Ok(())
}

fn shelter() -> Arc<MemoryLoader> {
    let loader = MemoryLoader::system();

    loader.add_definition(
        ClassBuilder::annotation_type("org/shelter/Audited")
            .public()
            .element_with_default(
                "by",
                "()Ljava/lang/String;",
                ElementValue::Const(Constant::String("nobody".to_string())),
            )
            .build(),
    );
    loader.add_definition(
        ClassBuilder::interface("org/shelter/Adoptable")
            .public()
            .method("adopt", "()V", Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("org/shelter/Animal")
            .extends("java/lang/Object")
            .public()
            .field("name", "Ljava/lang/String;", Modifiers::PUBLIC)
            .constructor("()V", Modifiers::PUBLIC)
            .method("feed", "(Ljava/lang/Object;)V", Modifiers::PUBLIC)
            .method("feed", "(Ljava/lang/String;)V", Modifiers::PUBLIC)
            .annotation(AnnotationDefinition::new("org/shelter/Audited"))
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("org/shelter/Dog")
            .extends("org/shelter/Animal")
            .implements("org/shelter/Adoptable")
            .public()
            .field("collar", "I", Modifiers::PUBLIC)
            .constructor("()V", Modifiers::PUBLIC)
            .method("adopt", "()V", Modifiers::PUBLIC)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("org/shelter/Kennel$Door")
            .extends("java/lang/Object")
            .public()
            .build(),
    );

    loader
}

#[test]
fn test_canonical_names_use_dots_only() -> Result<()> {
    let loader = shelter();
    let names = [
        "org/shelter/Dog",
        "org/shelter/Kennel$Door",
        "[Lorg/shelter/Dog;",
        "[[Lorg/shelter/Kennel$Door;",
        "[J",
        "java/lang/Object",
    ];

    for name in names {
        let class = loader.resolve(name)?;
        assert!(!class.canonical_name().contains('/'), "{name}");
        assert!(!class.name().contains('/'), "{name}");
    }

    let door = loader.resolve("org/shelter/Kennel$Door")?;
    assert_eq!(door.name(), "org.shelter.Kennel$Door");
    assert_eq!(door.canonical_name(), "org.shelter.Kennel.Door");
    assert_eq!(door.simple_name(), "Door");

    let doors = loader.resolve("[[Lorg/shelter/Kennel$Door;")?;
    assert_eq!(doors.name(), "[[Lorg.shelter.Kennel$Door;");
    assert_eq!(doors.canonical_name(), "org.shelter.Kennel.Door[][]");
    Ok(())
}

#[test]
fn test_assignability_is_reflexive_and_transitive() -> Result<()> {
    let loader = shelter();
    let classes: Vec<ClassRc> = [
        "java/lang/Object",
        "org/shelter/Adoptable",
        "org/shelter/Animal",
        "org/shelter/Dog",
        "[Lorg/shelter/Dog;",
        "[Lorg/shelter/Animal;",
        "[I",
    ]
    .iter()
    .map(|name| loader.resolve(name))
    .collect::<Result<_>>()?;
    let int = primitive_class(PrimitiveKind::Int);

    for a in classes.iter().chain(std::iter::once(&int)) {
        assert!(a.is_assignable_from(a), "{a}");
        for b in &classes {
            for c in &classes {
                if a.is_assignable_from(b) && b.is_assignable_from(c) {
                    assert!(a.is_assignable_from(c), "{a} <- {b} <- {c}");
                }
            }
        }
    }

    let dog = loader.resolve("org/shelter/Dog")?;
    let adoptable = loader.resolve("org/shelter/Adoptable")?;
    let object = loader.resolve("java/lang/Object")?;
    assert!(adoptable.is_assignable_from(&dog));
    assert!(!dog.is_assignable_from(&adoptable));
    assert!(object.is_assignable_from(&adoptable));
    assert!(!object.is_assignable_from(&int));
    Ok(())
}

#[test]
fn test_field_lookup_walks_the_superclass_chain() -> Result<()> {
    let loader = shelter();
    let dog = loader.resolve("org/shelter/Dog")?;
    let animal = loader.resolve("org/shelter/Animal")?;

    let inherited = dog.get_field("name")?;
    assert!(Arc::ptr_eq(&inherited, &animal.get_declared_field("name")?));

    let own = dog.get_field("collar")?;
    assert!(Arc::ptr_eq(&own, &dog.get_declared_field("collar")?));

    match dog.get_declared_field("name") {
        Err(Error::MemberNotFound { kind, name, .. }) => {
            assert_eq!(kind, MemberKind::Field);
            assert_eq!(name, "name");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        dog.get_field("tail"),
        Err(Error::MemberNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_method_lookup_is_first_match() -> Result<()> {
    let loader = shelter();
    let dog = loader.resolve("org/shelter/Dog")?;
    let string = loader.resolve("java/lang/String")?;
    let object = loader.resolve("java/lang/Object")?;

    // feed(Object) is declared first and accepts a String
    let feed = dog.get_method("feed", &[string])?;
    let parameters = feed.parameter_types();
    assert!(Arc::ptr_eq(&parameters[0], &object));

    assert!(matches!(
        dog.get_method("<init>", &[]),
        Err(Error::MemberNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_annotations_are_materialized_once() -> Result<()> {
    let loader = shelter();
    let runtime = Runtime::new(loader.clone(), Arc::new(no_setup));
    let dog = loader.resolve("org/shelter/Dog")?;
    let audited = loader.resolve("org/shelter/Audited")?;

    let first = runtime
        .get_annotation(&dog, &audited)?
        .expect("inherited from Animal");
    let second = runtime
        .get_annotation(&dog, &audited)?
        .expect("inherited from Animal");
    assert!(Arc::ptr_eq(&first, &second));

    let by = first.invoke("by")?;
    assert_eq!(by.as_const().and_then(Constant::as_str), Some("nobody"));
    assert!(runtime.get_declared_annotations(&dog)?.is_empty());
    Ok(())
}

#[test]
fn test_primitive_names_are_fixed() {
    let expected = [
        (PrimitiveKind::Boolean, "boolean"),
        (PrimitiveKind::Byte, "byte"),
        (PrimitiveKind::Char, "char"),
        (PrimitiveKind::Short, "short"),
        (PrimitiveKind::Int, "int"),
        (PrimitiveKind::Long, "long"),
        (PrimitiveKind::Float, "float"),
        (PrimitiveKind::Double, "double"),
        (PrimitiveKind::Void, "void"),
    ];

    for (kind, name) in expected {
        let class = primitive_class(kind);
        assert_eq!(class.name(), name);
        assert!(std::ptr::eq(class.name(), class.name()));
        assert!(Arc::ptr_eq(&class, &primitive_class(kind)));
    }
}

#[test]
fn test_primitive_array_component_is_the_singleton() -> Result<()> {
    let loader = shelter();
    let ints = loader.resolve("[I")?;
    let component = ints.component_type().expect("array");
    assert!(Arc::ptr_eq(&component, &primitive_class(PrimitiveKind::Int)));

    let dogs = loader.resolve("[Lorg/shelter/Dog;")?;
    let dog = loader.resolve("org/shelter/Dog")?;
    assert!(Arc::ptr_eq(&dogs.component_type().expect("array"), &dog));
    Ok(())
}

#[test]
fn test_for_name_links_and_initializes() -> Result<()> {
    let loader = shelter();
    let runtime = Runtime::new(loader, Arc::new(no_setup));

    let dog = runtime.for_name("org.shelter.Dog", false, None)?;
    assert_eq!(dog.state(), ClassState::Linked);

    let dog = runtime.for_name("org.shelter.Dog", true, None)?;
    assert_eq!(dog.state(), ClassState::Initialized);
    assert_eq!(
        dog.superclass().expect("Animal").state(),
        ClassState::Initialized
    );

    let longs = runtime.for_canonical_name(None, "[J")?;
    assert_eq!(longs.canonical_name(), "long[]");
    assert!(matches!(
        runtime.for_name("org.shelter.Cat", false, None),
        Err(Error::TypeNotFound(_))
    ));
    Ok(())
}
