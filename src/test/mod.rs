use std::sync::Arc;

use crate::{
    loader::MemoryLoader,
    metadata::{
        annotations::{Constant, ElementValue},
        typesystem::{AnnotationDefinition, ClassBuilder, ClassRc, Modifiers},
    },
    runtime::Object,
};

/// A small class hierarchy on top of the system loader:
///
/// ```text
/// Object <- Animal <- Dog (Pet) <- Puppy (Playful)
/// Named <- Pet
/// Object <- Shape (abstract), Size (enum), Zoo$Keeper (no constructor)
/// @Marker(value, label) on Animal, @Tag(kind, size) on Dog
/// ```
pub fn zoo() -> Arc<MemoryLoader> {
    let loader = MemoryLoader::system();

    loader.add_definition(
        ClassBuilder::interface("com/acme/Named")
            .public()
            .method(
                "name",
                "()Ljava/lang/String;",
                Modifiers::PUBLIC | Modifiers::ABSTRACT,
            )
            .build(),
    );
    loader.add_definition(
        ClassBuilder::interface("com/acme/Pet")
            .public()
            .implements("com/acme/Named")
            .method("play", "()V", Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::interface("com/acme/Playful")
            .public()
            .method("fetch", "()V", Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::annotation_type("com/acme/Marker")
            .public()
            .element_with_default("value", "()I", ElementValue::Const(Constant::Int(1)))
            .element_with_default(
                "label",
                "()Ljava/lang/String;",
                ElementValue::Const(Constant::String("none".to_string())),
            )
            .build(),
    );
    loader.add_definition(
        ClassBuilder::annotation_type("com/acme/Tag")
            .public()
            .method(
                "kind",
                "()Ljava/lang/Class;",
                Modifiers::PUBLIC | Modifiers::ABSTRACT,
            )
            .method(
                "size",
                "()Lcom/acme/Size;",
                Modifiers::PUBLIC | Modifiers::ABSTRACT,
            )
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("com/acme/Size")
            .extends("java/lang/Object")
            .flags(Modifiers::PUBLIC | Modifiers::FINAL | Modifiers::ENUM)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("com/acme/Animal")
            .extends("java/lang/Object")
            .public()
            .source_file("Animal.java")
            .field("name", "Ljava/lang/String;", Modifiers::PUBLIC)
            .field("legs", "I", Modifiers::PUBLIC)
            .constructor("()V", Modifiers::PUBLIC)
            .constructor("(Ljava/lang/String;)V", Modifiers::PUBLIC)
            .method("speak", "()V", Modifiers::PUBLIC)
            .method("describe", "(Ljava/lang/Object;)V", Modifiers::PUBLIC)
            .method("describe", "(Ljava/lang/String;)V", Modifiers::PUBLIC)
            .annotation(
                AnnotationDefinition::new("com/acme/Marker")
                    .element("value", ElementValue::Const(Constant::Int(3))),
            )
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("com/acme/Dog")
            .extends("com/acme/Animal")
            .implements("com/acme/Pet")
            .public()
            .field("breed", "Ljava/lang/String;", Modifiers::PUBLIC)
            .field("secret", "I", Modifiers::PRIVATE)
            .constructor("()V", Modifiers::PUBLIC)
            .constructor("(Ljava/lang/Object;)V", Modifiers::PUBLIC)
            .constructor("(Ljava/lang/String;)V", Modifiers::PUBLIC)
            .method("speak", "()V", Modifiers::PUBLIC)
            .method("play", "()V", Modifiers::PUBLIC)
            .method("name", "()Ljava/lang/String;", Modifiers::PUBLIC)
            .method("groom", "()V", Modifiers::PRIVATE)
            .annotation(
                AnnotationDefinition::new("com/acme/Tag")
                    .element("kind", ElementValue::Class("Lcom/acme/Animal;".to_string()))
                    .element(
                        "size",
                        ElementValue::Enum {
                            type_descriptor: "Lcom/acme/Size;".to_string(),
                            constant: "LARGE".to_string(),
                        },
                    ),
            )
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("com/acme/Puppy")
            .extends("com/acme/Dog")
            .implements("com/acme/Playful")
            .public()
            .method("fetch", "()V", Modifiers::PUBLIC)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("com/acme/Shape")
            .extends("java/lang/Object")
            .flags(Modifiers::PUBLIC | Modifiers::ABSTRACT)
            .constructor("()V", Modifiers::PUBLIC)
            .build(),
    );
    loader.add_definition(
        ClassBuilder::new("com/acme/Zoo$Keeper")
            .extends("java/lang/Object")
            .public()
            .build(),
    );

    loader.add_resource("com/acme/bark.wav", vec![0x52, 0x49, 0x46, 0x46]);
    loader.add_resource("readme.txt", b"zoo".to_vec());

    loader
}

/// A bare managed object that only knows its class
#[derive(Debug)]
pub struct Instance {
    class: ClassRc,
}

impl Instance {
    pub fn of(class: &ClassRc) -> Self {
        Instance {
            class: class.clone(),
        }
    }
}

impl Object for Instance {
    fn class(&self) -> ClassRc {
        self.class.clone()
    }
}
