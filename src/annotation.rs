//! Text annotations attachable to a scene.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::scene::{SceneRegistry, SharedScene, WeakScene};

/// Shared handle to an annotation.
pub type SharedAnnotation = Rc<RefCell<TextAnnotation>>;

/// A named piece of text carried by a scene.
///
/// Registers itself into the active scene's `annotations` group on
/// construction. Presentation (placement, styling) is the embedding
/// application's business.
#[derive(Debug)]
pub struct TextAnnotation {
    name: String,
    text: String,
    scene: Option<WeakScene>,
}

impl TextAnnotation {
    /// New annotation registered under `name`.
    pub fn new(
        registry: &SceneRegistry,
        name: &str,
        text: &str,
    ) -> SharedAnnotation {
        let annotation = Rc::new(RefCell::new(Self {
            name: name.to_owned(),
            text: text.to_owned(),
            scene: None,
        }));
        let scene = registry.register(|scene| {
            scene
                .annotations_mut()
                .register(name, Rc::clone(&annotation));
        });
        annotation.borrow_mut().scene = scene.as_ref().map(Rc::downgrade);
        annotation
    }

    /// Annotation name (its registry key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Annotation text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the annotation text.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
    }

    /// The scene that was active when this annotation was constructed.
    #[must_use]
    pub fn scene(&self) -> Option<SharedScene> {
        self.scene.as_ref().and_then(Weak::upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_registers_into_active_scene() {
        let registry = SceneRegistry::new();
        let annotation =
            TextAnnotation::new(&registry, "title", "Pressure field");
        let scene = registry.active_scene().unwrap();
        assert!(scene.borrow().annotations().contains("title"));
        assert_eq!(annotation.borrow().text(), "Pressure field");

        annotation.borrow_mut().set_text("Velocity field");
        assert_eq!(annotation.borrow().text(), "Velocity field");
    }

    #[test]
    fn annotation_without_active_scene_is_unregistered() {
        let registry = SceneRegistry::new();
        let default = registry.scene(crate::scene::DEFAULT_SCENE);
        registry.exit(&default);

        let annotation = TextAnnotation::new(&registry, "orphan", "text");
        assert!(annotation.borrow().scene().is_none());
        assert!(default.borrow().annotations().is_empty());
    }
}
