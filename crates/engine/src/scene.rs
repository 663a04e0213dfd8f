//! The ordered element store and current selection.
//!
//! Insertion order is paint order. Operations on ids that are not in the
//! scene are silent no-ops: the editor UI may race with deletions.

use clipweave_project_model::{Element, ElementId, ElementPatch};

#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    elements: Vec<Element>,
    selected: Option<ElementId>,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and select it.
    ///
    /// An element whose id is already present replaces the old one in
    /// place, so ids stay unique.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id.clone();
        match self.position(&id) {
            Some(index) => self.elements[index] = element,
            None => self.elements.push(element),
        }
        self.selected = Some(id.clone());
        id
    }

    /// Remove an element. Returns the removed element, if any.
    pub fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.position(id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.elements.remove(index))
    }

    /// Apply a patch. Returns whether an element was found and changed.
    pub fn update(&mut self, id: &ElementId, patch: ElementPatch) -> bool {
        match self.elements.iter_mut().find(|e| &e.id == id) {
            Some(element) => element.apply(patch),
            None => false,
        }
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    /// Elements in paint order.
    pub fn list(&self) -> &[Element] {
        &self.elements
    }

    /// Select `id`, or clear the selection with `None`. Unknown ids are
    /// ignored.
    pub fn select(&mut self, id: Option<&ElementId>) -> bool {
        match id {
            Some(id) if self.contains(id) => {
                self.selected = Some(id.clone());
                true
            }
            Some(_) => false,
            None => {
                self.selected = None;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Swap in a whole new element list, keeping the selection only if it
    /// still resolves.
    pub fn replace_all(&mut self, elements: Vec<Element>, selected: Option<ElementId>) {
        self.elements = elements;
        self.selected = selected.filter(|id| self.contains(id));
    }

    fn position(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }
}
