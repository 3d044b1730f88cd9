//! In-memory page model: elements, layout, visual state and ownership

use glint_animation::AnimationTarget;
use glint_core::{ElementId, GlintError, OwnerToken, Property, Result};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Viewport size in CSS pixels plus device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            dpr: 1.0,
        }
    }
}

/// Vertical position of an element in document pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LayoutBox {
    pub top: f32,
    pub height: f32,
}

impl LayoutBox {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// One node of the page
#[derive(Debug, Clone, Default, Serialize)]
pub struct Element {
    pub tag: String,
    pub text: String,
    pub classes: BTreeSet<String>,
    /// `data-*` attributes, keyed without the prefix
    pub data: BTreeMap<String, String>,
    /// Other attributes (`role`, `aria-*`, `style` fragments)
    pub attributes: BTreeMap<String, String>,
    pub layout: LayoutBox,
    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    /// Animated properties that differ from their rest values
    pub visual: BTreeMap<Property, f32>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn property(&self, property: Property) -> f32 {
        self.visual
            .get(&property)
            .copied()
            .unwrap_or(property.rest_value())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// The document effects read and animate.
///
/// Effects never look elements up by selector; they hold the
/// `ElementId`s they were given or created.
pub struct Page {
    elements: HashMap<ElementId, Element>,
    root: ElementId,
    owners: HashMap<ElementId, OwnerToken>,
    viewport: Viewport,
    scroll_offset: f32,
    document_height: f32,
    loading: bool,
    fine_pointer: bool,
    visible: bool,
}

impl Page {
    pub fn new(viewport: Viewport) -> Self {
        let root = ElementId::new();
        let mut elements = HashMap::new();
        elements.insert(root, Element::new("body"));
        Self {
            elements,
            root,
            owners: HashMap::new(),
            viewport,
            scroll_offset: 0.0,
            document_height: viewport.height,
            loading: false,
            fine_pointer: true,
            visible: true,
        }
    }

    /// The document body
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Create an element appended to the body
    pub fn create(&mut self, tag: &str) -> ElementId {
        let root = self.root;
        self.create_in(root, tag)
    }

    /// Create an element appended to `parent` (or the body if `parent` is gone)
    pub fn create_in(&mut self, parent: ElementId, tag: &str) -> ElementId {
        let parent = if self.contains(parent) { parent } else { self.root };
        let id = ElementId::new();
        let mut element = Element::new(tag);
        element.parent = Some(parent);
        self.elements.insert(id, element);
        if let Some(p) = self.elements.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Move `child` under `parent`
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        if !self.contains(parent) {
            return Err(GlintError::ElementNotFound(parent.to_string()));
        }
        let old_parent = self
            .elements
            .get(&child)
            .ok_or_else(|| GlintError::ElementNotFound(child.to_string()))?
            .parent;
        if child == self.root || self.is_ancestor(child, parent) {
            return Err(GlintError::EffectError(format!(
                "cannot move {child} under its own descendant {parent}"
            )));
        }
        if let Some(old) = old_parent.and_then(|p| self.elements.get_mut(&p)) {
            old.children.retain(|c| *c != child);
        }
        if let Some(el) = self.elements.get_mut(&child) {
            el.parent = Some(parent);
        }
        if let Some(p) = self.elements.get_mut(&parent) {
            p.children.push(child);
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: ElementId, mut node: ElementId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.elements.get(&node).and_then(|e| e.parent) {
                Some(p) => node = p,
                None => return false,
            }
        }
    }

    /// Remove an element and everything under it. Returns false if it was
    /// already gone. The body cannot be removed.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(element) = self.elements.remove(&id) else {
            return false;
        };
        self.owners.remove(&id);
        if let Some(parent) = element.parent.and_then(|p| self.elements.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut stack = element.children;
        while let Some(child) = stack.pop() {
            if let Some(el) = self.elements.remove(&child) {
                self.owners.remove(&child);
                stack.extend(el.children);
            }
        }
        true
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// Every element with this tag, in document order
    pub fn find_by_tag(&self, tag: &str) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(el) = self.elements.get(&id) else {
                continue;
            };
            if el.tag == tag {
                out.push(id);
            }
            stack.extend(el.children.iter().rev());
        }
        out
    }

    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).map(|e| e.text.as_str())
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        match self.elements.get_mut(&id) {
            Some(el) => {
                el.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.classes.remove(class);
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements.get(&id).is_some_and(|e| e.has_class(class))
    }

    pub fn data(&self, id: ElementId, key: &str) -> Option<&str> {
        self.elements
            .get(&id)
            .and_then(|e| e.data.get(key))
            .map(String::as_str)
    }

    pub fn set_data(&mut self, id: ElementId, key: &str, value: impl Into<String>) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.data.insert(key.to_string(), value.into());
        }
    }

    pub fn remove_data(&mut self, id: ElementId, key: &str) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.data.remove(key);
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements
            .get(&id)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn layout(&self, id: ElementId) -> Option<LayoutBox> {
        self.elements.get(&id).map(|e| e.layout)
    }

    pub fn set_layout(&mut self, id: ElementId, top: f32, height: f32) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.layout = LayoutBox { top, height };
        }
        self.document_height = self.document_height.max(top + height);
    }

    /// Clear every animated property back to its rest value
    pub fn reset_properties(&mut self, id: ElementId) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.visual.clear();
        }
    }

    pub fn clear_property(&mut self, id: ElementId, property: Property) {
        if let Some(el) = self.elements.get_mut(&id) {
            el.visual.remove(&property);
        }
    }

    // Viewport and document

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.document_height = self.document_height.max(viewport.height);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Scroll to an offset, clamped to the scrollable range
    pub fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_offset = offset.clamp(0.0, self.max_scroll());
    }

    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    pub fn set_document_height(&mut self, height: f32) {
        self.document_height = height.max(self.viewport.height);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.viewport.height).max(0.0)
    }

    /// Scroll position as a fraction of the scrollable range
    pub fn scroll_progress(&self) -> f32 {
        let max = self.max_scroll();
        if max <= 0.0 {
            0.0
        } else {
            (self.scroll_offset / max).clamp(0.0, 1.0)
        }
    }

    /// Whether the element's top edge has crossed `fraction` of the
    /// viewport height (`0.8` is "top 80%")
    pub fn top_reached(&self, id: ElementId, fraction: f32) -> bool {
        self.layout(id).is_some_and(|l| {
            l.top - self.scroll_offset <= self.viewport.height * fraction
        })
    }

    /// The root "still loading" marker
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Whether the primary pointer is precise (mouse rather than touch)
    pub fn has_fine_pointer(&self) -> bool {
        self.fine_pointer
    }

    pub fn set_fine_pointer(&mut self, fine: bool) {
        self.fine_pointer = fine;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // Ownership

    /// Take `element` for `owner` if nobody else holds it
    pub fn claim(&mut self, element: ElementId, owner: OwnerToken) -> bool {
        if !self.contains(element) {
            return false;
        }
        match self.owners.get(&element) {
            Some(current) if *current != owner => false,
            _ => {
                self.owners.insert(element, owner);
                true
            }
        }
    }

    /// Take `element` for `owner`, pre-empting any current holder
    pub fn force_claim(&mut self, element: ElementId, owner: OwnerToken) -> Option<OwnerToken> {
        if !self.contains(element) {
            return None;
        }
        let previous = self.owners.insert(element, owner);
        if let Some(prev) = previous.filter(|p| *p != owner) {
            tracing::debug!(%element, previous = prev.0, "element pre-empted");
        }
        previous
    }

    pub fn owner_of(&self, element: ElementId) -> Option<OwnerToken> {
        self.owners.get(&element).copied()
    }
}

impl AnimationTarget for Page {
    fn property(&self, element: ElementId, property: Property) -> Option<f32> {
        self.elements.get(&element).map(|e| e.property(property))
    }

    fn set_property(&mut self, element: ElementId, property: Property, value: f32) {
        if let Some(el) = self.elements.get_mut(&element) {
            el.visual.insert(property, value);
        }
    }

    fn may_write(&self, element: ElementId, owner: OwnerToken) -> bool {
        self.owners.get(&element).map_or(true, |o| *o == owner)
    }

    fn release(&mut self, element: ElementId, owner: OwnerToken) {
        if self.owners.get(&element) == Some(&owner) {
            self.owners.remove(&element);
        }
    }
}
