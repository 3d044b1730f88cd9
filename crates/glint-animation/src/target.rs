//! The seam between the animation engine and whatever holds element state

use glint_core::{ElementId, OwnerToken, Property};

/// Readable and writable element properties, with ownership checks.
pub trait AnimationTarget {
    /// Current value of a property, or `None` if the element does not exist
    fn property(&self, element: ElementId, property: Property) -> Option<f32>;

    /// Write a property. Called only after `may_write` allowed it.
    fn set_property(&mut self, element: ElementId, property: Property, value: f32);

    /// Whether `owner` may currently drive `element`
    fn may_write(&self, element: ElementId, owner: OwnerToken) -> bool;

    /// Drop `owner`'s claim on `element`, if it holds one
    fn release(&mut self, element: ElementId, owner: OwnerToken);
}
