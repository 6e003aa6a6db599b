//! Typed per-operation state attached to an [`OperationContext`](super::OperationContext).
//!
//! A [`Decoration`] is a marker type naming one slot; its associated `Value`
//! is the state stored in that slot. Slots live in a `TypeId`-keyed side-table
//! owned by the context, so their lifetime is exactly the context's lifetime.
//! Reading a slot that was never written yields the value's `Default`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// A named, typed, default-valued slot on an operation context.
///
/// ```ignore
/// pub struct RetryCount;
///
/// impl Decoration for RetryCount {
///     type Value = u32;
/// }
/// ```
pub trait Decoration: 'static {
    /// State held in the slot. Slots start out as `Value::default()`.
    type Value: Default + Send + 'static;
}

/// Side-table of decoration slots for a single operation context.
#[derive(Default)]
pub struct Decorations {
    /// Slot storage keyed by the `TypeId` of the decoration marker type.
    slots: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl Decorations {
    /// Creates an empty side-table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot's value, or `None` if the slot was never touched.
    #[must_use]
    pub fn get<D: Decoration>(&self) -> Option<&D::Value> {
        self.slots
            .get(&TypeId::of::<D>())
            .and_then(|slot| slot.downcast_ref::<D::Value>())
    }

    /// Returns a mutable reference to the slot, default-initializing it on first use.
    pub fn get_mut<D: Decoration>(&mut self) -> &mut D::Value {
        let slot = self
            .slots
            .entry(TypeId::of::<D>())
            .or_insert_with(|| Box::new(D::Value::default()));
        match slot.downcast_mut::<D::Value>() {
            Some(value) => value,
            // Slots are keyed by `D` and only ever hold `D::Value`.
            None => unreachable!("decoration slot holds a foreign type"),
        }
    }

    /// Overwrites the slot's value.
    pub fn set<D: Decoration>(&mut self, value: D::Value) {
        self.slots.insert(TypeId::of::<D>(), Box::new(value));
    }

    /// Number of slots that have been touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot has been touched yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Decorations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorations")
            .field("slots", &self.slots.len())
            .finish()
    }
}
