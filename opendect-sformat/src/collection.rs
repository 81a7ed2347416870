//! Reference-counted IE collections
//!
//! Parsed IEs outlive the parser stack: they are handed to the application
//! through parameter collections and may be held by protocol entities (a
//! call keeps its peer identities for the lifetime of the call). Every IE
//! is therefore shared behind an [`IeRef`] whose atomic reference count is
//! the hold/put mechanism: cloning holds, dropping puts, and the value is
//! freed exactly once when the last reference goes.
//!
//! An [`IeCollection`] groups references by IE type. Repeatable elements
//! form a list with a NORMAL or PRIORITIZED ordering; on the wire a
//! single-element list omits the <<REPEAT-INDICATOR>>.

use std::sync::Arc;

use crate::ie::{IeType, IE_FIXED_VAL_MASK};
use crate::ies::Ie;

/// Shared reference to a parsed IE. Clone to hold, drop to put.
pub type IeRef = Arc<Ie>;

/// Ordering of a repeated-IE list, carried by the <<REPEAT-INDICATOR>>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ListOrder {
    /// Non-prioritized list
    #[default]
    Normal = 0x1,
    /// Prioritized list
    Prioritized = 0x2,
}

impl ListOrder {
    /// Decodes the order from the repeat indicator's value nibble.
    pub fn from_wire(octet: u8) -> Option<Self> {
        match octet & IE_FIXED_VAL_MASK {
            0x1 => Some(ListOrder::Normal),
            0x2 => Some(ListOrder::Prioritized),
            _ => None,
        }
    }
}

/// An ordered list of same-type IEs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IeList {
    pub order: ListOrder,
    pub items: Vec<IeRef>,
}

impl IeList {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A collection of IEs keyed by type, as delivered to and accepted from
/// the application.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IeCollection {
    groups: Vec<(IeType, IeList)>,
}

impl IeCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an IE, appending to the group of its type.
    pub fn add(&mut self, ie: Ie) -> &mut Self {
        self.add_ref(Arc::new(ie))
    }

    /// Adds a held IE reference, appending to the group of its type.
    pub fn add_ref(&mut self, ie: IeRef) -> &mut Self {
        let ty = ie.ie_type();
        if let Some((_, list)) = self.groups.iter_mut().find(|(t, _)| *t == ty) {
            list.items.push(ie);
        } else {
            self.groups.push((
                ty,
                IeList {
                    order: ListOrder::Normal,
                    items: vec![ie],
                },
            ));
        }
        self
    }

    /// Sets the list ordering for the group of the given type, creating the
    /// group if needed.
    pub fn set_order(&mut self, ty: IeType, order: ListOrder) {
        if let Some((_, list)) = self.groups.iter_mut().find(|(t, _)| *t == ty) {
            list.order = order;
        } else {
            self.groups.push((
                ty,
                IeList {
                    order,
                    items: Vec::new(),
                },
            ));
        }
    }

    /// The first IE of the given type, if present.
    pub fn get(&self, ty: IeType) -> Option<&IeRef> {
        self.groups
            .iter()
            .find(|(t, _)| *t == ty)
            .and_then(|(_, list)| list.items.first())
    }

    /// The list of the given type; empty if absent.
    pub fn list(&self, ty: IeType) -> &[IeRef] {
        self.groups
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, list)| list.items.as_slice())
            .unwrap_or(&[])
    }

    /// The ordering of the list of the given type.
    pub fn order(&self, ty: IeType) -> ListOrder {
        self.groups
            .iter()
            .find(|(t, _)| *t == ty)
            .map(|(_, list)| list.order)
            .unwrap_or_default()
    }

    /// Returns true if an IE of the given type is present.
    pub fn contains(&self, ty: IeType) -> bool {
        !self.list(ty).is_empty()
    }

    /// Number of IEs across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, list)| list.items.len()).sum()
    }

    /// Returns true if the collection holds no IEs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all groups in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = (IeType, &IeList)> {
        self.groups.iter().map(|(ty, list)| (*ty, list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ies::{IeDisplay, IeSignal};

    #[test]
    fn test_add_and_get() {
        let mut collection = IeCollection::new();
        collection.add(Ie::Signal(IeSignal { code: 0x44 }));

        let ie = collection.get(IeType::Signal).unwrap();
        assert_eq!(**ie, Ie::Signal(IeSignal { code: 0x44 }));
        assert!(collection.get(IeType::SingleDisplay).is_none());
    }

    #[test]
    fn test_same_type_forms_list() {
        let mut collection = IeCollection::new();
        collection.add(Ie::Display(IeDisplay::new(b"a".to_vec())));
        collection.add(Ie::Display(IeDisplay::new(b"b".to_vec())));

        assert_eq!(collection.list(IeType::SingleDisplay).len(), 2);
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_hold_put_reaches_zero_once() {
        let ie: IeRef = Arc::new(Ie::Signal(IeSignal { code: 1 }));
        assert_eq!(Arc::strong_count(&ie), 1);

        let mut collection = IeCollection::new();
        collection.add_ref(ie.clone());
        assert_eq!(Arc::strong_count(&ie), 2);

        drop(collection);
        assert_eq!(Arc::strong_count(&ie), 1);
    }

    #[test]
    fn test_list_order() {
        let mut collection = IeCollection::new();
        collection.add(Ie::Display(IeDisplay::new(b"a".to_vec())));
        assert_eq!(collection.order(IeType::SingleDisplay), ListOrder::Normal);

        collection.set_order(IeType::SingleDisplay, ListOrder::Prioritized);
        assert_eq!(
            collection.order(IeType::SingleDisplay),
            ListOrder::Prioritized
        );
    }

    #[test]
    fn test_list_order_from_wire() {
        assert_eq!(ListOrder::from_wire(0xd1), Some(ListOrder::Normal));
        assert_eq!(ListOrder::from_wire(0xd2), Some(ListOrder::Prioritized));
        assert_eq!(ListOrder::from_wire(0xd7), None);
    }
}
