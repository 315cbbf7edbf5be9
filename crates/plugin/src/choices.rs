//! Enumeration choices.
//!
//! Closed enums that identify things by a stable integer id expose their
//! members as (id, name) pairs for display layers and diagnostics.

use std::collections::HashMap;

/// One selectable member of a closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: i32,
    pub name: &'static str,
}

impl Choice {
    pub const fn new(id: i32, name: &'static str) -> Self {
        Self { id, name }
    }
}

/// Exposes the members of a closed enumeration as (id, name) pairs.
pub trait Choices {
    /// All members, in declaration order.
    fn choices() -> Vec<Choice>;

    /// All members as an id-to-name map.
    fn dict_choices() -> HashMap<i32, &'static str> {
        Self::choices()
            .into_iter()
            .map(|choice| (choice.id, choice.name))
            .collect()
    }
}
