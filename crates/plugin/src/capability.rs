//! Capability categories for registered plugins.
//!
//! The set of categories is closed: a registry lookup validates nothing
//! beyond the (capability, name) key itself.

use std::fmt;

use crate::choices::{Choice, Choices};

/// The capability category half of a registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Capability {
    /// Plugins used only by test suites.
    Unittest = 1,
    /// Configuration providers (environment, file path).
    ConfigProvider = 2,
}

impl Capability {
    /// Stable integer id of this category.
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// Canonical lower-case name of this category.
    pub const fn name(self) -> &'static str {
        match self {
            Capability::Unittest => "unittest",
            Capability::ConfigProvider => "config_provider",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Choices for Capability {
    fn choices() -> Vec<Choice> {
        vec![
            Choice::new(Capability::Unittest.id(), Capability::Unittest.name()),
            Choice::new(
                Capability::ConfigProvider.id(),
                Capability::ConfigProvider.name(),
            ),
        ]
    }
}
