//! Destination categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a message ends up. Each category is also the exact name of the
/// folder it is moved into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    /// Bills and payments.
    Faturas,
    /// Work.
    Trabalho,
    /// Personal.
    Pessoal,
    /// Marketing.
    Marketing,
    /// System notices.
    Sistema,
    /// No keyword, negative tone.
    Problemas,
    /// No keyword, positive tone.
    Positivos,
    /// No keyword, neutral tone.
    Neutros,
}

impl Category {
    /// Every category, rule categories first.
    pub const ALL: [Self; 8] = [
        Self::Faturas,
        Self::Trabalho,
        Self::Pessoal,
        Self::Marketing,
        Self::Sistema,
        Self::Problemas,
        Self::Positivos,
        Self::Neutros,
    ];

    /// Folder name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Faturas => "Faturas",
            Self::Trabalho => "Trabalho",
            Self::Pessoal => "Pessoal",
            Self::Marketing => "Marketing",
            Self::Sistema => "Sistema",
            Self::Problemas => "Problemas",
            Self::Positivos => "Positivos",
            Self::Neutros => "Neutros",
        }
    }

    /// Icon used in reports.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Faturas => "💰",
            Self::Trabalho => "💼",
            Self::Pessoal => "👤",
            Self::Marketing => "📢",
            Self::Sistema => "⚙️",
            Self::Problemas => "⚠️",
            Self::Positivos => "😊",
            Self::Neutros => "📄",
        }
    }

    /// Looks a category up by folder name.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
