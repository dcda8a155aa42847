//! Food table.

use serde::{Deserialize, Serialize};

/// Foods offered in the feeding submenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodKind {
    Burger,
    Cake,
}

/// Effect of one serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodProfile {
    pub hunger_relief: u8,
    pub health_delta: u8,
    pub weight_gain: u16,
}

impl FoodKind {
    /// Submenu order.
    pub const ALL: [FoodKind; 2] = [FoodKind::Burger, FoodKind::Cake];

    pub const fn profile(self) -> FoodProfile {
        match self {
            Self::Burger => FoodProfile {
                hunger_relief: 10,
                health_delta: 10,
                weight_gain: 3,
            },
            Self::Cake => FoodProfile {
                hunger_relief: 0,
                health_delta: 0,
                weight_gain: 15,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Burger => "Burger",
            Self::Cake => "Cake",
        }
    }

    /// Next entry in submenu order; stops at the last one.
    pub fn next(self) -> Self {
        let idx = self.index();
        Self::ALL[(idx + 1).min(Self::ALL.len() - 1)]
    }

    /// Previous entry; stops at the first one.
    pub fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}
