use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::catalog::Item;

bitflags! {
    /// Attribute filters over items, combined with OR.
    ///
    /// No flag set means no restriction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StateFilters: u8 {
        const FAVORITES = 0b0_0001;
        const SENSITIVE = 0b0_0010;
        /// Items that are neither favorite nor sensitive.
        const NORMAL    = 0b0_0100;
        const ARCHIVED  = 0b0_1000;
        const INACTIVE  = 0b1_0000;
    }
}

impl StateFilters {
    /// Checks whether `item` satisfies at least one enabled flag.
    pub fn passes(self, item: &Item) -> bool {
        if self.is_empty() {
            return true;
        }

        (self.contains(Self::FAVORITES) && item.is_favorite)
            || (self.contains(Self::SENSITIVE) && item.is_sensitive)
            || (self.contains(Self::NORMAL) && !item.is_favorite && !item.is_sensitive)
            || (self.contains(Self::ARCHIVED) && item.is_archived)
            || (self.contains(Self::INACTIVE) && !item.is_active)
    }
}
