//! Standard recording layout
//!
//! Files that were already standardized: `Time` followed by `Speed - 0` (the
//! leader) through `Speed - 4`. This is also the layout written by the column
//! exporter, so exported tables can be analyzed again.

use super::LayoutAdapter;
use crate::PLATOON_SIZE;

/// Standard layout adapter
pub struct StandardLayout;

impl StandardLayout {
    /// Standard name of a vehicle slot's speed column
    pub fn speed_column(vehicle_id: usize) -> String {
        format!("Speed - {vehicle_id}")
    }
}

impl LayoutAdapter for StandardLayout {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn speed_columns(&self) -> [String; PLATOON_SIZE] {
        std::array::from_fn(Self::speed_column)
    }
}
