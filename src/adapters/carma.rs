//! CARMA recording layout
//!
//! CARMA platoon runs log GPS speed per vehicle under the vehicle's role name:
//! `leader_GPS_CARMA_speed`, then `follower{1..4}_GPS_CARMA_speed`. Radar
//! spacing and other columns are ignored.

use super::LayoutAdapter;
use crate::PLATOON_SIZE;

/// CARMA layout adapter
pub struct CarmaLayout;

impl CarmaLayout {
    /// Source column of a vehicle slot's speed
    pub fn speed_column(vehicle_id: usize) -> String {
        match vehicle_id {
            0 => "leader_GPS_CARMA_speed".to_string(),
            i => format!("follower{i}_GPS_CARMA_speed"),
        }
    }
}

impl LayoutAdapter for CarmaLayout {
    fn name(&self) -> &'static str {
        "carma"
    }

    fn speed_columns(&self) -> [String; PLATOON_SIZE] {
        std::array::from_fn(Self::speed_column)
    }
}
