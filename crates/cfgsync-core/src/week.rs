//! Derived `current_week` calculation
//!
//! The week number is not stored: it is asked from the backend, which
//! derives it from the persisted `semester_start_date`. A failed query
//! degrades to week 1 instead of failing the surrounding operation.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::codec::DEFAULT_WEEK;
use crate::traits::Backend;

/// Queries the backend for the current week
pub struct WeekCalculator {
    backend: Arc<dyn Backend>,
}

impl WeekCalculator {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Current week, or 1 when the backend cannot tell
    pub async fn compute(&self) -> u32 {
        match self.backend.get_calculated_week_number().await {
            Ok(Some(week)) if week > 0 => {
                debug!("Backend reports week {}", week);
                week
            }
            Ok(_) => {
                debug!("Backend has no week number, using week {}", DEFAULT_WEEK);
                DEFAULT_WEEK
            }
            Err(e) => {
                warn!(
                    "Failed to calculate current week via {}: {}",
                    self.backend.backend_name(),
                    e
                );
                DEFAULT_WEEK
            }
        }
    }
}
