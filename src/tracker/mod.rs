//! Per-entity tracking rules
//!
//! Each manager is a thin policy layer over the [`EntityStore`]: it fills in
//! defaults and derived fields, then performs one load-modify-save cycle per
//! operation. Creation with a missing required field is a silent no-op
//! (`Ok(None)`); only storage failures are errors.

pub mod activity;
pub mod appointments;
pub mod input;
pub mod medicine;
pub mod metrics;
pub mod profile;
pub mod summary;
pub mod water;

pub use activity::{ActivityForm, ActivityManager, ActivityTotals};
pub use appointments::{AppointmentForm, AppointmentManager, AppointmentSchedule};
pub use medicine::{MedicineForm, MedicineManager};
pub use metrics::{MetricForm, MetricsManager};
pub use profile::{ProfileForm, ProfileManager};
pub use summary::DailySummary;
pub use water::WaterManager;

use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;

use crate::clock::{Clock, IdGenerator, SystemClock};
use crate::config::TrackingConfig;
use crate::storage::{EntityStore, KeyValueStore};

/// Shared handles every manager works through.
#[derive(Debug, Clone)]
pub struct TrackerContext {
    pub store: EntityStore,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<IdGenerator>,
    pub settings: TrackingConfig,
}

impl TrackerContext {
    fn next_id(&self) -> String {
        self.ids.next_id(self.clock.now())
    }

    /// Current time at the millisecond precision records are stored with.
    pub fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc).trunc_subsecs(3)
    }
}

/// Entry point bundling the store, clock and settings.
#[derive(Debug, Clone)]
pub struct Tracker {
    ctx: TrackerContext,
}

impl Tracker {
    pub fn new(
        backend: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: TrackingConfig,
    ) -> Self {
        Tracker {
            ctx: TrackerContext {
                store: EntityStore::new(backend),
                clock,
                ids: Arc::new(IdGenerator::new()),
                settings,
            },
        }
    }

    pub fn with_system_clock(backend: Arc<dyn KeyValueStore>, settings: TrackingConfig) -> Self {
        Self::new(backend, Arc::new(SystemClock), settings)
    }

    pub fn context(&self) -> &TrackerContext {
        &self.ctx
    }

    pub fn metrics(&self) -> MetricsManager {
        MetricsManager::new(self.ctx.clone())
    }

    pub fn medicines(&self) -> MedicineManager {
        MedicineManager::new(self.ctx.clone())
    }

    pub fn water(&self) -> WaterManager {
        WaterManager::new(self.ctx.clone())
    }

    pub fn activities(&self) -> ActivityManager {
        ActivityManager::new(self.ctx.clone())
    }

    pub fn appointments(&self) -> AppointmentManager {
        AppointmentManager::new(self.ctx.clone())
    }

    pub fn profiles(&self) -> ProfileManager {
        ProfileManager::new(self.ctx.clone())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::MemoryStore;
    use chrono::{Local, TimeZone};

    /// Tracker over an empty in-memory store, pinned to 2024-03-10 09:30 local.
    pub fn tracker() -> (Arc<MemoryStore>, Tracker) {
        tracker_at(2024, 3, 10, 9, 30)
    }

    pub fn tracker_at(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> (Arc<MemoryStore>, Tracker) {
        let backend = Arc::new(MemoryStore::new());
        let now = Local
            .with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap();
        let tracker = Tracker::new(
            backend.clone(),
            Arc::new(FixedClock::new(now)),
            TrackingConfig::default(),
        );
        (backend, tracker)
    }
}
