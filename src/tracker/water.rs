use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::info;

use super::TrackerContext;
use crate::error::StoreError;
use crate::records::WaterIntake;
use crate::storage::StorageKey;

/// One water record per user per day, keyed `water_{userId}_{yyyy-MM-dd}`.
#[derive(Debug, Clone)]
pub struct WaterManager {
    ctx: TrackerContext,
}

impl WaterManager {
    pub fn new(ctx: TrackerContext) -> Self {
        WaterManager { ctx }
    }

    /// Today's record. When none is stored a fresh one is returned
    /// (zero glasses, last-used goal) without being saved.
    pub fn today(&self, user_id: &str) -> Result<WaterIntake, StoreError> {
        self.for_day(user_id, self.ctx.clock.today())
    }

    pub fn for_day(&self, user_id: &str, day: NaiveDate) -> Result<WaterIntake, StoreError> {
        let key = StorageKey::water(user_id, day);
        match self.ctx.store.load_document(&key)? {
            Some(intake) => Ok(intake),
            None => Ok(WaterIntake {
                id: day_id(day),
                user_id: user_id.to_string(),
                date: day,
                glasses: 0,
                goal: self.goal_before(user_id, day)?,
            }),
        }
    }

    /// Add `change` glasses (negative to remove), never going below zero.
    ///
    /// There is no goal-based ceiling; the count only saturates at `u32::MAX`.
    pub fn adjust(&self, user_id: &str, change: i64) -> Result<WaterIntake, StoreError> {
        let mut intake = self.today(user_id)?;
        let step = u32::try_from(change.unsigned_abs()).unwrap_or(u32::MAX);
        intake.glasses = if change >= 0 {
            intake.glasses.saturating_add(step)
        } else {
            intake.glasses.saturating_sub(step)
        };
        self.save(&intake)?;

        info!(user_id, glasses = intake.glasses, goal = intake.goal, "updated water intake");
        Ok(intake)
    }

    pub fn increment(&self, user_id: &str) -> Result<WaterIntake, StoreError> {
        self.adjust(user_id, 1)
    }

    pub fn decrement(&self, user_id: &str) -> Result<WaterIntake, StoreError> {
        self.adjust(user_id, -1)
    }

    /// Rewrite today's goal; 0 falls back to the configured default.
    pub fn set_goal(&self, user_id: &str, goal: u32) -> Result<WaterIntake, StoreError> {
        let mut intake = self.today(user_id)?;
        intake.goal = if goal == 0 {
            self.ctx.settings.default_water_goal
        } else {
            goal
        };
        self.save(&intake)?;

        info!(user_id, goal = intake.goal, "set water goal");
        Ok(intake)
    }

    fn save(&self, intake: &WaterIntake) -> Result<(), StoreError> {
        let key = StorageKey::water(&intake.user_id, intake.date);
        self.ctx.store.save_document(&key, intake)
    }

    /// Goal of the latest stored day before `day`, else the default.
    fn goal_before(&self, user_id: &str, day: NaiveDate) -> Result<u32, StoreError> {
        let previous = self
            .ctx
            .store
            .keys_with_prefix(&StorageKey::water_prefix(user_id))?
            .iter()
            .filter_map(|key| StorageKey::water_day(user_id, key))
            .filter(|stored| *stored < day)
            .max();

        let goal = match previous {
            Some(previous) => self
                .ctx
                .store
                .load_document::<WaterIntake>(&StorageKey::water(user_id, previous))?
                .map(|intake| intake.goal)
                .filter(|goal| *goal > 0),
            None => None,
        };
        Ok(goal.unwrap_or(self.ctx.settings.default_water_goal))
    }
}

/// Id for a day's record: epoch millis of its local midnight, so repeated
/// reads of an unsaved day agree.
fn day_id(day: NaiveDate) -> String {
    let midnight = day.and_time(NaiveTime::MIN);
    let millis = Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|start| start.timestamp_millis())
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight).timestamp_millis());
    millis.to_string()
}
