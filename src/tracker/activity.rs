use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::{non_blank, parse_int};
use super::TrackerContext;
use crate::clock::local_day;
use crate::error::StoreError;
use crate::records::Activity;

/// Calories burned per minute for the known activity types.
pub const CALORIE_RATES: [(&str, i64); 8] = [
    ("Running", 10),
    ("Walking", 4),
    ("Cycling", 8),
    ("Swimming", 11),
    ("Yoga", 3),
    ("Gym Workout", 7),
    ("Dancing", 6),
    ("Sports", 8),
];

pub fn calorie_rate(activity_type: &str) -> Option<i64> {
    CALORIE_RATES
        .iter()
        .find(|(name, _)| *name == activity_type)
        .map(|(_, rate)| *rate)
}

/// `rate * duration` for a known type, 0 otherwise. Saturates at the `i64` bounds.
pub fn estimate_calories(activity_type: &str, duration: i64) -> i64 {
    calorie_rate(activity_type).map_or(0, |rate| rate.saturating_mul(duration))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityForm {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub duration: String,
    pub calories: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotals {
    pub minutes: i64,
    pub calories: i64,
}

#[derive(Debug, Clone)]
pub struct ActivityManager {
    ctx: TrackerContext,
}

impl ActivityManager {
    pub fn new(ctx: TrackerContext) -> Self {
        ActivityManager { ctx }
    }

    /// Most recent first.
    pub fn list(&self, user_id: &str) -> Result<Vec<Activity>, StoreError> {
        self.ctx.store.load(user_id)
    }

    /// Log an activity; `None` when the type or duration is missing.
    ///
    /// Explicit non-zero calories win over the per-type estimate.
    pub fn log(&self, user_id: &str, form: &ActivityForm) -> Result<Option<Activity>, StoreError> {
        let (Some(activity_type), Some(duration)) =
            (non_blank(&form.activity_type), parse_int(&form.duration))
        else {
            debug!(user_id, "activity form incomplete, not saved");
            return Ok(None);
        };

        let calories = match parse_int(&form.calories) {
            Some(explicit) if explicit != 0 => explicit,
            _ => estimate_calories(&activity_type, duration),
        };

        let activity = Activity {
            id: self.ctx.next_id(),
            user_id: user_id.to_string(),
            date: self.ctx.now_utc(),
            activity_type,
            duration,
            calories: Some(calories),
            notes: non_blank(&form.notes),
        };

        let mut activities = self.list(user_id)?;
        activities.insert(0, activity.clone());
        self.ctx.store.save(user_id, &activities)?;

        info!(
            user_id,
            activity_id = %activity.id,
            activity_type = %activity.activity_type,
            calories,
            "logged activity"
        );
        Ok(Some(activity))
    }

    pub fn totals_on(&self, user_id: &str, day: NaiveDate) -> Result<ActivityTotals, StoreError> {
        Ok(self
            .list(user_id)?
            .iter()
            .filter(|a| local_day(a.date) == day)
            .fold(ActivityTotals::default(), |totals, a| ActivityTotals {
                minutes: totals.minutes.saturating_add(a.duration),
                calories: totals.calories.saturating_add(a.calories.unwrap_or(0)),
            }))
    }

    pub fn totals_today(&self, user_id: &str) -> Result<ActivityTotals, StoreError> {
        self.totals_on(user_id, self.ctx.clock.today())
    }

    pub fn delete(&self, user_id: &str, activity_id: &str) -> Result<bool, StoreError> {
        self.ctx.store.remove::<Activity>(user_id, activity_id)
    }
}
