use serde::{Deserialize, Serialize};
use tracing::info;

use super::input::{parse_float, parse_i32};
use super::TrackerContext;
use crate::error::StoreError;
use crate::records::HealthMetric;

/// Raw text of a vitals reading, as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricForm {
    pub weight: String,
    pub blood_pressure_systolic: String,
    pub blood_pressure_diastolic: String,
    pub heart_rate: String,
    pub blood_sugar: String,
    pub temperature: String,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    ctx: TrackerContext,
}

impl MetricsManager {
    pub fn new(ctx: TrackerContext) -> Self {
        MetricsManager { ctx }
    }

    /// Most recent first.
    pub fn list(&self, user_id: &str) -> Result<Vec<HealthMetric>, StoreError> {
        self.ctx.store.load(user_id)
    }

    pub fn latest(&self, user_id: &str) -> Result<Option<HealthMetric>, StoreError> {
        Ok(self.list(user_id)?.into_iter().next())
    }

    /// Stamp the reading with the current time and prepend it.
    ///
    /// Every field is optional, so even an empty form produces a record.
    pub fn record(&self, user_id: &str, form: &MetricForm) -> Result<HealthMetric, StoreError> {
        let metric = HealthMetric {
            id: self.ctx.next_id(),
            user_id: user_id.to_string(),
            date: self.ctx.now_utc(),
            weight: parse_float(&form.weight),
            blood_pressure_systolic: parse_i32(&form.blood_pressure_systolic),
            blood_pressure_diastolic: parse_i32(&form.blood_pressure_diastolic),
            heart_rate: parse_i32(&form.heart_rate),
            blood_sugar: parse_float(&form.blood_sugar),
            temperature: parse_float(&form.temperature),
        };

        let mut metrics = self.list(user_id)?;
        metrics.insert(0, metric.clone());
        self.ctx.store.save(user_id, &metrics)?;

        info!(user_id, metric_id = %metric.id, "recorded health metric");
        Ok(metric)
    }

    pub fn delete(&self, user_id: &str, metric_id: &str) -> Result<bool, StoreError> {
        self.ctx.store.remove::<HealthMetric>(user_id, metric_id)
    }
}
