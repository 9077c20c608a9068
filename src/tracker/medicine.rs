use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::non_blank;
use super::TrackerContext;
use crate::error::StoreError;
use crate::records::{DoseTaken, Medicine};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicineForm {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    /// Comma-separated times, e.g. `"08:00, 20:00"`
    pub time: String,
    pub notes: String,
}

/// Result of a guarded mark-as-taken.
#[derive(Debug, Clone, PartialEq)]
pub enum DoseOutcome {
    Recorded(Medicine),
    AlreadyTaken(Medicine),
    NotFound,
}

#[derive(Debug, Clone)]
pub struct MedicineManager {
    ctx: TrackerContext,
}

impl MedicineManager {
    pub fn new(ctx: TrackerContext) -> Self {
        MedicineManager { ctx }
    }

    pub fn list(&self, user_id: &str) -> Result<Vec<Medicine>, StoreError> {
        self.ctx.store.load(user_id)
    }

    /// Append a new medicine; `None` when name, dosage or frequency is blank.
    pub fn add(&self, user_id: &str, form: &MedicineForm) -> Result<Option<Medicine>, StoreError> {
        let (Some(name), Some(dosage), Some(frequency)) = (
            non_blank(&form.name),
            non_blank(&form.dosage),
            non_blank(&form.frequency),
        ) else {
            debug!(user_id, "medicine form incomplete, not saved");
            return Ok(None);
        };

        let medicine = Medicine {
            id: self.ctx.next_id(),
            user_id: user_id.to_string(),
            name,
            dosage,
            frequency,
            time: split_times(&form.time),
            start_date: self.ctx.now_utc(),
            end_date: None,
            notes: non_blank(&form.notes),
            taken: Vec::new(),
        };

        let mut medicines = self.list(user_id)?;
        medicines.push(medicine.clone());
        self.ctx.store.save(user_id, &medicines)?;

        info!(user_id, medicine_id = %medicine.id, name = %medicine.name, "added medicine");
        Ok(Some(medicine))
    }

    /// Append a dose for today at the current time.
    ///
    /// Repeated calls on one day each add an entry; see
    /// [`mark_taken_once`](Self::mark_taken_once) for the guarded form.
    pub fn mark_taken(
        &self,
        user_id: &str,
        medicine_id: &str,
    ) -> Result<Option<Medicine>, StoreError> {
        let mut medicines = self.list(user_id)?;
        let Some(medicine) = medicines.iter_mut().find(|m| m.id == medicine_id) else {
            return Ok(None);
        };

        let now = self.ctx.clock.now();
        medicine.taken.push(DoseTaken {
            date: now.date_naive(),
            time: NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN),
        });
        let updated = medicine.clone();
        self.ctx.store.save(user_id, &medicines)?;

        info!(user_id, medicine_id, doses = updated.taken.len(), "marked medicine taken");
        Ok(Some(updated))
    }

    /// Record a dose unless one is already logged for today.
    pub fn mark_taken_once(
        &self,
        user_id: &str,
        medicine_id: &str,
    ) -> Result<DoseOutcome, StoreError> {
        let today = self.ctx.clock.today();
        let current = self
            .list(user_id)?
            .into_iter()
            .find(|m| m.id == medicine_id);

        match current {
            None => Ok(DoseOutcome::NotFound),
            Some(medicine) if medicine.is_taken_on(today) => Ok(DoseOutcome::AlreadyTaken(medicine)),
            Some(_) => Ok(self
                .mark_taken(user_id, medicine_id)?
                .map_or(DoseOutcome::NotFound, DoseOutcome::Recorded)),
        }
    }

    pub fn is_taken_today(&self, medicine: &Medicine) -> bool {
        medicine.is_taken_on(self.ctx.clock.today())
    }

    pub fn delete(&self, user_id: &str, medicine_id: &str) -> Result<bool, StoreError> {
        self.ctx.store.remove::<Medicine>(user_id, medicine_id)
    }
}

fn split_times(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
