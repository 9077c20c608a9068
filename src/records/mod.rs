//! Typed health records
//!
//! Each record type owns its stored JSON shape, including how its date
//! fields are written as text and read back.

pub mod dates;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::storage::EntityKind;

/// A record kept in a per-user collection (`{kind}_{userId}`).
pub trait StoredRecord: Serialize + DeserializeOwned + Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Entry of the `users` directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Owned by the sign-in flow; carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>, // cm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>, // kg
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

impl User {
    /// Body mass index from height (cm) and weight (kg), when both are known.
    pub fn bmi(&self) -> Option<f64> {
        let height_m = self.height? / 100.0;
        let weight = self.weight?;
        if height_m <= 0.0 {
            return None;
        }
        Some(weight / (height_m * height_m))
    }

    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }
}

/// One vitals reading; every measurement is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetric {
    pub id: String,
    pub user_id: String,
    #[serde(with = "dates::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure_systolic: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure_diastolic: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl StoredRecord for HealthMetric {
    const KIND: EntityKind = EntityKind::HealthMetrics;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseTaken {
    pub date: NaiveDate,
    #[serde(with = "dates::clock_time")]
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub time: Vec<String>, // scheduled times, as entered
    #[serde(with = "dates::timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(
        default,
        with = "dates::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub taken: Vec<DoseTaken>, // append-only
}

impl Medicine {
    pub fn is_taken_on(&self, day: NaiveDate) -> bool {
        self.taken.iter().any(|dose| dose.date == day)
    }

    pub fn doses_on(&self, day: NaiveDate) -> usize {
        self.taken.iter().filter(|dose| dose.date == day).count()
    }
}

impl StoredRecord for Medicine {
    const KIND: EntityKind = EntityKind::Medicines;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydrationStatus {
    GoalReached,
    Halfway,
    JustStarted,
}

/// Water intake for one user on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterIntake {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub glasses: u32,
    pub goal: u32,
}

impl WaterIntake {
    /// Progress toward the goal, capped at 100.
    pub fn percentage(&self) -> f64 {
        if self.goal == 0 {
            return 0.0;
        }
        (f64::from(self.glasses) / f64::from(self.goal) * 100.0).min(100.0)
    }

    pub fn status(&self) -> HydrationStatus {
        let percentage = self.percentage();
        if percentage >= 100.0 {
            HydrationStatus::GoalReached
        } else if percentage >= 50.0 {
            HydrationStatus::Halfway
        } else {
            HydrationStatus::JustStarted
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub user_id: String,
    #[serde(with = "dates::timestamp")]
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub duration: i64, // minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StoredRecord for Activity {
    const KIND: EntityKind = EntityKind::Activities;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub doctor_name: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(with = "dates::timestamp")]
    pub date: DateTime<Utc>,
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.date >= now
    }
}

impl StoredRecord for Appointment {
    const KIND: EntityKind = EntityKind::Appointments;

    fn id(&self) -> &str {
        &self.id
    }
}
