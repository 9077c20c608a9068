use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ActivityTotals, Tracker};
use crate::error::StoreError;
use crate::records::{Appointment, HealthMetric, HydrationStatus, WaterIntake};

/// Overview of one user's day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub water: WaterIntake,
    pub water_percentage: f64,
    pub hydration: HydrationStatus,
    pub activity: ActivityTotals,
    pub medicines_total: usize,
    pub medicines_taken: usize,
    pub next_appointment: Option<Appointment>,
    pub latest_metric: Option<HealthMetric>,
}

impl Tracker {
    pub fn daily_summary(&self, user_id: &str) -> Result<DailySummary, StoreError> {
        let today = self.context().clock.today();
        let water = self.water().today(user_id)?;
        let medicines = self.medicines().list(user_id)?;

        Ok(DailySummary {
            date: today,
            water_percentage: water.percentage(),
            hydration: water.status(),
            water,
            activity: self.activities().totals_on(user_id, today)?,
            medicines_total: medicines.len(),
            medicines_taken: medicines.iter().filter(|m| m.is_taken_on(today)).count(),
            next_appointment: self.appointments().next_upcoming(user_id)?,
            latest_metric: self.metrics().latest(user_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::tracker::test_support::tracker;
    use crate::tracker::{ActivityForm, AppointmentForm, MedicineForm, MetricForm};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_day() {
        let (_, tracker) = tracker();
        let summary = tracker.daily_summary("u1").unwrap();

        assert_eq!(summary.water.glasses, 0);
        assert_eq!(summary.water_percentage, 0.0);
        assert_eq!(summary.activity.minutes, 0);
        assert_eq!(summary.medicines_total, 0);
        assert_eq!(summary.next_appointment, None);
        assert_eq!(summary.latest_metric, None);
    }

    #[test]
    fn test_busy_day() {
        let (_, tracker) = tracker();
        tracker.water().adjust("u1", 4).unwrap();
        tracker
            .activities()
            .log(
                "u1",
                &ActivityForm {
                    activity_type: "Swimming".to_string(),
                    duration: "20".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let medicines = tracker.medicines();
        let aspirin = medicines
            .add(
                "u1",
                &MedicineForm {
                    name: "Aspirin".to_string(),
                    dosage: "100mg".to_string(),
                    frequency: "Once daily".to_string(),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        medicines
            .add(
                "u1",
                &MedicineForm {
                    name: "Vitamin D".to_string(),
                    dosage: "1000 IU".to_string(),
                    frequency: "Once daily".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        medicines.mark_taken("u1", &aspirin.id).unwrap();
        tracker
            .appointments()
            .schedule(
                "u1",
                &AppointmentForm {
                    doctor_name: "Dr. Okafor".to_string(),
                    date: "2024-04-02".to_string(),
                    time: "14:00".to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
        let metric = tracker
            .metrics()
            .record("u1", &MetricForm { heart_rate: "68".to_string(), ..Default::default() })
            .unwrap();

        let summary = tracker.daily_summary("u1").unwrap();
        assert_eq!(summary.water_percentage, 50.0);
        assert_eq!(summary.activity.minutes, 20);
        assert_eq!(summary.activity.calories, 220);
        assert_eq!(summary.medicines_total, 2);
        assert_eq!(summary.medicines_taken, 1);
        assert_eq!(
            summary.next_appointment.map(|a| a.doctor_name),
            Some("Dr. Okafor".to_string())
        );
        assert_eq!(summary.latest_metric, Some(metric));
    }
}
