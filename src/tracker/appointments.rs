use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::non_blank;
use super::TrackerContext;
use crate::error::StoreError;
use crate::records::dates::parse_timestamp;
use crate::records::Appointment;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentForm {
    pub doctor_name: String,
    pub specialty: String,
    /// `yyyy-MM-dd` or RFC 3339
    pub date: String,
    pub time: String,
    pub location: String,
    pub notes: String,
}

/// Appointments split around the current instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSchedule {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

impl AppointmentSchedule {
    pub fn partition(appointments: Vec<Appointment>, now: DateTime<Utc>) -> Self {
        let (upcoming, past): (Vec<_>, Vec<_>) =
            appointments.into_iter().partition(|a| a.is_upcoming(now));
        AppointmentSchedule { upcoming, past }
    }
}

#[derive(Debug, Clone)]
pub struct AppointmentManager {
    ctx: TrackerContext,
}

impl AppointmentManager {
    pub fn new(ctx: TrackerContext) -> Self {
        AppointmentManager { ctx }
    }

    /// Ascending by date.
    pub fn list(&self, user_id: &str) -> Result<Vec<Appointment>, StoreError> {
        let mut appointments: Vec<Appointment> = self.ctx.store.load(user_id)?;
        sort_by_date(&mut appointments);
        Ok(appointments)
    }

    /// Book an appointment; `None` when doctor, date or time is missing or
    /// the date can't be read.
    pub fn schedule(
        &self,
        user_id: &str,
        form: &AppointmentForm,
    ) -> Result<Option<Appointment>, StoreError> {
        let (Some(doctor_name), Some(date), Some(time)) = (
            non_blank(&form.doctor_name),
            parse_timestamp(&form.date),
            non_blank(&form.time),
        ) else {
            debug!(user_id, "appointment form incomplete, not saved");
            return Ok(None);
        };

        let appointment = Appointment {
            id: self.ctx.next_id(),
            user_id: user_id.to_string(),
            doctor_name,
            specialty: form.specialty.trim().to_string(),
            date,
            time,
            location: form.location.trim().to_string(),
            notes: non_blank(&form.notes),
        };

        let mut appointments = self.list(user_id)?;
        appointments.push(appointment.clone());
        self.save_sorted(user_id, appointments)?;

        info!(user_id, appointment_id = %appointment.id, "scheduled appointment");
        Ok(Some(appointment))
    }

    pub fn upcoming_and_past(&self, user_id: &str) -> Result<AppointmentSchedule, StoreError> {
        Ok(AppointmentSchedule::partition(
            self.list(user_id)?,
            self.ctx.now_utc(),
        ))
    }

    pub fn next_upcoming(&self, user_id: &str) -> Result<Option<Appointment>, StoreError> {
        Ok(self.upcoming_and_past(user_id)?.upcoming.into_iter().next())
    }

    pub fn delete(&self, user_id: &str, appointment_id: &str) -> Result<bool, StoreError> {
        self.ctx.store.remove::<Appointment>(user_id, appointment_id)
    }

    fn save_sorted(&self, user_id: &str, mut appointments: Vec<Appointment>) -> Result<(), StoreError> {
        sort_by_date(&mut appointments);
        self.ctx.store.save(user_id, &appointments)
    }
}

fn sort_by_date(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| a.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::test_support::tracker;
    use pretty_assertions::assert_eq;

    fn form(doctor: &str, date: &str) -> AppointmentForm {
        AppointmentForm {
            doctor_name: doctor.to_string(),
            specialty: "General".to_string(),
            date: date.to_string(),
            time: "10:00".to_string(),
            location: "Main St Clinic".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_saves_keep_ascending_order() {
        let (_, tracker) = tracker();
        let appointments = tracker.appointments();
        for (doctor, date) in [
            ("Dr. March", "2024-03-20"),
            ("Dr. January", "2024-01-15"),
            ("Dr. June", "2024-06-01"),
            ("Dr. February", "2024-02-02"),
        ] {
            appointments.schedule("u1", &form(doctor, date)).unwrap().unwrap();
        }

        let doctors: Vec<String> = appointments
            .list("u1")
            .unwrap()
            .into_iter()
            .map(|a| a.doctor_name)
            .collect();
        assert_eq!(doctors, vec!["Dr. January", "Dr. February", "Dr. March", "Dr. June"]);
    }

    #[test]
    fn test_required_fields() {
        let (_, tracker) = tracker();
        let appointments = tracker.appointments();
        assert_eq!(appointments.schedule("u1", &form("", "2024-04-01")).unwrap(), None);
        assert_eq!(appointments.schedule("u1", &form("Dr. Lee", "")).unwrap(), None);
        assert_eq!(appointments.schedule("u1", &form("Dr. Lee", "soon")).unwrap(), None);
        let no_time = AppointmentForm { time: String::new(), ..form("Dr. Lee", "2024-04-01") };
        assert_eq!(appointments.schedule("u1", &no_time).unwrap(), None);
        assert!(appointments.list("u1").unwrap().is_empty());
    }

    #[test]
    fn test_partition_covers_everything_once() {
        let (_, tracker) = tracker();
        let appointments = tracker.appointments();
        for date in ["2024-01-01", "2024-03-09", "2024-03-11", "2025-01-01", "2023-12-31"] {
            appointments.schedule("u1", &form("Dr. Lee", date)).unwrap();
        }

        let now = tracker.context().now_utc();
        let all = appointments.list("u1").unwrap();
        let schedule = appointments.upcoming_and_past("u1").unwrap();

        assert_eq!(schedule.upcoming.len() + schedule.past.len(), all.len());
        for appointment in &all {
            let in_upcoming = schedule.upcoming.contains(appointment);
            let in_past = schedule.past.contains(appointment);
            assert!(in_upcoming != in_past);
            assert_eq!(in_upcoming, appointment.date >= now);
        }
        assert_eq!(schedule.upcoming.len(), 2);
        assert_eq!(
            appointments.next_upcoming("u1").unwrap().map(|a| a.date),
            parse_timestamp("2024-03-11")
        );
    }

    #[test]
    fn test_delete() {
        let (_, tracker) = tracker();
        let appointments = tracker.appointments();
        let first = appointments.schedule("u1", &form("Dr. A", "2024-04-01")).unwrap().unwrap();
        let second = appointments.schedule("u1", &form("Dr. B", "2024-05-01")).unwrap().unwrap();

        assert!(appointments.delete("u1", &first.id).unwrap());
        assert_eq!(appointments.list("u1").unwrap(), vec![second]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    const MAX_MILLIS: i64 = 4_102_444_800_000;

    fn appointment(index: usize, millis: i64) -> Appointment {
        Appointment {
            id: index.to_string(),
            user_id: "u1".to_string(),
            doctor_name: format!("Dr. {}", index),
            specialty: String::new(),
            date: Utc.timestamp_millis_opt(millis).unwrap(),
            time: "10:00".to_string(),
            location: String::new(),
            notes: None,
        }
    }

    proptest! {
        /// Each appointment lands in exactly one of upcoming/past
        #[test]
        fn partition_is_exact(
            dates in proptest::collection::vec(0..MAX_MILLIS, 0..30),
            now_millis in 0..MAX_MILLIS
        ) {
            let now = Utc.timestamp_millis_opt(now_millis).unwrap();
            let all: Vec<Appointment> = dates
                .iter()
                .enumerate()
                .map(|(i, millis)| appointment(i, *millis))
                .collect();

            let schedule = AppointmentSchedule::partition(all.clone(), now);
            prop_assert_eq!(schedule.upcoming.len() + schedule.past.len(), all.len());
            prop_assert!(schedule.upcoming.iter().all(|a| a.date >= now));
            prop_assert!(schedule.past.iter().all(|a| a.date < now));
            for appointment in &all {
                let in_upcoming = schedule.upcoming.iter().any(|a| a.id == appointment.id);
                let in_past = schedule.past.iter().any(|a| a.id == appointment.id);
                prop_assert!(in_upcoming != in_past);
            }
        }

        /// Stored order is ascending by date regardless of booking order
        #[test]
        fn sorted_after_any_insert_order(
            dates in proptest::collection::vec(0..MAX_MILLIS, 0..30)
        ) {
            let mut appointments: Vec<Appointment> = dates
                .iter()
                .enumerate()
                .map(|(i, millis)| appointment(i, *millis))
                .collect();
            sort_by_date(&mut appointments);
            prop_assert!(appointments.windows(2).all(|pair| pair[0].date <= pair[1].date));
        }
    }
}
