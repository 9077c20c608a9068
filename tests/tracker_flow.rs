use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use healthlog::clock::FixedClock;
use healthlog::config::TrackingConfig;
use healthlog::tracker::{ActivityForm, AppointmentForm, MedicineForm, MetricForm, ProfileForm};
use healthlog::{FileStore, KeyValueStore, Tracker};

fn open(dir: &TempDir, day: u32, hour: u32) -> Tracker {
    let backend = Arc::new(FileStore::new(dir.path()).unwrap());
    let now = Local.with_ymd_and_hms(2024, 5, day, hour, 15, 0).unwrap();
    Tracker::new(backend, Arc::new(FixedClock::new(now)), TrackingConfig::default())
}

#[test]
fn test_day_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let tracker = open(&dir, 14, 8);
    tracker.profiles().seed_demo_user().unwrap();
    let user = "demo-user";

    let metric = tracker
        .metrics()
        .record(
            user,
            &MetricForm {
                weight: "70.2".to_string(),
                blood_pressure_systolic: "118".to_string(),
                blood_pressure_diastolic: "76".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    let medicine = tracker
        .medicines()
        .add(
            user,
            &MedicineForm {
                name: "Metformin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "Twice daily".to_string(),
                time: "08:00, 20:00".to_string(),
                notes: "with food".to_string(),
            },
        )
        .unwrap()
        .unwrap();
    tracker.medicines().mark_taken(user, &medicine.id).unwrap();
    tracker.water().set_goal(user, 10).unwrap();
    tracker.water().adjust(user, 3).unwrap();
    tracker
        .activities()
        .log(
            user,
            &ActivityForm {
                activity_type: "Walking".to_string(),
                duration: "45".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    tracker
        .appointments()
        .schedule(
            user,
            &AppointmentForm {
                doctor_name: "Dr. Haddad".to_string(),
                specialty: "Endocrinology".to_string(),
                date: "2024-05-20".to_string(),
                time: "09:30".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    drop(tracker);

    let reopened = open(&dir, 14, 19);
    assert_eq!(reopened.metrics().list(user).unwrap(), vec![metric]);

    let medicines = reopened.medicines().list(user).unwrap();
    assert_eq!(medicines.len(), 1);
    assert_eq!(medicines[0].time, vec!["08:00", "20:00"]);
    assert!(reopened.medicines().is_taken_today(&medicines[0]));

    let summary = reopened.daily_summary(user).unwrap();
    assert_eq!(summary.water.glasses, 3);
    assert_eq!(summary.water.goal, 10);
    assert_eq!(summary.activity.minutes, 45);
    assert_eq!(summary.activity.calories, 180);
    assert_eq!(summary.medicines_taken, 1);
    assert_eq!(
        summary.next_appointment.map(|a| a.specialty),
        Some("Endocrinology".to_string())
    );
}

#[test]
fn test_next_day_starts_fresh_with_last_goal() {
    let dir = TempDir::new().unwrap();

    let tuesday = open(&dir, 14, 21);
    tuesday.water().set_goal("u1", 6).unwrap();
    tuesday.water().adjust("u1", 6).unwrap();

    let wednesday = open(&dir, 15, 7);
    let fresh = wednesday.water().today("u1").unwrap();
    assert_eq!(fresh.date, NaiveDate::from_ymd_opt(2024, 5, 15).unwrap());
    assert_eq!(fresh.glasses, 0);
    assert_eq!(fresh.goal, 6);

    let store = FileStore::new(dir.path()).unwrap();
    assert_eq!(
        store.keys_with_prefix("water_u1_").unwrap(),
        vec!["water_u1_2024-05-14".to_string()]
    );
}

#[test]
fn test_unusual_user_ids_stay_apart() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir, 14, 8);

    for user in ["a/b", "a b", "a%2Fb"] {
        tracker
            .activities()
            .log(
                user,
                &ActivityForm {
                    activity_type: "Yoga".to_string(),
                    duration: "10".to_string(),
                    notes: user.to_string(),
                    ..Default::default()
                },
            )
            .unwrap();
    }

    let reopened = open(&dir, 14, 9);
    for user in ["a/b", "a b", "a%2Fb"] {
        let activities = reopened.activities().list(user).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].notes.as_deref(), Some(user));
    }
}

#[test]
fn test_profile_edit_persists() {
    let dir = TempDir::new().unwrap();
    let tracker = open(&dir, 14, 8);
    tracker.profiles().seed_demo_user().unwrap();
    tracker
        .profiles()
        .update_profile(
            "demo-user",
            &ProfileForm {
                name: "Sam".to_string(),
                age: "41".to_string(),
                ..Default::default()
            },
        )
        .unwrap();

    let reopened = open(&dir, 14, 9);
    assert!(!reopened.profiles().seed_demo_user().unwrap());
    let user = reopened.profiles().find("demo-user").unwrap().unwrap();
    assert_eq!(user.name, "Sam");
    assert_eq!(user.age, Some(41));
    assert_eq!(user.email, "demo@health.com");
}
