use chrono::NaiveDate;
use std::fmt;

/// Per-user collections kept in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    HealthMetrics,
    Medicines,
    Water,
    Activities,
    Appointments,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::HealthMetrics => "healthMetrics",
            EntityKind::Medicines => "medicines",
            EntityKind::Water => "water",
            EntityKind::Activities => "activities",
            EntityKind::Appointments => "appointments",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A key in the shared store namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Directory of all accounts.
    pub fn users() -> Self {
        StorageKey("users".to_string())
    }

    /// `{kind}_{userId}`
    pub fn collection(kind: EntityKind, user_id: &str) -> Self {
        StorageKey(format!("{}_{}", kind.prefix(), user_id))
    }

    /// `water_{userId}_{yyyy-MM-dd}`
    pub fn water(user_id: &str, day: NaiveDate) -> Self {
        StorageKey(format!(
            "{}{}",
            Self::water_prefix(user_id),
            day.format("%Y-%m-%d")
        ))
    }

    pub fn water_prefix(user_id: &str) -> String {
        format!("{}_{}_", EntityKind::Water.prefix(), user_id)
    }

    /// Day encoded in a water key belonging to `user_id`.
    ///
    /// The remainder after the prefix must be exactly one date, so a user
    /// whose id extends another's (`a` vs `a_b`) never matches.
    pub fn water_day(user_id: &str, key: &str) -> Option<NaiveDate> {
        let rest = key.strip_prefix(&Self::water_prefix(user_id))?;
        NaiveDate::parse_from_str(rest, "%Y-%m-%d").ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(StorageKey::users().as_str(), "users");
        assert_eq!(
            StorageKey::collection(EntityKind::HealthMetrics, "demo-user").as_str(),
            "healthMetrics_demo-user"
        );
        assert_eq!(
            StorageKey::collection(EntityKind::Appointments, "u1").to_string(),
            "appointments_u1"
        );
        assert_eq!(StorageKey::water("u1", day).as_str(), "water_u1_2024-03-09");
    }

    #[test]
    fn test_water_day_only_matches_owner() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let key = StorageKey::water("a_b", day);

        assert_eq!(StorageKey::water_day("a_b", key.as_str()), Some(day));
        assert_eq!(StorageKey::water_day("a", key.as_str()), None);
        assert_eq!(StorageKey::water_day("a", "medicines_a"), None);
    }
}
