use serde::{Deserialize, Serialize};
use tracing::info;

use super::input::{non_blank, parse_float, parse_int};
use super::TrackerContext;
use crate::error::StoreError;
use crate::records::{Gender, User};
use crate::storage::StorageKey;

pub const DEMO_USER_ID: &str = "demo-user";

/// Editable profile fields, as entered. Blank numeric fields clear the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub height: String,
    pub weight: String,
}

fn parse_gender(text: &str) -> Option<Gender> {
    match text.trim().to_ascii_lowercase().as_str() {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        "other" => Some(Gender::Other),
        _ => None,
    }
}

/// The shared `users` directory.
#[derive(Debug, Clone)]
pub struct ProfileManager {
    ctx: TrackerContext,
}

impl ProfileManager {
    pub fn new(ctx: TrackerContext) -> Self {
        ProfileManager { ctx }
    }

    pub fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self
            .ctx
            .store
            .load_document(&StorageKey::users())?
            .unwrap_or_default())
    }

    pub fn find(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.list()?.into_iter().find(|u| u.id == user_id))
    }

    /// Insert the demo account when the directory is empty.
    pub fn seed_demo_user(&self) -> Result<bool, StoreError> {
        if !self.list()?.is_empty() {
            return Ok(false);
        }
        let demo = User {
            id: DEMO_USER_ID.to_string(),
            email: "demo@health.com".to_string(),
            password: Some("demo123".to_string()),
            name: "Demo User".to_string(),
            age: None,
            gender: None,
            height: None,
            weight: None,
        };
        self.ctx.store.save_document(&StorageKey::users(), &[demo])?;
        info!(user_id = DEMO_USER_ID, "seeded demo user");
        Ok(true)
    }

    /// Replace the profile fields of `user_id`. The id, email and password
    /// are never touched; a blank name keeps the current one.
    pub fn update_profile(&self, user_id: &str, form: &ProfileForm) -> Result<Option<User>, StoreError> {
        let mut users = self.list()?;
        let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(None);
        };

        if let Some(name) = non_blank(&form.name) {
            user.name = name;
        }
        user.age = parse_int(&form.age).and_then(|age| u32::try_from(age).ok());
        user.gender = parse_gender(&form.gender);
        user.height = parse_float(&form.height);
        user.weight = parse_float(&form.weight);

        let updated = user.clone();
        self.ctx.store.save_document(&StorageKey::users(), &users)?;
        info!(user_id, "updated profile");
        Ok(Some(updated))
    }
}
