use std::sync::Arc;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{TvType, UserProfile},
    services::{load_profile, UserLocks},
};

/// Subscription settings, the mutable slice of a profile exposed to clients
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub tv_type: Vec<TvType>,
    pub repeat_choice: bool,
    pub enable_notification: bool,
    pub time_notification: i64,
}

impl From<&UserProfile> for Settings {
    fn from(profile: &UserProfile) -> Self {
        Self {
            tv_type: profile.tv_types.clone(),
            repeat_choice: profile.repeat_choice,
            enable_notification: profile.enable_notification,
            time_notification: profile.time_notification_ms,
        }
    }
}

/// Subscription request from the client app
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_birth_year: Option<i32>,
    pub user_gender: Option<String>,
    pub private_key: Option<String>,
}

/// Subscription lifecycle and settings
pub struct UserService {
    store: Arc<dyn ProfileStore>,
    locks: Arc<UserLocks>,
}

impl UserService {
    pub fn new(store: Arc<dyn ProfileStore>, locks: Arc<UserLocks>) -> Self {
        Self { store, locks }
    }

    /// Subscribes a user, or refreshes the push key of an existing one.
    ///
    /// Returns the settings and whether the user was already subscribed.
    pub async fn subscribe(&self, request: SubscribeRequest) -> AppResult<(Settings, bool)> {
        if request.user_id.trim().is_empty() {
            return Err(AppError::InvalidInput("empty user id".to_string()));
        }
        let _guard = self.locks.lock(&request.user_id).await;

        if let Some(mut existing) = self.store.profile(&request.user_id).await? {
            if request.private_key.is_some() {
                existing.push_key = request.private_key;
            }
            let settings = Settings::from(&existing);
            self.store.put_profile(existing).await?;
            tracing::info!(user_id = %request.user_id, "User already subscribed");
            return Ok((settings, true));
        }

        let mut profile = UserProfile::new(&request.user_id);
        profile.name = request.user_name;
        profile.birth_year = request.user_birth_year;
        profile.gender = request.user_gender;
        profile.push_key = request.private_key;
        let settings = Settings::from(&profile);
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %request.user_id, "User subscribed");
        Ok((settings, false))
    }

    /// Unsubscribes a user, removing the profile
    pub async fn unsubscribe(&self, user_id: &str) -> AppResult<()> {
        let _guard = self.locks.lock(user_id).await;
        if !self.store.delete_profile(user_id).await? {
            return Err(AppError::NotFound(format!(
                "{} is not subscribed",
                user_id
            )));
        }
        tracing::info!(user_id = %user_id, "User unsubscribed");
        Ok(())
    }

    pub async fn settings(&self, user_id: &str) -> AppResult<Settings> {
        let profile = load_profile(&self.store, user_id).await?;
        Ok(Settings::from(&profile))
    }

    /// Replaces the user's settings wholesale
    pub async fn update_settings(&self, user_id: &str, settings: Settings) -> AppResult<Settings> {
        if settings.tv_type.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one TV source type is required".to_string(),
            ));
        }
        // Milliseconds since midnight; anything past a day is nonsense.
        if !(0..=86_400_000).contains(&settings.time_notification) {
            return Err(AppError::InvalidInput(format!(
                "{} is not a valid notification time",
                settings.time_notification
            )));
        }

        let _guard = self.locks.lock(user_id).await;
        let mut profile = load_profile(&self.store, user_id).await?;
        profile.tv_types = settings.tv_type.clone();
        profile.repeat_choice = settings.repeat_choice;
        profile.enable_notification = settings.enable_notification;
        profile.time_notification_ms = settings.time_notification;
        self.store.put_profile(profile).await?;

        tracing::info!(user_id = %user_id, "Settings updated");
        Ok(settings)
    }
}
