use crate::model::user::UserProfile;
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Serialized profile blob per user id. Convenience only; the directory stays authoritative.
pub static PROFILE_CACHE: Lazy<Cache<String, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

pub async fn store(profile: &UserProfile) {
    match serde_json::to_string(profile) {
        Ok(blob) => PROFILE_CACHE.insert(profile.id.clone(), blob).await,
        Err(e) => tracing::warn!(error = %e, user_id = %profile.id, "Profile not cached"),
    }
}

/// A blob that no longer deserializes is dropped and treated as a miss.
pub async fn load(user_id: &str) -> Option<UserProfile> {
    let blob = PROFILE_CACHE.get(user_id).await?;
    match serde_json::from_str(&blob) {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(error = %e, user_id, "Discarding unreadable cached profile");
            PROFILE_CACHE.invalidate(user_id).await;
            None
        }
    }
}

pub async fn remove(user_id: &str) {
    PROFILE_CACHE.invalidate(user_id).await;
}
