pub mod locks;
pub mod notify;
pub mod pager;
pub mod proposal;
pub mod providers;
pub mod taste;
pub mod users;

pub use locks::UserLocks;
pub use proposal::{FallbackStrategy, LeadingFallback, ProposalSelector, UniformFallback};
pub use taste::TasteService;
pub use users::UserService;

use std::sync::Arc;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::UserProfile,
};

/// Loads a profile or fails with the canonical "not subscribed" error
pub(crate) async fn load_profile(
    store: &Arc<dyn ProfileStore>,
    user_id: &str,
) -> AppResult<UserProfile> {
    store
        .profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} is not subscribed", user_id)))
}
