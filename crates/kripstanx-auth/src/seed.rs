//! Startup provisioning of configured accounts.

use tracing::info;

use kripstanx_core::config::SeedUser;
use kripstanx_core::error::AppError;
use kripstanx_database::UserRepository;
use kripstanx_entity::UserRecord;

use crate::password::PasswordHasher;

/// Creates every configured account that does not exist yet.
///
/// Existing accounts are left untouched, including their password.
/// Returns the number of accounts created.
pub async fn provision_seed_users(
    users: &dyn UserRepository,
    hasher: &PasswordHasher,
    seeds: &[SeedUser],
) -> Result<u32, AppError> {
    let mut created = 0u32;
    for seed in seeds {
        if users.find_by_username(&seed.username).await?.is_some() {
            continue;
        }
        let hash = hasher.hash_password(&seed.password)?;
        let user = UserRecord::new(seed.username.clone(), hash, seed.authorities.clone());
        users.save(&user).await?;
        info!(username = %seed.username, "Provisioned seed user");
        created += 1;
    }
    Ok(created)
}
