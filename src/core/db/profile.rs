use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::core::lifecycle::Role;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(skip)]
    pub(crate) _guard: (),
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// The signed-in identity a transition is requested on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl From<&Profile> for Actor {
    fn from(profile: &Profile) -> Self {
        Actor {
            id: profile.id,
            role: profile.role,
        }
    }
}

/// Yields the caller's identity. Credentials are checked before this point.
pub trait IdentityProvider {
    fn current_actor(&self) -> Actor;
}

/// A profile that has already been signed in.
#[derive(Debug, Clone)]
pub struct SignedInProfile {
    profile: Profile,
}

impl SignedInProfile {
    pub async fn sign_in<R: ProfileRepository>(repo: &R, email: &str) -> anyhow::Result<Self> {
        let profile = repo
            .get_profile_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("No profile registered for {}", email))?;
        tracing::debug!(email, role = %profile.role, "signed in");
        Ok(Self { profile })
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The name shown in the staff portal header.
    pub fn display_name(&self) -> &str {
        if self.profile.full_name.is_empty() {
            &self.profile.email
        } else {
            &self.profile.full_name
        }
    }
}

impl IdentityProvider for SignedInProfile {
    fn current_actor(&self) -> Actor {
        Actor::from(&self.profile)
    }
}

pub trait ProfileRepository {
    fn add_profile(&self, profile: &NewProfile) -> impl Future<Output = anyhow::Result<Profile>> + Send;
    fn get_profile_by_id(&self, id: Uuid) -> impl Future<Output = anyhow::Result<Option<Profile>>> + Send;
    fn get_profile_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = anyhow::Result<Option<Profile>>> + Send;
}
