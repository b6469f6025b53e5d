//! Account flows that pair a backend call with a session update.

use tracing::instrument;

use crate::backend::{BackendClient, Credentials, ProfileUpdate, SignupRequest};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::session::{Session, SessionError, UserProfile};
use crate::storage::KeyValueStore;

/// Sign in and remember the returned profile.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials or the profile
/// slot cannot be written.
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn login<S: KeyValueStore>(
    session: &mut Session<S>,
    client: &BackendClient,
    credentials: &Credentials,
) -> Result<UserProfile> {
    let response = client.login(credentials).await?;
    remember(session, response.user)
}

/// Sign in through the administrator endpoint.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials, the account is
/// not an administrator, or the profile slot cannot be written.
#[instrument(skip_all, fields(email = %credentials.email))]
pub async fn admin_login<S: KeyValueStore>(
    session: &mut Session<S>,
    client: &BackendClient,
    credentials: &Credentials,
) -> Result<UserProfile> {
    let response = client.admin_login(credentials).await?;
    if !response.user.is_admin() {
        return Err(SessionError::NotAdmin.into());
    }
    remember(session, response.user)
}

/// Register and sign in.
///
/// # Errors
///
/// Returns an error if the profile fields are invalid, the backend rejects the
/// registration, or the profile slot cannot be written.
#[instrument(skip_all, fields(email = %signup.profile.email))]
pub async fn signup<S: KeyValueStore>(
    session: &mut Session<S>,
    client: &BackendClient,
    signup: SignupRequest,
) -> Result<UserProfile> {
    let SignupRequest { profile, password } = signup;
    let signup = SignupRequest {
        profile: profile.validated()?,
        password,
    };
    let response = client.signup(&signup).await?;
    remember(session, response.user)
}

/// Save profile edits and merge the backend's copy into the session.
///
/// # Errors
///
/// Returns an error if no one is signed in, the age is out of range, the
/// backend rejects the update, or the profile slot cannot be written.
#[instrument(skip_all)]
pub async fn save_profile<S: KeyValueStore>(
    session: &mut Session<S>,
    client: &BackendClient,
    update: ProfileUpdate,
) -> Result<UserProfile> {
    let user_id = session.require_user()?.id.clone();
    let update = update.validated()?;
    let response = client.update_profile(&user_id, &update).await?;
    Ok(session.update_profile(response.user)?.clone())
}

/// Forget the signed-in user.
///
/// # Errors
///
/// Returns an error if the profile slot cannot be removed.
pub fn logout<S: KeyValueStore>(session: &mut Session<S>) -> Result<()> {
    session.sign_out()?;
    clear_sentry_user();
    Ok(())
}

fn remember<S: KeyValueStore>(session: &mut Session<S>, user: UserProfile) -> Result<UserProfile> {
    set_sentry_user(&user.id, Some(&user.email));
    session.sign_in(user.clone()).map_err(AppError::from)?;
    Ok(user)
}
