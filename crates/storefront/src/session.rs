//! Signed-in user and display preferences.
//!
//! The profile and theme slots are read once when a [`Session`] is loaded and
//! then passed by reference to whatever needs them. Changes go through the
//! setters here, which update the in-memory value and the slot together.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};
use zenbuy_core::{UserId, UserRole};

use crate::cart::CartStore;
use crate::storage::{KeyValueStore, StorageError, keys, read_json, write_json};

/// Errors from session-gated operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No user is signed in.
    #[error("Please sign in to continue")]
    NotSignedIn,

    /// The signed-in user is not an administrator.
    #[error("Administrator access required")]
    NotAdmin,

    /// The session slots could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A profile update could not be applied to the stored profile.
    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] serde_json::Error),
}

/// Profile of the signed-in user, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Email address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Account role. A missing or null role is a regular user.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: UserRole,
    /// Profile picture (URL or data URI).
    #[serde(default)]
    pub profile_pic: Option<String>,
    /// Flat / house number.
    #[serde(default)]
    pub flat_no: Option<String>,
    /// Street or locality.
    #[serde(default)]
    pub locality: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub pincode: Option<String>,
    /// Age in years.
    #[serde(default)]
    pub age: Option<u32>,
    /// Fields the storefront does not interpret, kept so they round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    /// Whether the user may open the admin console.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Overlay a fresher profile from the backend onto this one.
    ///
    /// Fields present in `update` replace the current ones, including
    /// explicit nulls. Fields it leaves out keep their current values.
    ///
    /// # Errors
    ///
    /// Returns an error if the overlaid profile is no longer valid, for
    /// example when `update` nulls the `id`. The profile is left unchanged.
    pub fn merge(&mut self, update: Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut fields = match serde_json::to_value(&*self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        fields.extend(update);
        *self = serde_json::from_value(Value::Object(fields))?;
        Ok(())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a stored preference. Anything unrecognised is [`Theme::Light`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("dark") {
            Self::Dark
        } else {
            Self::Light
        }
    }

    /// Slot representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Application-level state: the store handle, the signed-in user, and the theme.
#[derive(Debug, Clone)]
pub struct Session<S> {
    store: S,
    user: Option<UserProfile>,
    theme: Theme,
}

impl<S: KeyValueStore> Session<S> {
    /// Read the user and theme slots once.
    ///
    /// A missing or malformed profile (including one without an `id`) means
    /// no one is signed in.
    pub fn load(store: S) -> Self {
        let user = read_json::<UserProfile, _>(&store, keys::USER);
        let theme = match store.get(keys::THEME) {
            Ok(raw) => raw.map(|raw| Theme::parse(&raw)).unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme slot");
                Theme::default()
            }
        };

        debug!(signed_in = user.is_some(), theme = theme.as_str(), "Session loaded");
        Self { store, user, theme }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Cart operations over this session's store.
    pub const fn cart(&self) -> CartStore<&S> {
        CartStore::new(&self.store)
    }

    /// The signed-in user, if any.
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Current theme.
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// The signed-in user, or an error if no one is signed in.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if there is no user.
    pub fn require_user(&self) -> Result<&UserProfile, SessionError> {
        self.user.as_ref().ok_or(SessionError::NotSignedIn)
    }

    /// The signed-in administrator.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if there is no user and
    /// [`SessionError::NotAdmin`] if the user is not an administrator.
    pub fn require_admin(&self) -> Result<&UserProfile, SessionError> {
        let user = self.require_user()?;
        if user.is_admin() {
            Ok(user)
        } else {
            Err(SessionError::NotAdmin)
        }
    }

    /// Record a freshly authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile slot cannot be written.
    pub fn sign_in(&mut self, profile: UserProfile) -> Result<(), SessionError> {
        write_json(&self.store, keys::USER, &profile)?;
        info!(user_id = %profile.id, "Signed in");
        self.user = Some(profile);
        Ok(())
    }

    /// Forget the signed-in user. The cart is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile slot cannot be removed.
    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.store.remove(keys::USER)?;
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "Signed out");
        }
        Ok(())
    }

    /// Merge an updated profile into the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotSignedIn`] if there is no user,
    /// [`SessionError::InvalidProfile`] if the merged profile does not parse,
    /// or a storage error if the slot cannot be written.
    pub fn update_profile(
        &mut self,
        update: Map<String, Value>,
    ) -> Result<&UserProfile, SessionError> {
        let mut merged = self.require_user()?.clone();
        merged.merge(update)?;
        write_json(&self.store, keys::USER, &merged)?;
        Ok(self.user.insert(merged))
    }

    /// Change the theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the theme slot cannot be written.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), SessionError> {
        self.store.set(keys::THEME, theme.as_str())?;
        self.theme = theme;
        Ok(())
    }

    /// Switch between light and dark.
    ///
    /// # Errors
    ///
    /// Returns an error if the theme slot cannot be written.
    pub fn toggle_theme(&mut self) -> Result<Theme, SessionError> {
        let next = self.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn profile_json() -> &'static str {
        r#"{"id": 7, "name": "Asha", "email": "asha@example.com", "role": "USER",
            "city": "Pune", "pincode": "411001", "phone": "999"}"#
    }

    #[test]
    fn test_load_reads_user_and_theme_once() {
        let store = MemoryStore::with_slots([(keys::USER, profile_json()), (keys::THEME, "dark")]);
        let session = Session::load(&store);
        let user = session.user().unwrap();
        assert_eq!(user.name, "Asha");
        assert_eq!(user.extra.get("phone").and_then(|v| v.as_str()), Some("999"));
        assert_eq!(session.theme(), Theme::Dark);

        // Later slot writes by someone else are not re-parsed.
        store.set(keys::THEME, "light").unwrap();
        assert_eq!(session.theme(), Theme::Dark);
    }

    #[test]
    fn test_empty_profile_is_signed_out() {
        let store = MemoryStore::with_slots([(keys::USER, "{}")]);
        let session = Session::load(&store);
        assert!(session.user().is_none());
        assert!(matches!(session.require_user(), Err(SessionError::NotSignedIn)));
    }

    #[test]
    fn test_unknown_theme_is_light() {
        assert_eq!(Theme::parse("solarized"), Theme::Light);
        assert_eq!(Theme::parse("DARK"), Theme::Dark);
        let session = Session::load(MemoryStore::new());
        assert_eq!(session.theme(), Theme::Light);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_unreadable_store_loads_signed_out_light() {
        let mut session = Session::load(BrokenStore);
        assert!(session.user().is_none());
        assert_eq!(session.theme(), Theme::Light);
        assert!(matches!(session.toggle_theme(), Err(SessionError::Storage(_))));
        assert_eq!(session.theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_theme_persists() {
        let store = MemoryStore::new();
        let mut session = Session::load(&store);
        assert_eq!(session.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(store.get(keys::THEME).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_sign_in_and_out() {
        let store = MemoryStore::new();
        let mut session = Session::load(&store);
        let profile: UserProfile = serde_json::from_str(profile_json()).unwrap();

        session.sign_in(profile).unwrap();
        assert!(store.contains(keys::USER));
        assert!(Session::load(&store).user().is_some());

        session.sign_out().unwrap();
        assert!(!store.contains(keys::USER));
        assert!(session.user().is_none());
    }

    #[test]
    fn test_require_admin() {
        let store = MemoryStore::with_slots([(keys::USER, profile_json())]);
        let session = Session::load(&store);
        assert!(matches!(session.require_admin(), Err(SessionError::NotAdmin)));

        let admin = r#"{"id": 1, "name": "Root", "email": "root@example.com", "role": "ADMIN"}"#;
        let store = MemoryStore::with_slots([(keys::USER, admin)]);
        assert!(Session::load(&store).require_admin().is_ok());
    }

    fn overlay(json: &str) -> Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_update_profile_merges() {
        let store = MemoryStore::with_slots([(keys::USER, profile_json())]);
        let mut session = Session::load(&store);

        let merged = session
            .update_profile(overlay(r#"{"id": 7, "name": "Asha K", "locality": "Baner"}"#))
            .unwrap()
            .clone();
        assert_eq!(merged.name, "Asha K");
        assert_eq!(merged.email, "asha@example.com");
        assert_eq!(merged.city.as_deref(), Some("Pune"));
        assert_eq!(merged.locality.as_deref(), Some("Baner"));
        assert_eq!(Session::load(&store).user(), Some(&merged));
    }

    #[test]
    fn test_update_profile_null_clears_and_absent_keeps() {
        let store = MemoryStore::with_slots([(keys::USER, profile_json())]);
        let mut session = Session::load(&store);

        let merged = session
            .update_profile(overlay(r#"{"id": 7, "email": "a@x", "city": null}"#))
            .unwrap()
            .clone();
        assert_eq!(merged.name, "Asha");
        assert_eq!(merged.email, "a@x");
        assert_eq!(merged.city, None);
        assert_eq!(merged.pincode.as_deref(), Some("411001"));
        assert_eq!(merged.extra.get("phone").and_then(Value::as_str), Some("999"));
    }

    #[test]
    fn test_update_profile_without_id_is_rejected() {
        let store = MemoryStore::with_slots([(keys::USER, profile_json())]);
        let mut session = Session::load(&store);

        let result = session.update_profile(overlay(r#"{"id": null, "name": "Nobody"}"#));
        assert!(matches!(result, Err(SessionError::InvalidProfile(_))));
        assert_eq!(session.user().map(|u| u.name.as_str()), Some("Asha"));
    }

    #[test]
    fn test_null_or_unknown_role_is_not_admin() {
        let null_role = r#"{"id": 3, "name": null, "email": "x@example.com", "role": null}"#;
        let store = MemoryStore::with_slots([(keys::USER, null_role)]);
        let session = Session::load(&store);
        let user = session.user().unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.name, "");

        let customer = r#"{"id": 4, "email": "c@example.com", "role": "CUSTOMER"}"#;
        let store = MemoryStore::with_slots([(keys::USER, customer)]);
        let session = Session::load(&store);
        assert_eq!(session.user().map(|u| u.role), Some(UserRole::Unknown));
        assert!(matches!(session.require_admin(), Err(SessionError::NotAdmin)));
    }

    #[test]
    fn test_cart_shares_store() {
        let store = MemoryStore::new();
        let session = Session::load(&store);
        assert!(session.cart().load().is_empty());
    }
}
