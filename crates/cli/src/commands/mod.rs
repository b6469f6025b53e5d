//! Subcommand implementations.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use zenbuy_storefront::backend::BackendClient;
use zenbuy_storefront::catalog::{Catalog, LOAD_FAILED_MESSAGE, LoadState};
use zenbuy_storefront::config::StorefrontConfig;
use zenbuy_storefront::error::{AppError, Result};
use zenbuy_storefront::session::Session;
use zenbuy_storefront::storage::FileStore;

/// Everything a command needs: the backend client and the session over the
/// slot file.
pub struct Context {
    pub client: BackendClient,
    pub session: Session<FileStore>,
}

impl Context {
    /// Build the client and read the session slots.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let client = BackendClient::new(&config.backend)?;
        tracing::debug!(store = %config.store_path.display(), "Opening slot file");
        let session = Session::load(FileStore::new(config.store_path));
        Ok(Self { client, session })
    }

    /// Fetch the catalog, turning a failed load into its display message.
    pub async fn catalog(&self) -> Result<Catalog> {
        match Catalog::fetch(&self.client).await {
            LoadState::Loaded(catalog) => Ok(catalog),
            LoadState::Failed(message) => Err(AppError::Unavailable(message)),
            LoadState::Loading => Err(AppError::Unavailable(LOAD_FAILED_MESSAGE.to_string())),
        }
    }
}
