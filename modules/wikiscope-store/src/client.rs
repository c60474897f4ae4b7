use mongodb::Client;

use wikiscope_common::WikiscopeError;

/// Thin wrapper around mongodb::Client providing connection setup.
#[derive(Clone)]
pub struct StoreClient {
    pub(crate) client: Client,
}

impl StoreClient {
    /// Connect to MongoDB with the given connection string.
    pub async fn connect(uri: &str) -> Result<Self, WikiscopeError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| WikiscopeError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    /// Get a reference to the underlying mongodb Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
