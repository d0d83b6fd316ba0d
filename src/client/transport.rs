//! Stock update transports

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};

use super::{stock_update::MedicineId, ClientError, ClientSettings};
use crate::models::stock::StockUpdateResponse;

/// Sends one stock update and returns the decoded server answer.
///
/// Implementations must report non-2xx statuses and undecodable bodies as
/// errors; the controller treats every error the same way.
#[async_trait]
pub trait StockTransport: Send + Sync {
    async fn update_stock(
        &self,
        medicine_id: &MedicineId,
        fields: &[(String, String)],
    ) -> Result<StockUpdateResponse, ClientError>;
}

/// `POST {base_url}/update_stock/{id}` over HTTP with a form-encoded body.
pub struct HttpStockClient {
    client: Client,
    base_url: Url,
    access_token: Option<Secret<String>>,
}

impl HttpStockClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::builder().build()?,
            base_url,
            access_token: None,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let mut client = Self::new(&settings.base_url)?;
        client.access_token = settings.access_token.clone();
        Ok(client)
    }

    /// Attach a bearer token so the server records who changed the stock.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(Secret::new(token.into()));
        self
    }

    pub fn endpoint(&self, medicine_id: &MedicineId) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("update_stock")
            .push(medicine_id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl StockTransport for HttpStockClient {
    async fn update_stock(
        &self,
        medicine_id: &MedicineId,
        fields: &[(String, String)],
    ) -> Result<StockUpdateResponse, ClientError> {
        let url = self.endpoint(medicine_id)?;
        tracing::debug!(%url, fields = fields.len(), "Sending stock update");

        let mut request = self.client.post(url).form(fields);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<StockUpdateResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_and_encodes_id() {
        let client = HttpStockClient::new("http://localhost:3000/").unwrap();
        let url = client.endpoint(&MedicineId::from(42i64)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/update_stock/42");

        let client = HttpStockClient::new("http://localhost:3000/pharmacy").unwrap();
        let url = client.endpoint(&MedicineId::new("a/b")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/pharmacy/update_stock/a%2Fb");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(matches!(
            HttpStockClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpStockClient::new("mailto:pharmacy@example.com"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
