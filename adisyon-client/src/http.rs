//! Customer ledger lookup over HTTP

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::models::{CustomerAccount, CustomerAccountsResponse};

use crate::{ClientConfig, ClientError, ClientResult};

const ACCOUNTS_PATH: &str = "api/cari/hesaplar";

/// Source of customer ledger accounts for on-account tenders
#[async_trait]
pub trait CustomerLookup: Send + Sync {
    /// Accounts whose name contains `query` (case-insensitive)
    async fn search(&self, query: &str) -> ClientResult<Vec<CustomerAccount>>;
}

/// Keep the accounts matching `query`; an empty query keeps all
pub fn filter_accounts(accounts: Vec<CustomerAccount>, query: &str) -> Vec<CustomerAccount> {
    accounts.into_iter().filter(|a| a.matches(query)).collect()
}

/// Customer directory served by the POS backend
#[derive(Debug, Clone)]
pub struct HttpCustomerDirectory {
    client: Client,
    base_url: String,
}

impl HttpCustomerDirectory {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetch every account
    pub async fn accounts(&self) -> ClientResult<Vec<CustomerAccount>> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ACCOUNTS_PATH);
        tracing::debug!(url = %url, "Fetching customer accounts");

        let response = self.client.get(&url).send().await?;
        let body: CustomerAccountsResponse = Self::handle_response(response).await?;
        Self::unwrap_accounts(body)
    }

    async fn handle_response(response: reqwest::Response) -> ClientResult<CustomerAccountsResponse> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await?;
            return Err(match status {
                StatusCode::NOT_FOUND => ClientError::InvalidResponse(format!("Not found: {}", text)),
                _ => ClientError::InvalidResponse(format!("{}: {}", status, text)),
            });
        }

        response.json().await.map_err(Into::into)
    }

    fn unwrap_accounts(body: CustomerAccountsResponse) -> ClientResult<Vec<CustomerAccount>> {
        if !body.success {
            let message = body
                .message
                .unwrap_or_else(|| "Customer list unavailable".to_string());
            tracing::warn!(message = %message, "Customer lookup rejected");
            return Err(ClientError::InvalidResponse(message));
        }
        Ok(body.hesaplar)
    }
}

#[async_trait]
impl CustomerLookup for HttpCustomerDirectory {
    async fn search(&self, query: &str) -> ClientResult<Vec<CustomerAccount>> {
        let accounts = self.accounts().await?;
        Ok(filter_accounts(accounts, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> CustomerAccount {
        CustomerAccount {
            id: None,
            cari_isim: name.to_string(),
            bakiye: None,
        }
    }

    #[test]
    fn test_filter_accounts() {
        let accounts = vec![account("Ahmet Yilmaz"), account("AHMET KAYA"), account("Zeynep Demir")];

        let found = filter_accounts(accounts.clone(), "ahmet");
        assert_eq!(found.len(), 2);

        assert_eq!(filter_accounts(accounts.clone(), "").len(), 3);
        assert!(filter_accounts(accounts, "mehmet").is_empty());
    }

    #[test]
    fn test_unsuccessful_body() {
        let body: CustomerAccountsResponse =
            serde_json::from_str(r#"{"success": false, "message": "Veritabani hatasi"}"#).unwrap();
        let err = HttpCustomerDirectory::unwrap_accounts(body).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(m) if m == "Veritabani hatasi"));
    }

    #[test]
    fn test_successful_body() {
        let body: CustomerAccountsResponse = serde_json::from_str(
            r#"{"success": true, "hesaplar": [{"id": 1, "cari_isim": "Ahmet Yilmaz", "bakiye": 120.5}]}"#,
        )
        .unwrap();
        let accounts = HttpCustomerDirectory::unwrap_accounts(body).unwrap();
        assert_eq!(accounts[0].cari_isim, "Ahmet Yilmaz");
        assert_eq!(accounts[0].bakiye, Some(120.5));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let config = ClientConfig::new("http://127.0.0.1:9").with_timeout(2);
        let directory = HttpCustomerDirectory::new(&config).unwrap();
        let err = directory.search("a").await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }
}
