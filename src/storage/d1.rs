use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    config::CloudflareConfig,
    error::{AppError, AppResult},
};

const INSIGHTS_QUERY: &str = r#"
query ($accountTag: string!, $databaseId: string!, $since: Date!, $until: Date!) {
  viewer {
    accounts(filter: { accountTag: $accountTag }) {
      d1AnalyticsAdaptiveGroups(
        limit: 10000
        filter: { date_geq: $since, date_leq: $until, databaseId: $databaseId }
        orderBy: [date_DESC]
      ) {
        dimensions {
          date
          databaseId
        }
        sum {
          readQueries
          writeQueries
        }
      }
    }
  }
}
"#;

const RECENT_QUERIES_QUERY: &str = r#"
query ($accountTag: string!, $databaseId: string!, $since: Date!, $until: Date!) {
  viewer {
    accounts(filter: { accountTag: $accountTag }) {
      d1QueriesAdaptiveGroups(
        limit: 100
        filter: { date_geq: $since, date_leq: $until, databaseId: $databaseId }
        orderBy: [date_DESC]
      ) {
        dimensions {
          date
          query
        }
      }
    }
  }
}
"#;

#[derive(Clone)]
pub struct D1Client {
    client: Client,
    config: CloudflareConfig,
}

impl D1Client {
    pub fn new(config: CloudflareConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    // Credentials are resolved per call so a missing value surfaces as a
    // request-time configuration error before any upstream call is made.
    fn credentials(&self) -> AppResult<(&str, &str, &str)> {
        match (
            self.config.api_token.as_deref(),
            self.config.account_id.as_deref(),
            self.config.database_id.as_deref(),
        ) {
            (Some(token), Some(account), Some(database)) => Ok((token, account, database)),
            _ => Err(AppError::Config(
                "API token, Account ID, or D1 Database ID is missing".to_string(),
            )),
        }
    }

    /// Execute a parameterized SQL statement and return the rows of the
    /// first result set.
    pub async fn query(&self, sql: &str, params: &[&str]) -> AppResult<Vec<Value>> {
        let envelope = self.execute(sql, params).await?;
        let rows = envelope
            .pointer("/result/0/results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(rows)
    }

    /// Execute a parameterized SQL statement and deserialize the rows.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[&str],
    ) -> AppResult<Vec<T>> {
        let rows = self.query(sql, params).await?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to decode D1 row: {}", e)))
            })
            .collect()
    }

    /// Execute a raw SQL statement and return the full Cloudflare response
    /// envelope, for callers that relay it unmodified.
    pub async fn raw_query(&self, sql: &str) -> AppResult<Value> {
        self.execute(sql, &[]).await
    }

    async fn execute(&self, sql: &str, params: &[&str]) -> AppResult<Value> {
        let (token, account, database) = self.credentials()?;
        let url = format!(
            "{}/accounts/{}/d1/database/{}/query",
            self.config.api_base, account, database
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "sql": sql, "params": params }))
            .send()
            .await?;

        Self::into_json(response).await
    }

    /// Daily read/write query counts from the D1 analytics dataset.
    pub async fn insights(&self, since: &str, until: &str) -> AppResult<Value> {
        self.graphql(INSIGHTS_QUERY, since, until).await
    }

    /// Individual query texts from the D1 queries dataset.
    pub async fn recent_queries(&self, since: &str, until: &str) -> AppResult<Value> {
        self.graphql(RECENT_QUERIES_QUERY, since, until).await
    }

    async fn graphql(&self, query: &str, since: &str, until: &str) -> AppResult<Value> {
        let (token, account, database) = self.credentials()?;
        let url = format!("{}/graphql", self.config.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({
                "query": query,
                "variables": {
                    "accountTag": account,
                    "databaseId": database,
                    "since": since,
                    "until": until,
                },
            }))
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> AppResult<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
