use crate::config::{StoreConfig, REQUEST_TIMEOUT};
use crate::error::StoreError;
use crate::store::traits::RemoteStore;
use crate::store::types::Select;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{Map, Value};
use tracing::debug;

/// PostgREST client for a hosted store (`<url>/rest/v1/<table>`)
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl RestStore {
    /// Create a client for the store described by `config`
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Request that writes and asks for the written rows back
    fn write(&self, method: Method, table: &str, select: &Select) -> RequestBuilder {
        self.request(method, table)
            .header("Prefer", "return=representation")
            .query(&[("select", select.to_query())])
    }

    async fn send(builder: RequestBuilder, table: &str) -> Result<Response, StoreError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StoreError::transport(format!("request to {table} failed: {e}")))?;

        let status = response.status();
        debug!("{} responded with {}", table, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::from_response(
            status.as_u16(),
            status.canonical_reason(),
            &body,
        ))
    }

    async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::transport(format!("failed to read response body: {e}")))?;

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&body)
            .map_err(|e| StoreError::decode(format!("response is not a row array: {e}")))
    }
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn select(&self, table: &str, select: &Select) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .request(Method::GET, table)
            .query(&[("select", select.to_query())]);

        Self::rows(Self::send(builder, table).await?).await
    }

    async fn insert(
        &self,
        table: &str,
        row: Map<String, Value>,
        select: &Select,
    ) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .write(Method::POST, table, select)
            .json(&vec![Value::Object(row)]);

        Self::rows(Self::send(builder, table).await?).await
    }

    async fn update(
        &self,
        table: &str,
        patch: Map<String, Value>,
        id: &str,
        select: &Select,
    ) -> Result<Vec<Value>, StoreError> {
        let builder = self
            .write(Method::PATCH, table, select)
            .query(&id_filter(id))
            .json(&Value::Object(patch));

        Self::rows(Self::send(builder, table).await?).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), StoreError> {
        let builder = self.request(Method::DELETE, table).query(&id_filter(id));

        Self::send(builder, table).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::Embed;
    use testresult::TestResult;

    fn store() -> Result<RestStore, StoreError> {
        RestStore::new(&StoreConfig {
            url: "https://abc.supabase.co/".to_string(),
            anon_key: "anon-key".to_string(),
        })
    }

    fn query_value(request: &reqwest::Request, key: &str) -> Option<String> {
        request
            .url()
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn requests_target_the_rest_endpoint_with_key_headers() -> TestResult {
        let request = store()?.request(Method::GET, "properties").build()?;

        assert_eq!(request.url().path(), "/rest/v1/properties");
        assert_eq!(request.url().host_str(), Some("abc.supabase.co"));
        assert_eq!(request.headers().get("apikey").map(|v| v.as_bytes()), Some(&b"anon-key"[..]));
        assert_eq!(
            request.headers().get("authorization").map(|v| v.as_bytes()),
            Some(&b"Bearer anon-key"[..])
        );

        Ok(())
    }

    #[test]
    fn writes_ask_for_representation_and_filter_by_id() -> TestResult {
        let select = Select::all().embed(Embed {
            alias: "agent".to_string(),
            table: "agents".to_string(),
            foreign_key: "agent_id".to_string(),
            columns: vec!["id".to_string(), "name".to_string()],
        });

        let request = store()?
            .write(Method::PATCH, "properties", &select)
            .query(&id_filter("42"))
            .build()?;

        assert_eq!(request.method(), &Method::PATCH);
        assert_eq!(
            request.headers().get("prefer").map(|v| v.as_bytes()),
            Some(&b"return=representation"[..])
        );
        assert_eq!(query_value(&request, "select").as_deref(), Some("*,agent:agents(id,name)"));
        assert_eq!(query_value(&request, "id").as_deref(), Some("eq.42"));

        Ok(())
    }
}
