use log::debug;
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::logic::{CompilePolicy, FilterCompiler, OperatorTable, QueryAssembler};
use crate::model::{FilterExpr, ListResponse, LoadOptions, LoadResult};
use crate::store::traits::DataStore;
use crate::store::transport::{HttpRequest, ReqwestTransport, Transport};

/// Grid data source backed by a single REST resource.
///
/// Listing goes through `GET {url}?{query}`, creation through `POST {url}`,
/// and per-record changes through `{url}/{key}`.
pub struct RestStore<T: Transport = ReqwestTransport> {
    config: StoreConfig,
    base: Url,
    assembler: QueryAssembler,
    transport: T,
}

impl RestStore<ReqwestTransport> {
    pub fn new(config: StoreConfig) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport::default())
    }

    pub fn from_url(url: &str) -> Result<Self> {
        Self::new(StoreConfig::from(url))
    }

    pub fn with_client(config: StoreConfig, client: reqwest::Client) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport::new(client))
    }
}

impl<T: Transport> RestStore<T> {
    pub fn with_transport(config: StoreConfig, transport: T) -> Result<Self> {
        let base = Url::parse(&config.url).map_err(|err| Error::Url {
            url: config.url.clone(),
            reason: err.to_string(),
        })?;

        let assembler = Self::assembler_for(&config, Arc::new(OperatorTable::nestjsx()));
        Ok(Self {
            config,
            base,
            assembler,
            transport,
        })
    }

    /// Compile filters against a different operator table. The compile policy
    /// still follows `StoreConfig::strict`.
    pub fn with_operators(mut self, operators: Arc<OperatorTable>) -> Self {
        self.assembler = Self::assembler_for(&self.config, operators);
        self
    }

    fn assembler_for(config: &StoreConfig, operators: Arc<OperatorTable>) -> QueryAssembler {
        QueryAssembler::new(FilterCompiler::new(
            operators,
            CompilePolicy::from_strict(config.strict),
        ))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn assembler(&self) -> &QueryAssembler {
        &self.assembler
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET` URL that `load` would request for these options.
    pub fn list_url(&self, options: &LoadOptions) -> Result<String> {
        let mut url = self.base.clone();
        self.assembler.build(options)?.append_to(&mut url);
        Ok(url.into())
    }

    pub fn item_url(&self, key: &Value) -> String {
        let segment = match key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        format!(
            "{}/{}",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&segment)
        )
    }

    async fn fetch_list(&self, options: &LoadOptions) -> Result<ListResponse> {
        let url = self.list_url(options)?;
        debug!("Fetching list from {}", url);

        let body = self.transport.send(HttpRequest::get(url)).await?.into_json()?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait::async_trait]
impl<T: Transport> DataStore for RestStore<T> {
    fn key(&self) -> &str {
        &self.config.key
    }

    async fn load(&self, options: &LoadOptions) -> Result<LoadResult> {
        Ok(self.fetch_list(options).await?.into_result())
    }

    async fn by_key(&self, key: &Value) -> Result<LoadResult> {
        let options = LoadOptions::new().filter(FilterExpr::compare(self.key(), "=", key.clone()));
        Ok(self.fetch_list(&options).await?.into_result())
    }

    async fn insert(&self, values: &Value) -> Result<Value> {
        let request = HttpRequest::post(self.config.url.clone(), values.clone());
        self.transport.send(request).await?.into_json()
    }

    async fn remove(&self, key: &Value) -> Result<Value> {
        let request = HttpRequest::delete(self.item_url(key));
        self.transport.send(request).await?.into_json()
    }

    async fn update(&self, key: &Value, values: &Value) -> Result<Value> {
        let request = HttpRequest::patch(self.item_url(key), values.clone());
        self.transport.send(request).await?.into_json()
    }

    async fn total_count(&self, options: &LoadOptions) -> Result<u64> {
        let mut options = options.clone();
        options.take = Some(1);
        Ok(self.fetch_list(&options).await?.total())
    }
}
