use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::Config,
    data::Vehicle,
    error::{Error, Result},
    golemio,
    route_table::RouteTable,
};

const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Where vehicle positions and route metadata come from.
#[async_trait]
pub trait TransitSource: Send + Sync + 'static {
    async fn vehicle_positions(&self) -> Result<Vec<Vehicle>>;

    async fn routes(&self) -> Result<RouteTable>;
}

#[derive(Debug, Clone)]
pub struct GolemioClient {
    http: Client,
    api_key: String,
    vehicles_url: String,
    routes_url: String,
}

impl GolemioClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| Error::Http {
                endpoint: config.base_url.to_owned(),
                source,
            })?;

        Ok(Self {
            http,
            api_key: config.api_key.to_owned(),
            vehicles_url: config.endpoint("vehiclepositions"),
            routes_url: config.endpoint("gtfs/routes"),
        })
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let http_error = |source| Error::Http {
            endpoint: url.to_owned(),
            source,
        };

        let response = self
            .http
            .get(url)
            .header(ACCESS_TOKEN_HEADER, &self.api_key)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(http_error)?;
        debug!(endpoint = url, bytes = body.len(), "fetched");

        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            endpoint: url.to_owned(),
            source,
        })
    }
}

#[async_trait]
impl TransitSource for GolemioClient {
    async fn vehicle_positions(&self) -> Result<Vec<Vehicle>> {
        self.get::<golemio::VehiclePositions>(&self.vehicles_url)
            .await?
            .into()
    }

    async fn routes(&self) -> Result<RouteTable> {
        let records = self.get::<Vec<golemio::Route>>(&self.routes_url).await?;
        Ok(RouteTable::from_iter(records))
    }
}
