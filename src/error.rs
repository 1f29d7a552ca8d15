use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request to {endpoint:?} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Endpoint {endpoint:?} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Could not decode response of {endpoint:?}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Feature #{index} is missing {field}")]
    MalformedFeature { index: usize, field: &'static str },

    #[error("Route {route_id:?} has no usable {field}: {value:?}")]
    InvalidColor {
        route_id: String,
        field: &'static str,
        value: Option<String>,
    },

    #[error("Could not read routes file {path:?}: {source}")]
    RoutesFile {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
