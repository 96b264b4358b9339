#![deny(clippy::all, clippy::pedantic)]

use std::time::Duration;

use postdeck::application::remote::FetchError;
use postdeck::config::{DEFAULT_REMOTE_BASE_URL, parse_base_url};
use postdeck::domain::error::DomainError;
use postdeck::infra::error::InfraError;
use postdeck::infra::rest::RestPostsApi;
use thiserror::Error;

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid API URL: {0}")]
    Url(String),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("client setup failed: {0}")]
    Setup(#[from] InfraError),
    #[error("request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] DomainError),
    #[error("failed to render output: {0}")]
    Output(String),
}

#[derive(Clone, Debug)]
pub struct Ctx {
    pub api: RestPostsApi,
}

impl Ctx {
    pub fn new(api_url: &str, timeout: Option<Duration>) -> Result<Self, CliError> {
        let base = parse_base_url(api_url).map_err(CliError::Url)?;
        let api = RestPostsApi::new(base, timeout)?;
        Ok(Self { api })
    }
}

pub fn build_ctx_from_cli(cli: &Cli) -> Result<Ctx, CliError> {
    let api_url = cli.api_url.as_deref().unwrap_or(DEFAULT_REMOTE_BASE_URL);
    let timeout = match cli.timeout_seconds {
        Some(0) => return Err(CliError::ZeroTimeout),
        Some(seconds) => Some(Duration::from_secs(seconds)),
        None => None,
    };
    Ctx::new(api_url, timeout)
}
