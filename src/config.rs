use anyhow::{bail, Context as _, Result};
use reqwest::Url;
use std::path::PathBuf;

use crate::args::Args;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_SESSION_DIR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: Url,
    /// Directory holding the saved session record.
    pub session_dir: PathBuf,
}

impl Config {
    pub fn new(api_url: &str, session_dir: impl Into<PathBuf>) -> Result<Self> {
        let api_base_url =
            Url::parse(api_url).with_context(|| format!("Invalid API URL {api_url:?}"))?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            bail!("API URL {api_url:?} must use http or https");
        }
        Ok(Self {
            api_base_url,
            session_dir: session_dir.into(),
        })
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        Self::new(&args.api_url, &args.session_dir)
    }
}
