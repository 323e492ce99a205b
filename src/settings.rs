//! Router settings.
//!
//! Settings are plain data, usually read from a TOML file:
//! ```toml
//! append_slash = true
//! serve_address = "0.0.0.0:8000"
//! ```
use crate::error::{Error, Result};

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Registering a pattern that ends in `/` also registers the pattern
    /// without it, redirecting permanently to the slashed form.
    pub append_slash: bool,

    /// Address [`listen_and_serve`](crate::listen_and_serve) binds to.
    pub serve_address: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            append_slash: false,
            serve_address: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Settings {
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.serve_address
            .parse()
            .map_err(|_| Error::Address(self.serve_address.clone()))
    }
}
