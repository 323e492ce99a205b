use thiserror::Error;

/// Errors raised while configuring or starting a router.
///
/// Failures inside a request never surface here: they are turned into
/// responses by the request pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("invalid serve address `{0}`")]
    Address(String),

    #[error("server error: {0}")]
    Server(#[from] hyper::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
