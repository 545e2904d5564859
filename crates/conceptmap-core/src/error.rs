pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid concept graph: {message}")]
    InvalidGraph { message: String },

    #[error("Invalid config value at `{path}`: {message}")]
    InvalidConfig { path: String, message: String },
}
