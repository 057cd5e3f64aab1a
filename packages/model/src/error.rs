use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Document has no \"{}\" entry", crate::ROOT_ID)]
    MissingRoot,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
