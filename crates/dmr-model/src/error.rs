use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid rating value '{value}' (expected 0, 1, or blank)")]
    InvalidRating { value: String },
    #[error("rating code {code} is out of range (expected 0 or 1)")]
    InvalidRatingCode { code: u8 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
