use std::fmt;

#[derive(Debug)]
pub enum SketchGenError {
    ConfigError(String),
    RequestError(String),
    ResponseError(String),
    SerializationError(String),
    ImageError(String),
    InternalError(String),
    AwsError(String),
    AwsServiceError(String),
}

impl fmt::Display for SketchGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchGenError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            SketchGenError::RequestError(msg) => write!(f, "Request error: {}", msg),
            SketchGenError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            SketchGenError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            SketchGenError::ImageError(msg) => write!(f, "Image error: {}", msg),
            SketchGenError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            SketchGenError::AwsError(msg) => write!(f, "AWS error: {}", msg),
            SketchGenError::AwsServiceError(msg) => write!(f, "AWS service error: {}", msg),
        }
    }
}

impl std::error::Error for SketchGenError {}

pub type Result<T> = std::result::Result<T, SketchGenError>;
