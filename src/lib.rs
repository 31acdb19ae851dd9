//! Sketchgen turns a UI image (screenshot, wireframe, sketch) into a runnable
//! frontend component through a single AWS Bedrock multimodal call, then runs
//! the generated source through a conservative sanitize → detect → repair
//! pipeline before handing it back.

pub mod bedrock;
pub mod codefix;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod prompts;
pub mod store;

#[cfg(feature = "server")]
pub mod server;

pub use bedrock::{SketchClient, VisionClient};
pub use codefix::{is_likely_broken, maybe_repair, sanitize, ModelInvoker};
pub use config::{BedrockConfig, Config, GenerationConfig, StoreConfig};
pub use error::{Result, SketchGenError};
pub use models::*;
pub use store::{ImageRecord, ImageStore};
