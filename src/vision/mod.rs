//! Vision/OCR Layer
//!
//! The text recognition engine itself lives outside this crate. This module
//! defines the seam it plugs into, prepares region images for it and turns
//! its output into numeric tokens.

pub mod mock;
pub mod normalize;
pub mod preprocess;

use async_trait::async_trait;
use image::RgbaImage;
use thiserror::Error;

pub use mock::MockRecognizer;
pub use normalize::{build_token, tokenize};
pub use preprocess::apply_preprocessing;

/// Input of one recognition pass
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    /// Cropped and preprocessed region image
    pub image: RgbaImage,
    /// Language hint for the engine (e.g., "eng")
    pub language: String,
}

/// Output of one recognition pass over a region image
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// Full recognized text
    pub text: String,
    /// Confidence for the whole pass, if the engine reports one
    pub confidence: Option<f64>,
}

/// Ways a recognition job can fail
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// The recognition engine reported an error
    #[error("recognition engine failed: {0}")]
    Engine(String),
    /// No frame was available to crop the region from
    #[error("no captured frame available for region")]
    NoFrame,
    /// The job was cancelled before the engine answered
    #[error("recognition cancelled")]
    Cancelled,
    /// The region could not be turned into an image
    #[error("region image unavailable: {0}")]
    Image(String),
}

/// Text recognition capability
///
/// Implementations may take an unpredictable amount of time and may fail.
/// The recognition scheduler is their only caller.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(
        &self,
        request: RecognitionRequest,
    ) -> Result<Recognition, RecognitionError>;
}
