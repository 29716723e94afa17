//! Stand-in recognizer that fabricates accounting amounts
//!
//! Used by the demo session and for exercising the recognition pipeline
//! without a real OCR engine. It ignores the image content.

use async_trait::async_trait;
use rand::Rng;
use std::ops::Range;
use std::time::Duration;

use crate::vision::{Recognition, RecognitionError, RecognitionRequest, Recognizer};

/// Recognizer producing 2-4 random amounts after a random delay
#[derive(Debug, Clone)]
pub struct MockRecognizer {
    delay_ms: Range<u64>,
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new(600..1400)
    }
}

impl MockRecognizer {
    pub fn new(delay_ms: Range<u64>) -> Self {
        Self { delay_ms }
    }

    /// Render amounts the way a ledger prints them, negatives in parentheses
    fn fabricate_text<R: Rng>(rng: &mut R) -> String {
        let count = rng.gen_range(2..5);
        (0..count)
            .map(|_| {
                let magnitude: f64 = rng.gen_range(25.0..750.0);
                if rng.gen_bool(0.3) {
                    format!("({magnitude:.2})")
                } else {
                    format!("{magnitude:.2}")
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(
        &self,
        _request: RecognitionRequest,
    ) -> Result<Recognition, RecognitionError> {
        let (delay, text, confidence) = {
            let mut rng = rand::thread_rng();
            let delay = if self.delay_ms.is_empty() {
                self.delay_ms.start
            } else {
                rng.gen_range(self.delay_ms.clone())
            };
            let confidence: f64 = rng.gen_range(0.75..0.98);
            (delay, Self::fabricate_text(&mut rng), confidence)
        };

        tokio::time::sleep(Duration::from_millis(delay)).await;

        Ok(Recognition {
            text,
            confidence: Some((confidence * 100.0).round() / 100.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::tokenize;
    use image::RgbaImage;

    #[tokio::test]
    async fn test_mock_produces_parseable_amounts() {
        let recognizer = MockRecognizer::new(0..0);
        let request = RecognitionRequest {
            image: RgbaImage::new(10, 10),
            language: "eng".to_string(),
        };
        let recognition = recognizer.recognize(request).await.unwrap();

        let tokens = tokenize(&recognition.text, recognition.confidence);
        assert!((2..=4).contains(&tokens.len()));
        for token in &tokens {
            let value = token.normalized_value.unwrap();
            assert!((25.0..=750.0).contains(&value));
            assert_eq!(token.is_negative, token.text.starts_with('('));
        }

        let confidence = recognition.confidence.unwrap();
        assert!((0.75..=0.98).contains(&confidence));
    }
}
