//! Fan-out/fan-in of one generation: one marketing-copy call and four cover
//! calls run concurrently; the first failure aborts the batch.

use std::sync::Arc;
use std::time::Instant;

use super::error::GenerationError;
use super::models::{BookInput, CoverImage, GenerationResult, MarketingCopy};
use super::prompts::{cover_prompt, marketing_prompt, marketing_schema, COVER_ASPECT_RATIO};
use super::provider::{GenerativeProvider, ImageRequest, StructuredTextRequest};
use super::styles::CompositionVariation;

/// Asset generation orchestrator.
#[derive(Clone)]
pub struct CoverGenerator {
    provider: Arc<dyn GenerativeProvider>,
}

impl CoverGenerator {
    pub fn new(provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { provider }
    }

    /// Produce four covers and one marketing copy, or nothing at all.
    pub async fn generate(&self, input: &BookInput) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();

        tracing::info!(
            title = input.title(),
            style = input.style().id(),
            "generating book assets"
        );

        let outcome = tokio::try_join!(
            self.marketing_copy(input),
            self.cover(input, 0),
            self.cover(input, 1),
            self.cover(input, 2),
            self.cover(input, 3),
        );

        match outcome {
            Ok((copy, c0, c1, c2, c3)) => {
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    clickbait_variants = copy.clickbait.len(),
                    "book assets generated"
                );
                Ok(GenerationResult {
                    covers: [c0, c1, c2, c3],
                    copy,
                })
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    kind = error.kind(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "error generating assets"
                );
                Err(error)
            }
        }
    }

    async fn marketing_copy(&self, input: &BookInput) -> Result<MarketingCopy, GenerationError> {
        let text = self
            .provider
            .generate_structured_text(StructuredTextRequest {
                prompt: marketing_prompt(input),
                schema: marketing_schema(),
            })
            .await?;
        MarketingCopy::parse(&text)
    }

    async fn cover(&self, input: &BookInput, index: usize) -> Result<CoverImage, GenerationError> {
        let variation = CompositionVariation::for_index(index);
        let image = self
            .provider
            .generate_image(ImageRequest {
                prompt: cover_prompt(input, variation),
                aspect_ratio: COVER_ASPECT_RATIO,
            })
            .await?;

        let cover = image.ok_or_else(|| {
            GenerationError::schema(format!("no image generated for cover {}", index + 1))
        })?;
        tracing::debug!(
            cover = index + 1,
            composition = ?variation,
            bytes = cover.bytes().len(),
            "cover rendered"
        );
        Ok(cover)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted provider shared by the module's tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    pub const COPY_JSON: &str = r#"{
        "clickbait": ["Tarian Terakhir di Atas Awan", "Rahasia Sang Penari"],
        "short_caption": "Caption pendek yang memikat.",
        "long_caption": "Caption panjang yang emosional.",
        "promo_130": "Promo viral tanpa spoiler.",
        "promo_250": "Promo persuasif dengan cliffhanger."
    }"#;

    /// Fake provider: answers with canned data, optionally failing chosen calls.
    pub struct ScriptedProvider {
        pub copy_json: String,
        /// Fail the image call whose prompt mentions this composition.
        pub failing_cover: Option<CompositionVariation>,
        /// Answer the image call for this composition without a payload.
        pub empty_cover: Option<CompositionVariation>,
        pub text_error: Option<GenerationError>,
        pub delay: Duration,
        pub text_calls: AtomicUsize,
        pub image_calls: AtomicUsize,
        pub in_flight: AtomicUsize,
        pub peak_in_flight: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl Default for ScriptedProvider {
        fn default() -> Self {
            Self {
                copy_json: COPY_JSON.to_string(),
                failing_cover: None,
                empty_cover: None,
                text_error: None,
                delay: Duration::from_millis(10),
                text_calls: AtomicUsize::new(0),
                image_calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl ScriptedProvider {
        async fn enter(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl GenerativeProvider for ScriptedProvider {
        async fn generate_structured_text(
            &self,
            request: StructuredTextRequest,
        ) -> Result<String, GenerationError> {
            self.text_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(request.prompt);
            self.enter().await;
            match &self.text_error {
                Some(error) => Err(error.clone()),
                None => Ok(self.copy_json.clone()),
            }
        }

        async fn generate_image(
            &self,
            request: ImageRequest,
        ) -> Result<Option<CoverImage>, GenerationError> {
            let index = self.image_calls.fetch_add(1, Ordering::SeqCst);
            let mentions = |variation: Option<CompositionVariation>| {
                variation.is_some_and(|v| request.prompt.contains(v.directive()))
            };
            let failing = mentions(self.failing_cover);
            let empty = mentions(self.empty_cover);
            self.prompts.lock().unwrap().push(request.prompt);
            self.enter().await;

            if failing {
                return Err(GenerationError::upstream("provider returned 503"));
            }
            if empty {
                return Ok(None);
            }
            Ok(Some(CoverImage::new("image/png", vec![0x89, b'P', b'N', b'G', index as u8])))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::testing::ScriptedProvider;
    use super::*;
    use crate::modules::covers::form::FormField;
    use crate::modules::covers::styles::BookStyle;

    fn input() -> BookInput {
        BookInput::new("Sang Penari Langit", "Dewi", "...", BookStyle::Fantasy).unwrap()
    }

    #[tokio::test]
    async fn success_yields_four_covers_and_one_copy() {
        let provider = Arc::new(ScriptedProvider::default());
        let generator = CoverGenerator::new(provider.clone());

        let result = generator.generate(&input()).await.unwrap();

        assert_eq!(result.covers.len(), 4);
        assert!(!result.copy.clickbait.is_empty());
        assert!(!result.copy.short_caption.is_empty());
        assert!(!result.copy.long_caption.is_empty());
        assert_eq!(provider.text_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.image_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn all_five_calls_are_in_flight_together() {
        let provider = Arc::new(ScriptedProvider {
            delay: std::time::Duration::from_millis(50),
            ..ScriptedProvider::default()
        });
        let generator = CoverGenerator::new(provider.clone());

        generator.generate(&input()).await.unwrap();

        assert_eq!(provider.peak_in_flight.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn each_cover_uses_a_distinct_composition() {
        let provider = Arc::new(ScriptedProvider::default());
        let generator = CoverGenerator::new(provider.clone());

        generator.generate(&input()).await.unwrap();

        let prompts = provider.prompts.lock().unwrap();
        for variation in CompositionVariation::ALL {
            let hits = prompts
                .iter()
                .filter(|prompt| prompt.contains(variation.directive()))
                .count();
            assert_eq!(hits, 1, "{:?} should be requested exactly once", variation);
        }
    }

    #[tokio::test]
    async fn covers_follow_composition_order() {
        let provider = Arc::new(ScriptedProvider::default());
        let generator = CoverGenerator::new(provider.clone());

        generator.generate(&input()).await.unwrap();

        // text prompt first, then covers in polling order
        let prompts = provider.prompts.lock().unwrap();
        for index in 0..4 {
            let directive = CompositionVariation::for_index(index).directive();
            assert!(prompts[index + 1].contains(directive), "cover {}", index + 1);
        }
    }

    #[tokio::test]
    async fn failed_generation_logs_one_error() {
        use std::io::Write;
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let provider = Arc::new(ScriptedProvider {
            failing_cover: Some(CompositionVariation::Symbolic),
            ..ScriptedProvider::default()
        });
        let mut session = crate::modules::covers::form::FormSession::new();
        for (field, value) in [
            (FormField::Title, "Sang Penari Langit"),
            (FormField::Author, "Dewi"),
            (FormField::Synopsis, "..."),
            (FormField::Style, "fantasy"),
        ] {
            session.update_field(field, value);
        }
        let input = session.submit().unwrap();
        let outcome = CoverGenerator::new(provider).generate(&input).await;
        session.complete(outcome);

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let errors: Vec<&str> = logs.lines().filter(|line| line.contains("ERROR")).collect();
        assert_eq!(errors.len(), 1, "{}", logs);
        assert!(errors[0].contains("generation failed"));
        assert!(logs.contains("error generating assets"));
    }

    #[tokio::test]
    async fn one_failing_cover_fails_the_whole_batch() {
        let provider = Arc::new(ScriptedProvider {
            failing_cover: Some(CompositionVariation::DynamicPose),
            ..ScriptedProvider::default()
        });
        let generator = CoverGenerator::new(provider);

        let err = generator.generate(&input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(_)));
    }

    #[tokio::test]
    async fn cover_without_payload_is_schema_error() {
        let provider = Arc::new(ScriptedProvider {
            empty_cover: Some(CompositionVariation::CloseUp),
            ..ScriptedProvider::default()
        });
        let generator = CoverGenerator::new(provider);

        let err = generator.generate(&input()).await.unwrap_err();
        assert_eq!(err, GenerationError::schema("no image generated for cover 1"));
    }

    #[tokio::test]
    async fn malformed_copy_is_schema_error() {
        let provider = Arc::new(ScriptedProvider {
            copy_json: r#"{"clickbait": ["x"]}"#.to_string(),
            ..ScriptedProvider::default()
        });
        let generator = CoverGenerator::new(provider);

        let err = generator.generate(&input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Schema(_)));
    }

    #[tokio::test]
    async fn missing_credential_surfaces_as_configuration_error() {
        let provider = Arc::new(ScriptedProvider {
            text_error: Some(GenerationError::configuration("API key is missing")),
            ..ScriptedProvider::default()
        });
        let generator = CoverGenerator::new(provider);

        let err = generator.generate(&input()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
    }
}
