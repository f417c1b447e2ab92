//! # Plate Service
//!
//! Async front door: translates the text, then runs the synchronous
//! pipeline on tokio's blocking pool.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::compositor::CompositorConfig;
use crate::error::{MeshError, MeshResult};
use crate::pipeline::{self, CompositeResult};
use crate::spec::PlateSpec;
use crate::translate::{BrailleTranslator, Grade};

/// One plate to build from plain text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateRequest {
    pub spec: PlateSpec,
    /// One entry per plate row. Entries past the row count are dropped.
    pub text: Vec<String>,
    pub grade: Grade,
}

/// Translates and generates plates.
pub struct PlateService<T> {
    translator: T,
    config: CompositorConfig,
}

impl<T: BrailleTranslator> PlateService<T> {
    pub fn new(translator: T, config: CompositorConfig) -> Self {
        Self { translator, config }
    }

    /// Builds the plate for `request`.
    ///
    /// Only the first `rows` lines are translated. If any line fell back to
    /// the pass-through mapping, `diagnostics.translation_fallback` is set.
    pub async fn generate(
        &self,
        request: PlateRequest,
        cancel: CancellationToken,
    ) -> MeshResult<CompositeResult> {
        let spec = request.spec.sanitized()?;

        let mut lines = Vec::with_capacity(spec.grid.rows);
        let mut fallback = false;
        for text in request.text.iter().take(spec.grid.rows) {
            if cancel.is_cancelled() {
                return Err(MeshError::Cancelled);
            }
            let translation = self.translator.translate(text, request.grade).await;
            fallback |= translation.fallback;
            lines.push(translation.cells);
        }
        debug!(lines = lines.len(), fallback, "text translated");

        let config = self.config;
        let mut result = tokio::task::spawn_blocking(move || {
            pipeline::generate(&spec, &lines, &config, &cancel)
        })
        .await
        .map_err(|err| MeshError::Worker(err.to_string()))??;

        result.diagnostics.translation_fallback = fallback;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Resolution;
    use crate::translate::{PassthroughTranslator, TranslationClient};
    use std::time::Duration;

    fn small_request(text: &[&str]) -> PlateRequest {
        PlateRequest {
            spec: PlateSpec::flat(40.0, 20.0, 2.0)
                .with_grid(5, 1)
                .with_resolution(Resolution {
                    target: 0.6,
                    ..Default::default()
                }),
            text: text.iter().map(|s| s.to_string()).collect(),
            grade: Grade::Grade1,
        }
    }

    #[tokio::test]
    async fn test_generate_with_passthrough() {
        let service = PlateService::new(PassthroughTranslator, CompositorConfig::default());
        let result = service
            .generate(small_request(&["ab"]), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.diagnostics.dot_count, 3);
        assert!(!result.diagnostics.translation_fallback);
        assert!(result.mesh.is_closed());
    }

    #[tokio::test]
    async fn test_extra_lines_not_translated() {
        let service = PlateService::new(PassthroughTranslator, CompositorConfig::default());
        let result = service
            .generate(small_request(&["a", "bcdef"]), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.diagnostics.dot_count, 1);
    }

    #[tokio::test]
    async fn test_fallback_is_reported() {
        let (client, receiver) = TranslationClient::channel(1, Duration::from_millis(50));
        drop(receiver);
        let service = PlateService::new(client, CompositorConfig::default());

        let result = service
            .generate(small_request(&["a"]), CancellationToken::new())
            .await
            .unwrap();
        assert!(result.diagnostics.translation_fallback);
        assert_eq!(result.diagnostics.dot_count, 1);
    }

    #[tokio::test]
    async fn test_cancelled_request() {
        let service = PlateService::new(PassthroughTranslator, CompositorConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = service.generate(small_request(&["a"]), cancel).await;
        assert!(matches!(result, Err(MeshError::Cancelled)));
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: PlateRequest = serde_json::from_str(r#"{"text": ["hi"]}"#).unwrap();
        assert_eq!(request.spec, PlateSpec::default());
        assert_eq!(request.grade, Grade::Grade1);
    }
}
