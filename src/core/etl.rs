use crate::core::Pipeline;
use crate::domain::model::{RunSummary, TransformResult};
use crate::utils::error::Result;

pub struct LayerEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> LayerEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extract and transform only; nothing is written.
    pub async fn check(&self) -> Result<TransformResult> {
        tracing::info!("🔍 Checking layer files...");
        let raw_layers = self.pipeline.extract().await?;
        self.pipeline.transform(raw_layers).await
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting layer load...");

        // Extract
        let raw_layers = self.pipeline.extract().await?;
        tracing::info!("Read {} source file(s)", raw_layers.len());

        // Transform
        let result = self.pipeline.transform(raw_layers).await?;
        let loaded = result.layers.len();
        let rejected = result.rejected.len();
        if loaded == 0 {
            tracing::warn!("⚠️ No layer passed validation");
        }

        // Load
        let output_path = self.pipeline.load(result).await?;

        Ok(RunSummary {
            output_path,
            loaded,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RawLayer, RejectedLayer};
    use crate::utils::error::{ErrorCategory, LayerError};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubPipeline {
        fail_extract: bool,
        loaded: AtomicBool,
    }

    impl StubPipeline {
        fn new(fail_extract: bool) -> Self {
            Self {
                fail_extract,
                loaded: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn extract(&self) -> Result<Vec<RawLayer>> {
            if self.fail_extract {
                return Err(LayerError::SourceUnavailable {
                    source_name: "https://example.com/a.csv".to_string(),
                    status: 404,
                });
            }
            Ok(vec![RawLayer {
                source: "a.csv".to_string(),
                content: b"bad".to_vec(),
            }])
        }

        async fn transform(&self, data: Vec<RawLayer>) -> Result<TransformResult> {
            Ok(TransformResult {
                layers: vec![],
                rejected: data
                    .into_iter()
                    .map(|raw| RejectedLayer {
                        source: raw.source,
                        category: ErrorCategory::Contract,
                        reason: "no column named 'Location'".to_string(),
                    })
                    .collect(),
                tooltips: vec![],
            })
        }

        async fn load(&self, _result: TransformResult) -> Result<String> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok("out/layers_output.zip".to_string())
        }
    }

    #[tokio::test]
    async fn test_run_reports_counts() {
        let engine = LayerEngine::new(StubPipeline::new(false));
        let summary = engine.run().await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                output_path: "out/layers_output.zip".to_string(),
                loaded: 0,
                rejected: 1,
            }
        );
        assert_eq!(summary.exit_code(), 1);
        assert!(engine.pipeline().loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_check_does_not_load() {
        let engine = LayerEngine::new(StubPipeline::new(false));
        let result = engine.check().await.unwrap();

        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.exit_code(), 1);
        assert!(!engine.pipeline().loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_check_propagates_network_errors() {
        let engine = LayerEngine::new(StubPipeline::new(true));
        let err = engine.check().await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_run_propagates_extract_errors() {
        let engine = LayerEngine::new(StubPipeline::new(true));
        assert!(matches!(
            engine.run().await,
            Err(LayerError::SourceUnavailable { status: 404, .. })
        ));
    }
}
