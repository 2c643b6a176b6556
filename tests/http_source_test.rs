use district_layers::domain::model::RenderMode;
use district_layers::core::Pipeline;
use district_layers::{LayerError, LayerPipeline, LocalStorage, TomlConfig};
use httpmock::prelude::*;
use tempfile::TempDir;

fn config_for(inputs: &[String], output_path: &str) -> TomlConfig {
    let inputs = inputs
        .iter()
        .map(|i| format!("\"{}\"", i))
        .collect::<Vec<_>>()
        .join(", ");

    TomlConfig::from_toml_str(&format!(
        r#"
[project]
name = "http-test"

[source]
inputs = [{}]
timeout_seconds = 5
headers = {{ Authorization = "Bearer secret" }}

[load]
output_path = "{}"
"#,
        inputs,
        output_path.replace('\\', "/")
    ))
    .unwrap()
}

#[tokio::test]
async fn test_remote_csv_is_fetched_and_parsed() {
    let server = MockServer::start();
    let csv_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/layers/landmarks.csv")
            .header("Authorization", "Bearer secret");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body("Location,Item\nSolukhumbu,Everest Base Camp\nKaski,Phewa Lake\n");
    });

    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap();
    let config = config_for(&[server.url("/layers/landmarks.csv")], output_path);
    let pipeline = LayerPipeline::new(LocalStorage::new(output_path.to_string()), config).unwrap();

    let raw = pipeline.extract().await.unwrap();
    csv_mock.assert();
    assert_eq!(raw.len(), 1);

    let result = pipeline.transform(raw).await.unwrap();
    assert_eq!(result.layers.len(), 1);
    assert_eq!(result.layers[0].render_mode, RenderMode::Markers);
    assert_eq!(result.layers[0].style.display_name, "landmarks");
}

#[tokio::test]
async fn test_remote_error_status_is_source_unavailable() {
    let server = MockServer::start();
    let missing = server.mock(|when, then| {
        when.method(GET).path("/missing.csv");
        then.status(404);
    });

    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap();
    let config = config_for(&[server.url("/missing.csv")], output_path);
    let pipeline = LayerPipeline::new(LocalStorage::new(output_path.to_string()), config).unwrap();

    let err = pipeline.extract().await.unwrap_err();
    missing.assert();
    match &err {
        LayerError::SourceUnavailable { status, .. } => {
            assert_eq!(*status, 404);
            assert_eq!(err.exit_code(), 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_remote_file_that_breaks_the_contract_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wide.csv");
        then.status(200)
            .body("Location,Arrivals,Year\nKathmandu,70972,2023\n");
    });

    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().to_str().unwrap();
    let config = config_for(&[server.url("/wide.csv")], output_path);
    let pipeline = LayerPipeline::new(LocalStorage::new(output_path.to_string()), config).unwrap();

    let raw = pipeline.extract().await.unwrap();
    let result = pipeline.transform(raw).await.unwrap();

    assert!(result.layers.is_empty());
    assert_eq!(result.rejected.len(), 1);
    assert!(result.rejected[0].reason.contains("exactly two columns"));
}
