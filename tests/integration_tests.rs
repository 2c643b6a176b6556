use district_layers::core::ConfigProvider;
use district_layers::{CliConfig, LayerEngine, LayerPipeline, LocalStorage, TomlConfig};
use std::io::Read;
use tempfile::TempDir;

fn cli_config(inputs: Vec<String>, output_path: &str) -> CliConfig {
    CliConfig {
        inputs,
        output_path: output_path.to_string(),
        gazetteer: None,
        strict: false,
        hide_district_name: false,
        formats: vec!["json".into(), "csv".into(), "tooltips".into()],
        no_zip: false,
        check: false,
        timeout_seconds: 30,
        log_format: "compact".to_string(),
        verbose: false,
    }
}

fn write_input(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn read_entry(archive: &mut zip::ZipArchive<std::io::Cursor<Vec<u8>>>, name: &str) -> String {
    let mut file = archive.by_name(name).unwrap();
    let mut content = String::new();
    file.read_to_string(&mut content).unwrap();
    content
}

#[tokio::test]
async fn test_end_to_end_with_local_files() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let tourists = write_input(
        &input_dir,
        "tourist_arrivals.csv",
        "Location,Estimated_Tourist_Arrivals_2023\nKathmandu,70972\nKaski,50312\nKathmando,10\n",
    );
    let landmarks = write_input(
        &input_dir,
        "landmarks.csv",
        "Item,Location\nEverest Base Camp,Solukhumbu\nNamche Bazaar,Solukhumbu\n",
    );
    let broken = write_input(&input_dir, "broken.csv", "Location,Value,Extra\nKaski,1,2\n");

    let config = cli_config(vec![tourists, landmarks, broken], &output_path);
    let storage = LocalStorage::new(output_path.clone());
    let pipeline = LayerPipeline::new(storage, config).unwrap();
    let engine = LayerEngine::new(pipeline);

    let summary = engine.run().await.unwrap();
    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.rejected, 1);
    assert_eq!(summary.exit_code(), 2);
    assert!(summary.output_path.ends_with("layers_output.zip"));

    let zip_path = output_dir.path().join("layers_output.zip");
    assert!(zip_path.exists());

    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(std::fs::read(&zip_path).unwrap())).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["landmarks.csv", "report.json", "tooltips.csv", "tourist_arrivals.csv"]
    );

    let report: serde_json::Value =
        serde_json::from_str(&read_entry(&mut archive, "report.json")).unwrap();
    assert_eq!(report["layers"].as_array().unwrap().len(), 2);
    assert_eq!(report["layers"][0]["render_mode"], "choropleth");
    assert_eq!(report["layers"][0]["issues"][0]["location"], "Kathmando");
    assert_eq!(report["layers"][1]["render_mode"], "markers");
    assert_eq!(report["layers"][1]["style"]["tooltip_label"], "Item");
    assert_eq!(report["rejected"][0]["category"], "contract");

    let tooltips = read_entry(&mut archive, "tooltips.csv");
    assert!(tooltips.starts_with("District,Province,Tooltip\n"));
    assert!(tooltips.contains("Estimated Tourist Arrivals 2023: 70,972.00"));
    assert!(tooltips.contains("  a. Everest Base Camp\n  b. Namche Bazaar"));
}

#[tokio::test]
async fn test_plain_files_without_zip() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let landmarks = write_input(
        &input_dir,
        "landmarks.csv",
        "Location,Item\nKaski,Phewa Lake\n",
    );

    let mut config = cli_config(vec![landmarks], &output_path);
    config.no_zip = true;
    config.hide_district_name = true;

    let pipeline = LayerPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    let summary = LayerEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.output_path, output_path);
    assert!(output_dir.path().join("report.json").exists());
    assert!(output_dir.path().join("landmarks.csv").exists());

    let tooltips = std::fs::read_to_string(output_dir.path().join("tooltips.csv")).unwrap();
    assert_eq!(tooltips, "District,Province,Tooltip\nKaski,Gandaki,Item: Phewa Lake\n");
}

#[tokio::test]
async fn test_custom_gazetteer() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let gazetteer = write_input(
        &input_dir,
        "districts.csv",
        "District,Province\nKathmandu,Bagmati\nKavre,Bagmati\n",
    );
    let layer = write_input(
        &input_dir,
        "population.csv",
        "Location,Population\nKavre,381937\nKathmandu,2017532\n",
    );

    let mut config = cli_config(vec![layer], &output_path);
    config.gazetteer = Some(gazetteer.clone());
    config.formats = vec!["json".into()];
    config.no_zip = true;

    let pipeline = LayerPipeline::new(LocalStorage::new(output_path.clone()), config).unwrap();
    assert_eq!(pipeline.gazetteer().len(), 2);

    let summary = LayerEngine::new(pipeline).run().await.unwrap();
    assert_eq!(summary.loaded, 1);

    let report: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(output_dir.path().join("report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["gazetteer"], gazetteer);
    assert_eq!(report["layers"][0]["rows"].as_array().unwrap().len(), 2);
    assert_eq!(report["layers"][0]["summary"]["min"], 381937.0);
}

#[tokio::test]
async fn test_missing_input_file_fails_the_run() {
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let config = cli_config(vec!["/definitely/not/here.csv".to_string()], &output_path);
    let pipeline = LayerPipeline::new(LocalStorage::new(output_path), config).unwrap();

    let err = LayerEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, district_layers::LayerError::IoError(_)));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_sample_toml_config() -> anyhow::Result<()> {
    let output_dir = TempDir::new()?;

    let mut config = TomlConfig::from_file("samples/layers.toml")?;
    config.load.output_path = output_dir.path().to_str().unwrap().to_string();

    let archive_name = config.archive_name().unwrap().to_string();
    assert_eq!(archive_name, "tourism_layers.zip");

    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = LayerPipeline::new(storage, config)?;
    let summary = LayerEngine::new(pipeline).run().await?;

    assert_eq!(summary.loaded, 2);
    assert_eq!(summary.rejected, 0);

    let zip_bytes = std::fs::read(output_dir.path().join(&archive_name))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes))?;
    let report: serde_json::Value = serde_json::from_str(&read_entry(&mut archive, "report.json"))?;

    assert_eq!(report["layers"][0]["style"]["display_name"], "Tourist Arrivals 2023");
    assert_eq!(report["layers"][0]["style"]["color"], "#1F77B4");
    assert_eq!(report["layers"][1]["style"]["display_name"], "Landmarks");
    assert_eq!(report["layers"][1]["style"]["icon"], "⭐");
    assert!(archive.by_name("tourist_arrivals_2023.csv").is_ok());

    let provinces = report["provinces"].as_array().unwrap();
    assert_eq!(provinces.len(), 7);
    assert_eq!(provinces[0]["color"], "#636EFA");
    let gandaki = provinces.iter().find(|p| p["name"] == "Gandaki").unwrap();
    assert_eq!(gandaki["color"], "#2CA02C");
    assert_eq!(gandaki["visible"], true);
    Ok(())
}

#[tokio::test]
async fn test_input_named_like_an_output_file() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let output_path = output_dir.path().to_str().unwrap().to_string();

    let layer = write_input(&input_dir, "tooltips.csv", "Location,Item\nKaski,Phewa Lake\n");

    let pipeline = LayerPipeline::new(
        LocalStorage::new(output_path.clone()),
        cli_config(vec![layer.clone()], &output_path),
    )
    .unwrap();
    let summary = LayerEngine::new(pipeline).run().await.unwrap();
    assert_eq!(summary.exit_code(), 0);

    let zip_bytes = std::fs::read(output_dir.path().join("layers_output.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
    assert!(read_entry(&mut archive, "tooltips.csv").starts_with("District,Province,Tooltip\n"));
    assert!(read_entry(&mut archive, "tooltips_2.csv").starts_with("Location,Item,Province\n"));

    let plain_dir = TempDir::new().unwrap();
    let plain_path = plain_dir.path().to_str().unwrap().to_string();
    let mut config = cli_config(vec![layer], &plain_path);
    config.no_zip = true;
    let pipeline = LayerPipeline::new(LocalStorage::new(plain_path), config).unwrap();
    LayerEngine::new(pipeline).run().await.unwrap();

    let tooltips = std::fs::read_to_string(plain_dir.path().join("tooltips.csv")).unwrap();
    assert!(tooltips.starts_with("District,Province,Tooltip\n"));
    let layer_csv = std::fs::read_to_string(plain_dir.path().join("tooltips_2.csv")).unwrap();
    assert_eq!(layer_csv, "Location,Item,Province\nKaski,Phewa Lake,Gandaki\n");
}
