use std::fs;
use std::time::Duration;
use strata_logger::{LevelFilter, Logger, Rotation};
use tempfile::tempdir;

#[test]
fn json_files_carry_structured_fields() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("integration-file-logging")
        .console(None)
        .level(LevelFilter::INFO)
        .path(&dir)
        .rotation(Rotation::NEVER)
        .json()
        .init()?;

    tracing::info!(source = "remote", keys = 3, "Collected settings layer");
    tracing::debug!("filtered out");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let path = fs::read_dir(&dir)?
        .flatten()
        .map(|entry| entry.path())
        .find(|path| path.extension().and_then(|ext| ext.to_str()) == Some("log"))
        .expect("log file should be created");

    let contents = fs::read_to_string(path)?;
    let line = contents.lines().next().expect("one line was logged");
    let record: serde_json::Value = serde_json::from_str(line)?;

    assert_eq!(record["fields"]["message"], "Collected settings layer");
    assert_eq!(record["fields"]["source"], "remote");
    assert_eq!(record["fields"]["keys"], 3);
    assert!(!contents.contains("filtered out"));
    Ok(())
}
