use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cellpack_core::{PayloadFormat, ValueMode, decode_payload_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.hex");
        if !input.exists() {
            continue;
        }
        let output = path.join("expected_payload.json");
        regenerate_one(&input, &output)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path) -> Result<(), String> {
    let decoded = decode_payload_file(input, PayloadFormat::Hex, ValueMode::Scaled)
        .map_err(|err| format!("decode failed for {}: {}", input.display(), err))?;
    let mut json = serde_json::to_string(&decoded)
        .map_err(|err| format!("JSON serialization failed: {}", err))?;
    json.push('\n');
    fs::write(output, json)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
