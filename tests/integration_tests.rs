use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const FIXTURE: &str = "tests/data/incidents.csv";

/// Helper function to run incidash against the fixture with extra arguments
fn run_incidash(args: &[&str]) -> Result<Vec<u8>, String> {
    let output = Command::new(env!("CARGO_BIN_EXE_incidash"))
        .args(["--data", FIXTURE])
        .args(args)
        .output()
        .map_err(|e| format!("Failed to spawn process: {}", e))?;

    if output.status.success() {
        Ok(output.stdout)
    } else {
        Err(String::from_utf8_lossy(&output.stderr).to_string())
    }
}

fn run_json(args: &[&str]) -> Value {
    let stdout = run_incidash(args).expect("incidash failed");
    serde_json::from_slice(&stdout).expect("Output is not valid JSON")
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("incidash-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

/// Check if bytes are a valid PNG
fn is_valid_png(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
}

#[test]
fn test_list_countries() {
    let stdout = run_incidash(&["--list-countries"]).unwrap();
    let text = String::from_utf8(stdout).unwrap();
    let options: Vec<&str> = text.lines().collect();
    assert_eq!(
        options,
        vec!["Select", "Global", "Afghanistan", "Algeria", "Iraq", "Peru"]
    );
}

#[test]
fn test_list_regions_for_country() {
    let stdout = run_incidash(&["--country", "Algeria", "--list-regions"]).unwrap();
    let text = String::from_utf8(stdout).unwrap();
    let regions: Vec<&str> = text.lines().collect();
    assert_eq!(regions, vec!["Algiers", "Batna(Province)", "Bejaia(Province)"]);
}

#[test]
fn test_list_regions_all() {
    let stdout = run_incidash(&["--list-regions"]).unwrap();
    let text = String::from_utf8(stdout).unwrap();
    let regions: Vec<&str> = text.lines().collect();
    assert_eq!(regions.len(), 9);
    assert!(regions.contains(&"Paktika"));
    assert!(regions.contains(&"Unknown"));
    assert!(!regions.contains(&"Paktika Province"));
}

#[test]
fn test_global_view_json() {
    let json = run_json(&["--country", "Global", "--plot"]);
    assert_eq!(json["view"]["view"], "global");

    let charts = json["charts"].as_array().unwrap();
    assert_eq!(charts.len(), 3);
    assert_eq!(charts[0]["title"]["text"], "Total Kills and Injuries");
    assert_eq!(charts[0]["body"]["kind"], "geo_scatter");
    assert_eq!(charts[1]["body"]["kind"], "animated_bar");
    assert_eq!(charts[2]["title"]["text"], "Weapon Used Globally For Attacks");

    let bubbles = charts[2]["body"]["bubbles"].as_array().unwrap();
    let weapons: Vec<&str> = bubbles.iter().map(|b| b["category"].as_str().unwrap()).collect();
    assert!(weapons.contains(&"Vehicle"));
    // Iraq's unknown-region incident is left out of the weapon totals.
    let total: f64 = bubbles.iter().map(|b| b["value"].as_f64().unwrap()).sum();
    assert_eq!(total, 91.0);
}

#[test]
fn test_country_view_json() {
    let json = run_json(&["--country", "Algeria", "--plot"]);
    assert_eq!(json["view"]["view"], "country");
    assert_eq!(json["view"]["country"], "Algeria");

    let bars = &json["charts"][1];
    assert_eq!(bars["title"]["text"], "Total Fatalities by State in Algeria Over Years");
    assert_eq!(bars["body"]["kind"], "stacked_bar");
    let categories: Vec<&str> = bars["body"]["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(categories, vec!["Algiers", "Batna(Province)", "Bejaia(Province)"]);

    let markers = json["charts"][0]["body"]["markers"].as_array().unwrap();
    assert!(markers.iter().all(|m| m["country"] == "Algeria"));
}

#[test]
fn test_placeholder_is_unselected() {
    let json = run_json(&[]);
    assert_eq!(json["view"]["view"], "unselected");
    for chart in json["charts"].as_array().unwrap() {
        assert_eq!(chart["title"]["text"], "Select a country to plot");
    }
}

#[test]
fn test_global_without_trigger_is_unselected() {
    let json = run_json(&["--country", "Global"]);
    assert_eq!(json["view"]["view"], "unselected");
}

#[test]
fn test_reads_stdin_when_no_data_file() {
    let csv = fs::read(FIXTURE).unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_incidash"))
        .args(["--country", "Peru", "--plot"])
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    {
        use std::io::Write;
        child.stdin.take().unwrap().write_all(&csv).unwrap();
    }
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["charts"][2]["title"]["text"], "Weapons Used in Peru for Attacks");
}

#[test]
fn test_png_output_files() {
    let dir = scratch_dir("png");
    let out = dir.to_str().unwrap();
    run_incidash(&["--country", "Iraq", "--plot", "--format", "png", "--out-dir", out]).unwrap();

    for name in ["map", "bars", "weapons"] {
        let bytes = fs::read(dir.join(format!("{name}.png"))).unwrap();
        assert!(is_valid_png(&bytes), "{name}.png is not a valid PNG");
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_svg_output_with_options() {
    let dir = scratch_dir("svg");
    let out = dir.to_str().unwrap();
    run_incidash(&[
        "--country", "Global", "--plot", "--format", "svg", "--out-dir", out,
        "--options", r#"{"width": 640, "height": 480, "frame": 1995}"#,
    ])
    .unwrap();

    let svg = fs::read_to_string(dir.join("bars.svg")).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("640"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_data_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_incidash"))
        .args(["--data", "tests/data/does-not-exist.csv", "--list-countries"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
