use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_trunnel-cli"));
    cmd.current_dir(repo_root());
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_renders_svg_for_series_fixture() {
    let output = cli()
        .args(["render", "--id", "chart"])
        .arg(fixture("sample.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    let svg = String::from_utf8(output.stdout).expect("utf8 svg");
    assert!(svg.starts_with("<svg"), "not an svg root: {svg:.40}");
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r#"id="chart""#));
    assert!(svg.contains(r#"viewBox="0 0 1200 300""#));
    assert!(svg.contains("M0,91.184H176"));
    assert!(svg.contains("Withdrawn"));
}

#[test]
fn cli_layout_reports_geometry_as_json() {
    let output = cli()
        .args(["layout", "--viewport-width", "600", "--viewport-height", "200"])
        .arg(fixture("sample.json"))
        .assert()
        .success()
        .get_output()
        .clone();

    let layout = stdout_json(&output);
    assert_eq!(layout["viewport"]["width"], 600.0);
    assert_eq!(layout["chart_width"], 500.0);
    assert_eq!(layout["chart_height"], 175.0);
    assert_eq!(layout["items"].as_array().map(Vec::len), Some(7));
}

#[test]
fn cli_layout_reads_data_view_objects_and_config_overrides() {
    let output = cli()
        .args(["layout"])
        .arg(fixture("data_view.json"))
        .assert()
        .success()
        .get_output()
        .clone();
    let layout = stdout_json(&output);
    let leaves = layout["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter(|item| item["is_leaf"] == true)
        .count();
    assert_eq!(leaves, 2);
    assert_eq!(layout["items"][0]["stroke"], "rgb(31, 119, 180)");

    let output = cli()
        .args(["layout", "--config"])
        .arg(fixture("settings.json"))
        .arg(fixture("data_view.json"))
        .assert()
        .success()
        .get_output()
        .clone();
    let layout = stdout_json(&output);
    let leaves = layout["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter(|item| item["is_leaf"] == true)
        .count();
    assert_eq!(leaves, 4);
    // yAxisWidth 80 + yLeavesAxisWidth 50
    assert_eq!(layout["chart_width"], 1200.0 - 130.0);
    // colours still come from the data view
    assert_eq!(layout["items"][0]["stroke"], "rgb(31, 119, 180)");
}

#[test]
fn cli_settings_enumerates_effective_properties() {
    let output = cli()
        .args(["settings", "--sample", "--object", "tree"])
        .assert()
        .success()
        .get_output()
        .clone();
    let instances = stdout_json(&output);
    assert_eq!(instances[0]["objectName"], "tree");
    assert_eq!(instances[0]["properties"]["leafCount"], 3);
    assert_eq!(instances[0]["properties"]["trunkWidthPercent"], 0.8);

    let output = cli()
        .args(["settings", "--sample"])
        .assert()
        .success()
        .get_output()
        .clone();
    let names: Vec<String> = stdout_json(&output)
        .as_array()
        .expect("instances")
        .iter()
        .filter_map(|i| i["objectName"].as_str().map(str::to_string))
        .collect();
    assert_eq!(names, ["tree", "axes", "colors"]);
}

#[test]
fn cli_renders_png_smoke() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out.png");

    cli()
        .args([
            "render",
            "--sample",
            "--format",
            "png",
            "--background",
            "white",
            "--out",
            out.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();

    let bytes = fs::read(&out).expect("read png");
    assert!(
        bytes.starts_with(b"\x89PNG\r\n\x1a\n"),
        "output is not a PNG"
    );
}

#[test]
fn cli_renders_png_with_default_out_path_for_file_input() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let tmp_fixture = tmp.path().join("sample.json");
    fs::copy(fixture("sample.json"), &tmp_fixture).expect("copy fixture");
    let expected_out = tmp_fixture.with_extension("png");

    cli()
        .args(["render", "--format", "png", "--scale", "2"])
        .arg(&tmp_fixture)
        .assert()
        .success();

    let file = fs::File::open(&expected_out).expect("default png output");
    let decoder = png::Decoder::new(file);
    let reader = decoder.read_info().expect("png header");
    let info = reader.info();
    assert_eq!((info.width, info.height), (2400, 600));
}

#[test]
fn cli_reports_invalid_values_with_exit_code_1() {
    let output = cli()
        .args(["layout"])
        .arg(fixture("bad_series.json"))
        .assert()
        .failure()
        .code(1)
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value"), "stderr: {stderr}");
}

#[test]
fn cli_rejects_unknown_flags_with_usage() {
    let output = cli()
        .args(["render", "--nope"])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USAGE:"));
}

#[test]
fn cli_rejects_data_view_without_categorical_section() {
    for command in ["layout", "render"] {
        let output = cli()
            .arg(command)
            .arg(fixture("misspelled_data_view.json"))
            .assert()
            .failure()
            .code(1)
            .get_output()
            .clone();
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("categorical"), "stderr: {stderr}");
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn cli_settings_resolve_without_laying_out() {
    // No input path: settings come from --config alone, stdin is never read.
    let output = cli()
        .args(["settings", "--object", "tree", "--config"])
        .arg(fixture("settings.json"))
        .stdin(std::process::Stdio::null())
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(stdout_json(&output)[0]["properties"]["leafCount"], 4);

    // Series data that cannot be laid out does not affect a settings query.
    cli()
        .args(["settings"])
        .arg(fixture("bad_series.json"))
        .assert()
        .success();

    let output = cli()
        .args(["settings", "--object", "colors"])
        .arg(fixture("data_view.json"))
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(
        stdout_json(&output)[0]["properties"]["colorStart"],
        "#1f77b4"
    );
}

#[test]
fn cli_rejects_unknown_settings_object_with_usage() {
    cli()
        .args(["settings", "--sample", "--object", "bogus"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn cli_png_background_accepts_chart_color_names() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("bg.png");

    cli()
        .args([
            "render",
            "--sample",
            "--format",
            "png",
            "--background",
            "chartreuse",
            "--out",
            out.to_string_lossy().as_ref(),
        ])
        .assert()
        .success();
    assert!(fs::read(&out).expect("read png").starts_with(b"\x89PNG"));

    cli()
        .args(["render", "--sample", "--format", "png", "--background", "nope"])
        .arg("--out")
        .arg(tmp.path().join("bad.png"))
        .assert()
        .failure()
        .code(1);
}
