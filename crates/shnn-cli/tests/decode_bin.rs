use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::error::Error;
use tempfile::tempdir;
use assert_cmd::Command;

const PARAMS: &str = "t_start = 0\nt_end = 40\nt_res = 10\ninput_x = 2\ninput_y = 2\ninput_channels = 1\nnum_classes = 2\n";

#[test]
fn decode_prints_known_record() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let file = tmp.path().join("1.bs2");
    std::fs::write(&file, [0x12u8, 0x10, 0x80, 0x03, 0x7d])?;

    let mut cmd = Command::cargo_bin("snn-data")?;
    cmd.args(["decode", file.to_str().expect("utf8")]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("x,y,channel,timestamp"))
        .stdout(predicate::str::contains("18,16,1,893"));
    Ok(())
}

#[test]
fn decode_json_respects_limit() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let file = tmp.path().join("1.bs2");
    std::fs::write(&file, [0x12u8, 0x10, 0x80, 0x03, 0x7d, 0x01, 0x02, 0x00, 0x00, 0x09])?;

    let mut cmd = Command::cargo_bin("snn-data")?;
    cmd.args(["decode", "--format", "json", "-n", "1", file.to_str().expect("utf8")]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"timestamp\": 893"))
        .stdout(predicate::str::contains("\"timestamp\": 9").not());
    Ok(())
}

#[test]
fn decode_truncated_file_fails() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let file = tmp.path().join("1.bs2");
    std::fs::write(&file, [0x12u8, 0x10, 0x80])?;

    let mut cmd = Command::cargo_bin("snn-data")?;
    cmd.args(["decode", file.to_str().expect("utf8")]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Truncated spike file"));
    Ok(())
}

#[test]
fn bin_writes_csv_tensor() -> Result<(), Box<dyn Error>> {
    let tmp = tempdir()?;
    let params = tmp.path().join("params.toml");
    std::fs::write(&params, PARAMS)?;

    // (1, 0, ch0, t=15) -> unit 1, bin 1; (0, 1, ch0, t=39) -> unit 2, bin 3
    let file = tmp.path().join("1.bs2");
    std::fs::write(&file, [0x01u8, 0x00, 0x00, 0x00, 0x0f, 0x00, 0x01, 0x00, 0x00, 0x27])?;
    let out = tmp.path().join("binned.csv");

    let mut cmd = Command::cargo_bin("snn-data")?;
    cmd.args([
        "bin", file.to_str().expect("utf8"),
        "--params", params.to_str().expect("utf8"),
        "--out", out.to_str().expect("utf8"),
    ]);
    cmd.assert().success();

    let csv = std::fs::read_to_string(&out)?;
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows, vec!["0,0,0,0", "0,1,0,0", "0,0,0,1", "0,0,0,0"]);
    Ok(())
}

#[test]
fn bin_requires_params() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("snn-data")?;
    cmd.env_remove("SNN_DATA_PARAMS");
    cmd.args(["bin", "1.bs2"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--params"));
    Ok(())
}
