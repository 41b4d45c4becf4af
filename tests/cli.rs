use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

const COUNTRIES: &str = "tests/data/countries.csv";
const MODEL: &str = "tests/data/deterministic_model.json";

fn epi_timeline() -> Command {
    Command::cargo_bin("epi-timeline").unwrap()
}

#[test]
fn deterministic_testland_run() {
    let temp_dir = tempdir().unwrap();
    epi_timeline()
        .args([
            "--countries",
            "Testland",
            "--demographics",
            COUNTRIES,
            "--model",
            MODEL,
            "--sample-ratio",
            "100000",
            "--start-date",
            "2021-01-01",
            "--end-date",
            "2021-01-03",
            "--output-dir",
        ])
        .arg(temp_dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .contains_str("Simulated 10 individuals over 3 days (30 timeline rows)");

    let timeline =
        fs::read_to_string(temp_dir.path().join("a2-covid-simulated-timeseries.csv")).unwrap();
    let lines: Vec<&str> = timeline.lines().collect();
    assert_eq!(lines.len(), 31);
    assert_eq!(
        lines[0],
        "person_id,age_group,country,date,state,staying_days"
    );
    assert_eq!(lines[1], "0,less_5,Testland,2021-01-01,I,2");
    assert_eq!(lines[2], "0,less_5,Testland,2021-01-02,I,1");
    assert_eq!(lines[3], "0,less_5,Testland,2021-01-03,M,5");
    assert_eq!(lines[30], "9,over_65,Testland,2021-01-03,M,5");

    let summary =
        fs::read_to_string(temp_dir.path().join("a2-covid-summary-timeseries.csv")).unwrap();
    assert_eq!(
        summary,
        "date,country,D,H,I,M,S\n\
         2021-01-01,Testland,0,0,10,0,0\n\
         2021-01-02,Testland,0,0,10,0,0\n\
         2021-01-03,Testland,0,0,0,10,0\n"
    );
}

#[test]
fn same_seed_same_output() {
    let run = |seed: &str| {
        let temp_dir = tempdir().unwrap();
        epi_timeline()
            .args([
                "--countries",
                "Testland,Alphaland",
                "--demographics",
                COUNTRIES,
                "--sample-ratio",
                "10000",
                "--start-date",
                "2021-04-01",
                "--end-date",
                "2021-06-30",
                "--random-seed",
                seed,
                "--output-dir",
            ])
            .arg(temp_dir.path())
            .assert()
            .success();
        fs::read_to_string(temp_dir.path().join("a2-covid-simulated-timeseries.csv")).unwrap()
    };
    assert_eq!(run("8"), run("8"));
}

#[test]
fn config_file() {
    let temp_dir = tempdir().unwrap();
    epi_timeline()
        .args(["--config", "tests/data/parameters.json", "--output-dir"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .contains_str("Loaded parameters from: tests/data/parameters.json");
    assert!(temp_dir
        .path()
        .join("a2-covid-summary-timeseries.csv")
        .exists());
}

#[test]
fn refuses_to_overwrite_without_flag() {
    let temp_dir = tempdir().unwrap();
    let args = [
        "--config",
        "tests/data/parameters.json",
        "--output-dir",
        temp_dir.path().to_str().unwrap(),
    ];
    epi_timeline().args(args).assert().success();
    epi_timeline()
        .args(args)
        .assert()
        .failure()
        .get_output()
        .stderr
        .contains_str("file already exists");
    epi_timeline()
        .args(args)
        .arg("--force-overwrite")
        .assert()
        .success();
}

#[test]
fn lists_countries() {
    let assert = epi_timeline()
        .args(["--list-countries", "--demographics", COUNTRIES])
        .assert()
        .success();
    assert_eq!(
        String::from_utf8_lossy(&assert.get_output().stdout),
        "Testland\nAlphaland\n"
    );
}

#[test]
fn unknown_country_fails() {
    let temp_dir = tempdir().unwrap();
    epi_timeline()
        .args(["--countries", "Atlantis", "--demographics", COUNTRIES, "--output-dir"])
        .arg(temp_dir.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .contains_str("Atlantis");
}

#[test]
fn reversed_dates_fail() {
    epi_timeline()
        .args([
            "--countries",
            "Testland",
            "--demographics",
            COUNTRIES,
            "--start-date",
            "2021-02-01",
            "--end-date",
            "2021-01-01",
        ])
        .assert()
        .failure();
}

#[test]
fn verbose_logs_to_stderr() {
    let temp_dir = tempdir().unwrap();
    epi_timeline()
        .args(["--config", "tests/data/parameters.json", "-vv", "--output-dir"])
        .arg(temp_dir.path())
        .assert()
        .success()
        .get_output()
        .stderr
        .contains_str("simulated 30 timeline rows");
}

trait ContainsStr {
    fn contains_str(&self, needle: &str);
}

impl ContainsStr for Vec<u8> {
    fn contains_str(&self, needle: &str) {
        let output = String::from_utf8_lossy(self);
        assert!(output.contains(needle), "`{needle}` not found in:\n{output}");
    }
}
