use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("hiphop-map"));
}

#[test]
fn name_reorders_genres() {
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.args([
        "name",
        "--geography",
        "county",
        "--exposure",
        "1997",
        "--genre",
        "black",
        "--genre",
        "hip-hop",
        "--aggregation",
        "sum",
        "--weighting",
        "weighted",
    ]);
    cmd.assert().success().stdout(predicate::eq(
        "County_1997 Hip Hop Exposure_Hip Hop_Black_Sum_Weighted.html\n",
    ));
}

#[test]
fn name_without_genres_uses_placeholder() {
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.args(["name", "--geography", "tract"]);
    cmd.assert().success().stdout(predicate::eq(
        "Census Tract_1997 Hip Hop Exposure_None_Average_Non-Weighted.html\n",
    ));
}

#[test]
fn load_without_token_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.env_remove("DROPBOX_ACCESS_TOKEN")
        .env("HIPHOP_MAP_SECRETS", dir.path().join("absent.toml"))
        .args(["load", "--geography", "county"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no Dropbox access token"));
}

#[test]
fn rejects_unknown_genre() {
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.args(["name", "--genre", "polka"]);
    cmd.assert().failure();
}

#[test]
fn name_accepts_full_labels() {
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.args([
        "name",
        "--geography",
        "Census Tract",
        "--exposure",
        "Year of Initial Exposure",
        "--genre",
        "Urban Contemporary",
    ]);
    cmd.assert().success().stdout(predicate::eq(
        "Census Tract_Year of Initial Exposure_Urban Contemporary_Average_Non-Weighted.html\n",
    ));
}

#[test]
fn unknown_geography_lists_choices() {
    let mut cmd = Command::cargo_bin("hiphop-map").unwrap();
    cmd.args(["name", "--geography", "state"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown geography 'state'"))
        .stderr(predicate::str::contains("Radio Station Broadcast Range"));
}
