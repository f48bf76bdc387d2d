use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn svgchat_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_svgchat"))
}

#[test]
fn test_cli_help() {
    svgchat_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SVG"))
        .stdout(predicate::str::contains("--no-svg"))
        .stdout(predicate::str::contains("normalize"));
}

#[test]
fn test_cli_version() {
    svgchat_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("svgchat"));
}

#[test]
fn test_config_where() {
    svgchat_cmd()
        .args(["config", "where"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_invalid_subcommand() {
    svgchat_cmd().arg("invalid-command").assert().failure();
}

#[test]
fn test_invalid_view() {
    svgchat_cmd()
        .args(["--view", "sepia", "config", "where"])
        .assert()
        .failure();
}

#[test]
fn test_normalize_file() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let file = dir.path().join("drawing.svg");
    std::fs::write(
        &file,
        r#"Here you go: <svg width="200" height="100" viewbox="0 0 20 10"><rect/></svg>"#,
    )
    .expect("write");

    svgchat_cmd()
        .arg("normalize")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<svg viewBox="0 0 20 10" preserveAspectRatio="xMidYMid meet"><rect/></svg>"#,
        ))
        .stdout(predicate::str::contains("width").not());
}

#[test]
fn test_normalize_without_svg_fails() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "no drawing here").expect("write");

    svgchat_cmd()
        .arg("normalize")
        .arg(&file)
        .assert()
        .failure();
}

#[test]
fn test_key_lifecycle_in_isolated_home() {
    let home = tempfile::TempDir::new().expect("Failed to create temp dir");

    let run = |args: &[&str]| {
        let mut cmd = svgchat_cmd();
        cmd.args(args)
            .env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path())
            .env("APPDATA", home.path())
            .env_remove("DEEPSEEK_API_KEY");
        cmd.assert()
    };

    run(&["key", "set", "sk-abcdefghijkl"])
        .success()
        .stdout(predicate::str::contains("API key saved"));
    run(&["key", "show"])
        .success()
        .stdout(predicate::str::contains("sk-a"))
        .stdout(predicate::str::contains("sk-abcdefghijkl").not());
    run(&["key", "clear"]).success();
    run(&["key", "show"])
        .success()
        .stdout(predicate::str::contains("No API key set"));
}

#[test]
fn test_theme_toggle_persists() {
    let home = tempfile::TempDir::new().expect("Failed to create temp dir");

    let run = |args: &[&str]| {
        let mut cmd = svgchat_cmd();
        cmd.args(args)
            .env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path())
            .env("APPDATA", home.path());
        cmd.assert()
    };

    run(&["theme", "light"]).success();
    run(&["theme", "toggle"])
        .success()
        .stdout(predicate::str::contains("dark"));
    run(&["theme"]).success().stdout(predicate::str::contains("dark"));
}
