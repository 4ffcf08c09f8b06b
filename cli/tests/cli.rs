use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

const HEADER: &str = "summary: Tutorial test\n\nkill-timeout: 30m\n\nexecute: |\n";

#[test]
fn extract_markdown_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tutorial.md");
    let output = dir.path().join("out.yaml");
    std::fs::write(&input, "```bash\necho hi\n```\n").unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg(&input).arg(&output);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Found 1 command block(s)"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert_eq!(written, format!("{}  echo hi\n", HEADER));
}

#[test]
fn explicit_extract_subcommand_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tutorial.rst");
    let out_dir = dir.path().join("spread");
    std::fs::create_dir(&out_dir).unwrap();
    std::fs::write(&input, ".. code-block:: bash\n\n    ls -la\n").unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg("extract").arg(&input).arg(&out_dir).arg("--quiet");
    cmd.assert().success().stderr(predicate::str::is_empty());

    let written = std::fs::read_to_string(out_dir.join("task.yaml")).unwrap();
    assert_eq!(written, format!("{}  ls -la\n", HEADER));
}

#[test]
fn verbose_logs_each_command() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tutorial.md");
    std::fs::write(&input, "<!-- SPREAD\nsnap list\n-->\n").unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.current_dir(dir.path()).arg("-v").arg(&input);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Command block 1: snap list"));

    assert!(dir.path().join("task.yaml").is_file());
}

#[test]
fn unclosed_marker_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.rst");
    let output = dir.path().join("task.yaml");
    std::fs::write(&input, ".. SPREAD\n.. echo hi\n").unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg("--no-color").arg(&input).arg(&output);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unclosed SPREAD marker found at position 0"));

    assert!(!output.exists());
}

#[test]
fn unsupported_extension_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "```\nls\n```\n").unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.current_dir(dir.path()).arg(&input);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file type '.txt'"));

    assert!(!dir.path().join("task.yaml").exists());
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.current_dir(dir.path()).arg("missing.md");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File 'missing.md' not found."));
}

#[test]
fn skip_sections_flag_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tutorial.md");
    std::fs::write(
        &input,
        "## Requirements\n\n```\nsnap install lxd\n```\n\n## Cleanup\n\n```\nlxc delete demo\n```\n\n## Use\n\n```\nlxc list\n```\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.current_dir(dir.path()).arg(&input).arg("--skip-sections");
    cmd.assert().success();
    let written = std::fs::read_to_string(dir.path().join("task.yaml")).unwrap();
    assert_eq!(written, format!("{}  lxc delete demo\n  lxc list\n", HEADER));

    std::fs::write(
        dir.path().join("spread-task.toml"),
        "[extract]\nskip_sections = [\"cleanup\"]\n",
    )
    .unwrap();
    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.current_dir(dir.path()).arg(&input).arg("--skip-sections");
    cmd.assert().success();
    let written = std::fs::read_to_string(dir.path().join("task.yaml")).unwrap();
    assert_eq!(written, format!("{}  lxc list\n", HEADER));
}

#[test]
fn bad_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tutorial.md");
    let config = dir.path().join("custom.toml");
    std::fs::write(&input, "```\nls\n```\n").unwrap();
    std::fs::write(&config, "[extract]\nunknown = 1\n").unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.current_dir(dir.path())
        .arg("extract")
        .arg(&input)
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("TOML parse error"));
}

#[test]
fn fixtures_pass() {
    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg("--no-color").arg("test").arg(fixture_path(""));
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("test result: ok. 8 passed, 0 failed"));
}

#[test]
fn fixture_category_filter() {
    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg("--no-color")
        .arg("test")
        .arg(fixture_path(""))
        .arg("--category")
        .arg("rst");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("test result: ok. 3 passed, 0 failed"));
}

#[test]
fn failing_fixture_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = dir.path().join("wrong.test.md");
    std::fs::write(
        &fixture,
        "---\nexpect_commands = [\"echo bye\"]\n---\n```\necho hi\n```\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg("--no-color").arg("test").arg(&fixture);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("command mismatch"))
        .stderr(predicate::str::contains("0 passed, 1 failed (of 1)"));
}

#[test]
fn labels_are_converted() {
    let mut cmd = cargo_bin_cmd!("spread-task");
    cmd.arg("labels").arg("self-hosted,ubuntu-22.04").arg("ubuntu-20.04");
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("self-hosted,jammy,focal\n"));
}
