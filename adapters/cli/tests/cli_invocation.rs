use std::process::Command;

fn warpfield() -> Command {
    Command::new(env!("CARGO_BIN_EXE_warpfield"))
}

#[test]
fn help_lists_every_flag() {
    let output = warpfield()
        .arg("--help")
        .output()
        .expect("failed to run warpfield --help");

    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--config",
        "--stars",
        "--seed",
        "--warp-period-ms",
        "--star-texture",
        "--no-vsync",
        "--show-fps",
        "--no-title",
        "--log-filter",
    ] {
        assert!(help.contains(flag), "help output is missing {flag}");
    }
}

#[test]
fn missing_config_file_fails_before_opening_a_window() {
    let output = warpfield()
        .args(["--config", "does/not/exist/warpfield.toml"])
        .output()
        .expect("failed to run warpfield");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("does/not/exist/warpfield.toml"),
        "stderr should name the config path: {stderr}"
    );
}
