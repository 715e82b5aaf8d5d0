//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Precedence: defaults < global file < local file < TREEMENU_* env vars.
//! Each layer replaces only the keys it names.
//!
//! Note: These tests pass explicit temp files as the global layer, so a real
//! ~/.config/treemenu/treemenu.toml never leaks in. Only one test touches the
//! environment, and it owns `landing_level`; no other test asserts on it.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use treemenu::application::TreeMenu;
use treemenu::config::Settings;
use treemenu::domain::NodeKey;
use treemenu::util::testing::{self, portfolio_tree};

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_no_files_when_load_then_defaults() {
    let settings = Settings::load_from(None, None).expect("load settings");

    assert_eq!(settings.root_url, "/");
    assert_eq!(settings.root_title, "Portfolio");
    assert_eq!(settings.label.max_len, 30);
    assert_eq!(settings.label.ellipsis, "...");
}

#[test]
fn given_global_and_local_when_load_then_local_wins_per_key() {
    let dir = TempDir::new().unwrap();
    let global = write(
        &dir,
        "global.toml",
        r#"
root_title = "Home"

[label]
max_len = 10
ellipsis = "~"
"#,
    );
    let local = write(
        &dir,
        "local.toml",
        r#"
[label]
max_len = 5
"#,
    );

    let settings = Settings::load_from(Some(&global), Some(&local)).expect("load settings");

    assert_eq!(settings.root_title, "Home");
    assert_eq!(settings.label.max_len, 5);
    assert_eq!(settings.label.ellipsis, "~");
    assert_eq!(settings.root_url, "/");
}

#[test]
fn given_label_settings_when_building_menu_then_labels_follow_them() {
    let dir = TempDir::new().unwrap();
    let local = write(
        &dir,
        "local.toml",
        r#"
root_title = "Start"

[label]
max_len = 6
ellipsis = "…"
"#,
    );
    let settings = Settings::load_from(None, Some(&local)).unwrap();

    let menu = TreeMenu::new(portfolio_tree(), settings.menu());

    assert_eq!(menu.root_node().unwrap().label(), "Start");
    let work = menu.node(menu.find(&NodeKey::Int(1)).unwrap()).unwrap();
    assert_eq!(work.label(), "A very…");
}

#[test]
fn given_missing_local_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = Settings::load_from(None, Some(&missing)).unwrap_err();

    assert!(err.to_string().contains("nope.toml"), "got: {err}");
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "bad.toml", "root_title = [unclosed");

    assert!(Settings::load_from(None, Some(&local)).is_err());
}

#[test]
fn given_env_var_when_load_then_overrides_files() {
    let dir = TempDir::new().unwrap();
    let local = write(&dir, "local.toml", r#"landing_level = "start""#);

    std::env::set_var("TREEMENU_LANDING_LEVEL", "home");
    let settings = Settings::load_from(None, Some(&local));
    std::env::remove_var("TREEMENU_LANDING_LEVEL");

    assert_eq!(settings.unwrap().landing_level, "home");
}

#[test]
fn given_effective_settings_when_shown_then_toml_lists_every_key() {
    let text = Settings::default().to_toml().unwrap();

    for key in ["root_url", "root_title", "landing_level", "max_len", "ellipsis"] {
        assert!(text.contains(key), "missing {key} in:\n{text}");
    }
}
