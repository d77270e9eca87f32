//! Tests for config path resolution

use beads_config::{config_path, data_dir};
use serial_test::serial;
use std::path::PathBuf;

const CONFIG_ENV: &str = "AMPLIFIER_BEADS_CONFIG";

#[test]
#[serial]
fn test_default_config_path() {
    std::env::remove_var(CONFIG_ENV);
    assert_eq!(config_path(), data_dir().join("beads.json"));
    assert!(data_dir().ends_with(".amplifier"));
}

#[test]
#[serial]
fn test_config_path_from_environment() {
    std::env::set_var(CONFIG_ENV, "/tmp/custom-beads.json");
    let path = config_path();
    std::env::remove_var(CONFIG_ENV);

    assert_eq!(path, PathBuf::from("/tmp/custom-beads.json"));
}

#[test]
#[serial]
fn test_empty_environment_value_is_ignored() {
    std::env::set_var(CONFIG_ENV, "");
    let path = config_path();
    std::env::remove_var(CONFIG_ENV);

    assert_eq!(path, data_dir().join("beads.json"));
}
