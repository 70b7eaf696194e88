use std::fs;

use tempfile::tempdir;

use needful_data::Settings;
use needful_engine::config::{load_library, load_settings, try_load_library, try_load_settings};

#[test]
fn partial_settings_keep_defaults_for_missing_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "smart_wait = true\nbeep_count = 5\n").unwrap();

    let settings = load_settings(&path);
    assert!(settings.smart_wait);
    assert_eq!(settings.beep_count, 5);
    assert!(settings.craft_skip);
    assert_eq!(settings.craft_loop_max_wait, 5);
}

#[test]
fn missing_settings_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.toml");
    assert_eq!(load_settings(&path), Settings::default());
    let err = try_load_settings(&path).unwrap_err();
    assert!(format!("{err:#}").contains("reading settings"));
}

#[test]
fn malformed_settings_report_the_parse_step() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.toml");
    fs::write(&path, "smart_wait = \"very\"").unwrap();
    let err = try_load_settings(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing settings"));
    assert_eq!(load_settings(&path), Settings::default());
}

#[test]
fn library_loads_folders_and_craft_loops() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("macros.toml");
    fs::write(
        &path,
        r#"
[[macros]]
name = "Hello"
contents = "/echo hi"

[[folders]]
name = "Crafting"

[[folders.macros]]
name = "Ingot"
craft_loop = true
craft_loop_count = 3
contents = "/ac \"Basic Synthesis\""
"#,
    )
    .unwrap();

    let library = load_library(&path);
    let names: Vec<&str> = library.all_macros().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Hello", "Ingot"]);
    let ingot = library.find_unique("Ingot").unwrap();
    assert!(ingot.craft_loop);
    assert_eq!(ingot.craft_loop_count, 3);
}

#[test]
fn unreadable_library_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("macros.toml");
    fs::write(&path, "[[macros]\nname = ").unwrap();
    assert!(try_load_library(&path).is_err());
    assert!(load_library(&path).all_macros().is_empty());
}

#[test]
fn shipped_data_files_parse() {
    let data = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    try_load_settings(&data.join("settings.toml")).unwrap();
    let library = try_load_library(&data.join("macros.toml")).unwrap();
    assert!(needful_data::validate_library(&library).is_empty());

    let engine = needful_engine::MacroEngine::new(Settings::default());
    for def in library.all_macros() {
        engine.enqueue(def).unwrap();
    }
}
