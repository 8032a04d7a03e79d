use schedule_tree::{
    ConfigError, ImportConfig, OrphanPolicy, PersistenceError, build_forest, forest_to_delimited,
    load_config_from_json, load_forest_from_csv, load_forest_from_json, save_config_to_json,
    save_forest_to_csv, save_forest_to_json,
};
use std::fs;
use tempfile::NamedTempFile;

const SCHEDULE: &str = "ID,Name,Description,Start,Finish\r\n\
1,Groundworks,Site prep,2023-01-02T08:00:00,2023-02-10T16:00:00\r\n\
1.1,Excavation,,2023-01-02T08:00:00,2023-01-20T16:00:00\r\n\
1.2,Foundations,,2023-01-23T08:00:00,2023-02-10T16:00:00\r\n\
2,Frame,,2023-02-13T08:00:00,2023-04-28T16:00:00\r\n";

fn write_temp(contents: &str) -> NamedTempFile {
    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), contents).unwrap();
    file
}

#[test]
fn csv_file_loads_into_forest() {
    let file = write_temp(SCHEDULE);
    let build = load_forest_from_csv(file.path(), &ImportConfig::default()).unwrap();
    assert_eq!(build.forest.roots().len(), 2);
    assert_eq!(build.forest.len(), 4);
    assert_eq!(build.orphans().count(), 0);
}

#[test]
fn csv_load_with_reject_policy_fails_on_orphans() {
    let file = write_temp("ID,Name\r\n1,A\r\n5.1,B\r\n");
    let config = ImportConfig {
        orphan_policy: OrphanPolicy::Reject,
        ..ImportConfig::default()
    };
    match load_forest_from_csv(file.path(), &config) {
        Err(PersistenceError::Forest(err)) => {
            assert!(err.to_string().contains("5.1"), "unexpected message: {err}")
        }
        other => panic!("expected orphan rejection, got {other:?}"),
    }
}

#[test]
fn json_round_trip_preserves_forest() {
    let forest = build_forest(SCHEDULE, ',');
    let file = NamedTempFile::new().unwrap();

    save_forest_to_json(&forest, file.path()).unwrap();
    let written = fs::read_to_string(file.path()).unwrap();
    assert!(written.starts_with("[\n  {"), "expected two-space pretty JSON");
    assert_eq!(written.matches("\"children\"").count(), 1);

    let loaded = load_forest_from_json(file.path()).unwrap();
    assert_eq!(loaded, forest);
}

#[test]
fn json_round_trip_survives_deep_chains() {
    let mut raw = String::from("ID,Name\r\n");
    let mut id = String::from("1");
    for level in 0..70 {
        raw.push_str(&format!("{id},Level {level}\r\n"));
        id.push_str(".1");
    }
    let forest = build_forest(&raw, ',');
    assert_eq!(forest.walk().map(|(level, _)| level).max(), Some(69));

    let file = NamedTempFile::new().unwrap();
    save_forest_to_json(&forest, file.path()).unwrap();
    let loaded = load_forest_from_json(file.path()).unwrap();
    assert_eq!(loaded, forest);
}

#[test]
fn json_load_rejects_trailing_garbage() {
    let file = write_temp(r#"[{"data":{"ID":"1"}}] ["#);
    assert!(matches!(
        load_forest_from_json(file.path()),
        Err(PersistenceError::Serialization(_))
    ));
}

#[test]
fn json_load_normalizes_empty_child_lists() {
    let file = write_temp(r#"[{"data":{"ID":"1"},"children":[]}]"#);
    let loaded = load_forest_from_json(file.path()).unwrap();
    assert!(loaded.roots()[0].is_leaf());
}

#[test]
fn delimited_export_matches_well_ordered_input() {
    let forest = build_forest(SCHEDULE, ',');
    let text = forest_to_delimited(&forest, &ImportConfig::default()).unwrap();
    assert_eq!(text, SCHEDULE);
}

#[test]
fn delimited_export_fills_short_rows() {
    let forest = build_forest("ID,Name,Start\r\n1,A\r\n1.1,B,2023-01-01\r\n", ',');
    let text = forest_to_delimited(&forest, &ImportConfig::default()).unwrap();
    assert_eq!(text, "ID,Name,Start\r\n1,A,\r\n1.1,B,2023-01-01\r\n");
}

#[test]
fn delimited_export_refuses_values_that_would_split() {
    let with_delimiter = write_temp(r#"[{"data":{"ID":"1","Name":"Cut, fill"}}]"#);
    let forest = load_forest_from_json(with_delimiter.path()).unwrap();
    match forest_to_delimited(&forest, &ImportConfig::default()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("'1'") && msg.contains("delimiter"), "unexpected message: {msg}")
        }
        other => panic!("expected invalid data, got {other:?}"),
    }

    let with_separator = write_temp(r#"[{"data":{"ID":"1","Name":"two\r\nlines"}}]"#);
    let forest = load_forest_from_json(with_separator.path()).unwrap();
    match forest_to_delimited(&forest, &ImportConfig::default()) {
        Err(PersistenceError::InvalidData(msg)) => {
            assert!(msg.contains("line separator"), "unexpected message: {msg}")
        }
        other => panic!("expected invalid data, got {other:?}"),
    }

    let bad_header = write_temp(r#"[{"data":{"ID":"1","Start;Finish":"x"}}]"#);
    let forest = load_forest_from_json(bad_header.path()).unwrap();
    let config = ImportConfig {
        delimiter: ';',
        ..ImportConfig::default()
    };
    assert!(matches!(
        forest_to_delimited(&forest, &config),
        Err(PersistenceError::InvalidData(_))
    ));
    assert!(forest_to_delimited(&forest, &ImportConfig::default()).is_ok());
}

#[test]
fn csv_save_uses_configured_delimiter() {
    let forest = build_forest("ID,Name\r\n1,A\r\n1.1,B\r\n", ',');
    let config = ImportConfig {
        delimiter: ';',
        ..ImportConfig::default()
    };
    let file = NamedTempFile::new().unwrap();
    save_forest_to_csv(&forest, file.path(), &config).unwrap();
    assert_eq!(
        fs::read_to_string(file.path()).unwrap(),
        "ID;Name\r\n1;A\r\n1.1;B\r\n"
    );
}

#[test]
fn config_round_trip_and_validation() {
    let config = ImportConfig {
        delimiter: '\t',
        line_separator: "\n".into(),
        orphan_policy: OrphanPolicy::Warn,
    };
    let file = NamedTempFile::new().unwrap();
    save_config_to_json(&config, file.path()).unwrap();
    assert_eq!(load_config_from_json(file.path()).unwrap(), config);

    let partial = write_temp(r#"{ "orphan_policy": "reject" }"#);
    let loaded = load_config_from_json(partial.path()).unwrap();
    assert_eq!(loaded.delimiter, ',');
    assert_eq!(loaded.orphan_policy, OrphanPolicy::Reject);

    let bad = write_temp(r#"{ "delimiter": "." }"#);
    match load_config_from_json(bad.path()) {
        Err(PersistenceError::Config(ConfigError::InvalidDelimiter('.'))) => {}
        other => panic!("expected invalid delimiter, got {other:?}"),
    }
}
