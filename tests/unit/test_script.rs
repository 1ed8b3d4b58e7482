//! Script loading, the scenario library and lint warnings.

use disputecast::errors::ScriptError;
use disputecast::playback::banner_indices;
use disputecast::script::{ScenarioLibrary, Script, ScriptWarning, Speaker};
use std::fs;

#[test]
fn test_builtin_scenarios_end_with_summary() {
    let library = ScenarioLibrary::builtin();
    assert_eq!(library.len(), 3);
    for script in library.iter() {
        let last = script.turns.last().unwrap();
        assert_eq!(last.speaker, Speaker::Summary, "{}", script.id);
        assert!(last.summary.as_ref().is_some_and(|s| !s.metrics.is_empty()));
        assert!(script.lint().is_empty(), "{}: {:?}", script.id, script.lint());
    }
}

#[test]
fn test_builtin_scenarios_have_banners() {
    for script in ScenarioLibrary::builtin().iter() {
        assert!(banner_indices(&script.turns).len() >= 3, "{}", script.id);
    }
}

#[test]
fn test_load_dir_uses_file_stem_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("b-chargeback.json"),
        r#"{"turns": [{"speaker": "agent", "agent": "Resolution Agent", "text": "Done", "delay_ms": 100}]}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("a-lost-card.json"),
        r#"{"id": "lost-card", "title": "Lost card", "turns": [{"speaker": "user", "text": "Help"}]}"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let mut library = ScenarioLibrary::new();
    assert_eq!(library.load_dir(dir.path()).unwrap(), 2);
    assert_eq!(library.ids(), vec!["lost-card".to_string(), "b-chargeback".to_string()]);

    let chargeback = library.get("b-chargeback").unwrap();
    assert_eq!(chargeback.title, "b-chargeback");
    assert_eq!(chargeback.turns[0].initial_delay.as_millis(), 100);
    assert_eq!(library.get("lost-card").unwrap().turns[0].speaker, Speaker::Customer);
}

#[test]
fn test_load_dir_rejects_duplicate_builtin_id() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("duplicate-charge.json"),
        r#"{"turns": [{"speaker": "customer", "text": "again"}]}"#,
    )
    .unwrap();
    let mut library = ScenarioLibrary::builtin();
    let err = library.load_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ScriptError::DuplicateScenario(id) if id == "duplicate-charge"));
}

#[test]
fn test_malformed_script_reports_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = Script::load(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_empty_script_loads_but_fails_strict_check() {
    let script = Script::from_json_str(r#"{"id": "blank", "turns": []}"#, "inline").unwrap();
    assert!(script.is_empty());
    assert!(matches!(script.ensure_not_empty(), Err(ScriptError::Empty(_))));
}

#[test]
fn test_lint_flags_unknown_agent() {
    let script = Script::from_json_str(
        r#"{"id": "x", "turns": [{"speaker": "agent", "agent": "Weather Agent", "text": "Sunny"}]}"#,
        "inline",
    )
    .unwrap();
    let warnings = script.lint();
    assert!(warnings
        .iter()
        .any(|w| matches!(w, ScriptWarning::UnknownAgent { .. })));
}
