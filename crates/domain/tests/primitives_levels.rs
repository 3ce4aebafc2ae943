//! Integration coverage for domain primitives, levels, and rotation settings.

use rotolog_domain::{AdapterId, DateGranularity, Level, PrimitiveError, SizeUnit};
use rotolog_shared::ErrorEnvelope;

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = AdapterId::parse("   ") else {
        return Err(PrimitiveError::InvalidAdapterId { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "config");
    assert_eq!(envelope.code.code(), "invalid_adapter_id");
    assert_eq!(
        envelope.metadata.get("input_length"),
        Some(&"3".to_string())
    );

    let Err(level_error) = Level::parse("verbose") else {
        return Err(PrimitiveError::InvalidLevel {
            input: "verbose".to_string(),
        });
    };

    let envelope: ErrorEnvelope = level_error.into();
    assert_eq!(envelope.code.code(), "invalid_level");
    assert_eq!(envelope.metadata.get("input"), Some(&"verbose".to_string()));

    Ok(())
}

#[test]
fn thresholds_admit_equal_or_more_severe_events() {
    assert!(Level::Warn.admits(Level::Warn));
    assert!(Level::Warn.admits(Level::Fatal));
    assert!(!Level::Warn.admits(Level::Info));
    assert!(!Level::Debug.admits(Level::Off));
    assert!(
        Level::ALL
            .iter()
            .all(|event| !Level::Off.admits(*event))
    );
}

#[test]
fn adapter_ids_are_trimmed() -> Result<(), PrimitiveError> {
    let id = AdapterId::parse("  app-file ")?;
    assert_eq!(id.as_str(), "app-file");
    Ok(())
}

#[test]
fn rotation_settings_parse_loosely() {
    assert_eq!(DateGranularity::parse(" Hour "), Some(DateGranularity::Hour));
    assert_eq!(DateGranularity::parse("week"), None);
    assert_eq!(SizeUnit::parse("MB").map(|unit| unit.to_bytes(2)), Some(2 << 20));
    assert_eq!(SizeUnit::Tb.to_bytes(u64::MAX), u64::MAX);
}
