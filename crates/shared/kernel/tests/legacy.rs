use serde_json::json;
use strata_kernel::SettingsError;
use strata_kernel::domain::Settings;
use strata_kernel::legacy::{NamedSetting, apply_overrides, parse_named_list};

#[test]
fn known_names_are_applied_and_unknown_names_skipped() {
    let mut settings = Settings::default();
    let entries = parse_named_list(json!([
        { "name": "DEBUG", "value": true },
        { "name": "Mongo_Url", "value": "mongodb://override/abc" },
        { "name": "NOT_A_SETTING", "value": 1 },
        { "name": "ITSM", "value": "true" }
    ]))
    .expect("well-formed list");

    let report = apply_overrides(&mut settings, &entries).expect("overrides apply");

    assert_eq!(report.applied, vec!["debug", "mongo_url", "itsm"]);
    assert_eq!(report.skipped, vec!["NOT_A_SETTING"]);
    assert!(settings.debug);
    assert!(settings.itsm, "string booleans are coerced");
    assert_eq!(settings.mongo_url, "mongodb://override/abc");
    assert_eq!(settings.db_name, Settings::default().db_name);
}

#[test]
fn later_entries_for_the_same_field_win() {
    let mut settings = Settings::default();
    let entries = [NamedSetting::new("redis_port", 6380), NamedSetting::new("REDIS_PORT", "6381")];

    apply_overrides(&mut settings, &entries).expect("overrides apply");
    assert_eq!(settings.redis_port, 6381);
}

#[test]
fn optional_fields_can_be_cleared() {
    let mut settings = Settings { media_url: Some("/media/".to_owned()), ..Settings::default() };

    apply_overrides(&mut settings, &[NamedSetting::new("media_url", serde_json::Value::Null)])
        .expect("overrides apply");
    assert_eq!(settings.media_url, None);
}

#[test]
fn uncoercible_value_leaves_settings_untouched() {
    let mut settings = Settings::default();
    let entries = [NamedSetting::new("debug", true), NamedSetting::new("db_port", "abc")];

    let err = apply_overrides(&mut settings, &entries).expect_err("bad port must fail");
    assert!(matches!(err, SettingsError::Config { .. }), "unexpected error: {err}");
    assert_eq!(settings, Settings::default());
}

#[test]
fn invalid_result_leaves_settings_untouched() {
    let mut settings = Settings::default();
    let entries = [NamedSetting::new("nccm", true), NamedSetting::new("log_level", "chatty")];

    let err = apply_overrides(&mut settings, &entries).expect_err("bad level must fail");
    assert!(matches!(err, SettingsError::Validation { .. }), "unexpected error: {err}");
    assert!(!settings.nccm);
}
