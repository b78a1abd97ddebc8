use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_local_json_server() {
    let settings = Settings::default();
    assert_eq!(settings.base_url, "http://localhost:3001");
    assert_eq!(settings.notification_secs, 5);
    assert_eq!(settings.id_assignment, IdAssignment::Server);
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
base_url = "http://phonebook.internal:8080/api"
notification_secs = 2
id_assignment = "local"
request_timeout_secs = 10
"#,
    );

    assert_eq!(settings.base_url, "http://phonebook.internal:8080/api");
    assert_eq!(settings.notification_secs, 2);
    assert_eq!(settings.id_assignment, IdAssignment::LocalMaxPlusOne);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(10)));
}

#[test]
fn unknown_or_malformed_values_are_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "id_assignment = \"random\"\nnotification_secs = -1");
    assert_eq!(settings, Settings::default());

    apply_file_overrides(&mut settings, "base_url = ");
    assert_eq!(settings, Settings::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("PHONEBOOK_BASE_URL", "http://plain:1"),
            ("APP__BASE_URL", "http://prefixed:2"),
            ("APP__NOTIFICATION_SECS", "7"),
            ("APP__ID_ASSIGNMENT", "server"),
        ]),
    );
    assert_eq!(settings.base_url, "http://prefixed:2");
    assert_eq!(settings.notification_secs, 7);
    assert_eq!(settings.id_assignment, IdAssignment::Server);
}

#[test]
fn options_carry_notification_duration() {
    let settings = Settings {
        notification_secs: 3,
        id_assignment: IdAssignment::LocalMaxPlusOne,
        ..Settings::default()
    };
    let options = settings.phonebook_options();
    assert_eq!(options.notification_duration, Duration::from_secs(3));
    assert_eq!(options.id_assignment, IdAssignment::LocalMaxPlusOne);
}
