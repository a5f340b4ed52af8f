// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn defaults_when_table_is_empty() {
    let config: ServiceConfig = toml::from_str("").unwrap();
    assert_eq!(config, ServiceConfig::default());
    assert_eq!(config.default_priorities, 1);
    assert_eq!(config.idle_wait, Duration::from_millis(100));
}

#[test]
fn parses_humantime_durations() {
    let config: ServiceConfig = toml::from_str(
        r#"
        name = "refresh"
        default_priorities = 3
        idle_wait = "250ms"
        "#,
    )
    .unwrap();
    assert_eq!(config.name, "refresh");
    assert_eq!(config.default_priorities, 3);
    assert_eq!(config.idle_wait, Duration::from_millis(250));
}

#[test]
fn rejects_malformed_duration() {
    let result: Result<ServiceConfig, _> = toml::from_str(r#"idle_wait = "soon""#);
    assert!(result.is_err());
}

#[test]
fn builders_override_defaults() {
    let config = ServiceConfig::new("worker-0")
        .with_default_priorities(2)
        .with_idle_wait(Duration::from_millis(5));
    assert_eq!(config.name, "worker-0");
    assert_eq!(config.default_priorities, 2);
    assert_eq!(config.idle_wait, Duration::from_millis(5));
}

#[test]
#[should_panic(expected = "at least one priority bucket")]
fn zero_priorities_is_rejected() {
    let _ = ServiceConfig::new("bad").with_default_priorities(0);
}

#[test]
fn zero_priorities_in_toml_is_rejected() {
    let err = toml::from_str::<ServiceConfig>("default_priorities = 0").unwrap_err();
    assert!(err.to_string().contains("at least one priority bucket"), "{err}");
}
