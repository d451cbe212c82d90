// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use sdfinder::config::load_config;
use sdfinder::registry::FINDER_REGISTRY;
use sdfinder::{Executor, ExecutorState, InputKind};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_executor_from_config_file() {
    let file = write_config(
        r#"
enabled: [hackertarget, crtsh, sonarsearch/reverse, not-a-source]
sources:
  crtsh:
    timeout: 20s
    worker: 3
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.get("crtsh").unwrap().timeout, Duration::from_secs(20));

    let executor = Executor::from_config(&config, &FINDER_REGISTRY).unwrap();
    assert_eq!(executor.state(), ExecutorState::Idle);
    assert_eq!(
        executor.queriers().names(None),
        vec!["hackertarget", "crtsh", "sonarsearch/reverse"]
    );
    assert_eq!(
        executor.queriers().names(Some(InputKind::Ip)),
        vec!["sonarsearch/reverse"]
    );
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let file = write_config(
        r#"
enabled: [crtsh]
sources:
  crtsh:
    qps: 0
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("crtsh"));
}

#[test]
fn test_unparseable_duration_is_rejected() {
    let file = write_config("enabled: [crtsh]\nsources:\n  crtsh:\n    timeout: soon\n");
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_source_with_unusable_qps_is_excluded() {
    let file = write_config(
        r#"
enabled: [hackertarget, crtsh]
sources:
  crtsh:
    qps: 1.0e-20
"#,
    );

    let config = load_config(file.path()).unwrap();
    let executor = Executor::from_config(&config, &FINDER_REGISTRY).unwrap();
    assert!(!executor.queriers().is_empty());
    assert_eq!(executor.queriers().len(), 1);
    assert_eq!(executor.queriers().names(None), vec!["hackertarget"]);
}
