use std::fs;

use kubeconf::{load, load_all, merge, save, ConfigError};

#[test]
fn test_merge_then_switch_then_save() {
    //given
    let sources = load_all(&["data/dev.yaml", "data/prod.yaml"]).expect("load");
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("config");

    //when
    let merged = merge(&sources);
    assert_eq!(merged.current_context, "dev");

    let switched = merged.switch_context("prod").expect("switch");
    save(&switched, &target).expect("save");

    //then
    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("current-context: prod"));

    let reloaded = load(&target).expect("reload");
    assert_eq!(reloaded.current_context, "prod");
    assert_eq!(
        reloaded.context_names().into_iter().collect::<Vec<_>>(),
        vec!["dev", "prod"]
    );
    assert!(reloaded.clusters.contains_key("clusterA"));
    assert!(reloaded.clusters.contains_key("clusterB"));
    assert_eq!(reloaded.users, merged.users);
    assert!(reloaded.validate().is_ok());
}

#[test]
fn test_failed_switch_leaves_file_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("config");
    fs::copy("data/dev.yaml", &target).unwrap();
    let before = fs::read(&target).unwrap();

    let kc = load(&target).expect("load");
    let err = kc.switch_context("prod").unwrap_err();

    assert!(matches!(err, ConfigError::UnknownContext { .. }));
    assert_eq!(fs::read(&target).unwrap(), before);
}

#[test]
fn test_load_all_fails_fast() {
    let err = load_all(&["data/dev.yaml", "data/missing.yaml", "data/prod.yaml"]).unwrap_err();

    match err {
        ConfigError::NotFound { path } => assert!(path.ends_with("missing.yaml")),
        other => panic!("unexpected error: {other:?}"),
    }
}
