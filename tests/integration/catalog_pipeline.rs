//! Whole-file pipelines: ordering, non-interference, dependency skips.

use super::fixture;
use devtools_simpleview::patch::{simple_view, PatchCatalog, PatchStatus, SimpleViewOptions};

const FILES: &[&str] = &[
    "common/common.js",
    "quick_open/quick_open.js",
    "ui/ui.js",
    "main/main.js",
    "browser_debugger/browser_debugger.js",
    "shell.js",
    "components/components.js",
    "themes/themes.js",
    "host/host.js",
    "root/root.js",
    "root/root-legacy.js",
];

fn catalog() -> PatchCatalog {
    simple_view::catalog(&SimpleViewOptions::default()).unwrap()
}

#[test]
fn catalog_targets_exactly_the_fixture_files() {
    let catalog = catalog();
    let mut files: Vec<_> = catalog.files().collect();
    let mut expected = FILES.to_vec();
    files.sort_unstable();
    expected.sort_unstable();
    assert_eq!(files, expected);
}

#[test]
fn every_file_patches_completely() {
    let catalog = catalog();
    for file in FILES {
        let report = catalog.apply_file(file, &fixture(file)).unwrap();
        assert!(report.changed, "{file}");
        assert!(
            report.is_complete(),
            "{file}: {:?}",
            report.not_applied().collect::<Vec<_>>()
        );
        assert!(report
            .patches
            .iter()
            .all(|p| p.status == PatchStatus::Applied));
    }
}

#[test]
fn rerun_on_patched_output_changes_nothing() {
    let catalog = catalog();
    for file in FILES {
        let first = catalog.apply_file(file, &fixture(file)).unwrap();
        let second = catalog.apply_file(file, &first.text).unwrap();
        assert!(!second.changed, "{file}");
        assert_eq!(second.text, first.text, "{file}");
        assert!(second
            .patches
            .iter()
            .all(|p| p.status == PatchStatus::AlreadyApplied));
    }
}

#[test]
fn same_file_patches_commute() {
    let catalog = catalog();
    for file in ["ui/ui.js", "shell.js", "quick_open/quick_open.js"] {
        let input = fixture(file);
        let patches = catalog.patches_for(file);
        for (i, a) in patches.iter().enumerate() {
            for b in &patches[i + 1..] {
                let ab = b.patch(&a.patch(&input).unwrap().unwrap()).unwrap();
                let ba = a.patch(&b.patch(&input).unwrap().unwrap()).unwrap();
                assert!(ab.is_some(), "{} then {}", a.id(), b.id());
                assert_eq!(ab, ba, "{} and {} interfere", a.id(), b.id());
            }
        }
    }
}

#[test]
fn failed_requirement_skips_dependent() {
    let catalog = catalog();
    let drifted = fixture("root/root.js").replace("var Runtime$1", "const RuntimeModule");
    let report = catalog.apply_file("root/root.js", &drifted).unwrap();

    assert!(matches!(
        report.status_of("create-extension-settings"),
        Some(PatchStatus::NotApplied { .. })
    ));
    assert_eq!(
        report.status_of("port-settings"),
        Some(&PatchStatus::Skipped {
            missing: vec!["create-extension-settings".to_string()]
        })
    );
    assert!(!report.changed);
    assert_eq!(report.text, drifted);
}

#[test]
fn mismatch_does_not_stop_independent_patches() {
    let catalog = catalog();
    let drifted = fixture("ui/ui.js").replace("this._defaultTab = defaultTab;", "");
    let report = catalog.apply_file("ui/ui.js", &drifted).unwrap();

    let not_applied: Vec<_> = report.not_applied().map(|p| p.id.as_str()).collect();
    assert_eq!(not_applied, ["default-tab-reset"]);
    assert!(report.text.contains("_showDrawer(focus) { return false;"));
    assert!(report.text.contains("if(!tab){return;}"));
}

#[test]
fn composite_patch_never_leaks_partial_output() {
    let catalog = catalog();
    // second step's anchor gone; first step must not survive either
    let drifted = fixture("quick_open/quick_open.js").replace("action.category()", "action.group()");
    let report = catalog.apply_file("quick_open/quick_open.js", &drifted).unwrap();

    match report.status_of("command-menu-network-filter") {
        Some(PatchStatus::NotApplied { reason }) => assert!(reason.starts_with("step 2/2")),
        other => panic!("unexpected status {other:?}"),
    }
    assert!(!report.text.contains("networkEnabled"));
    assert_eq!(
        report.status_of("quick-open-disable"),
        Some(&PatchStatus::Applied)
    );
}

#[test]
fn report_serializes_per_patch_status() {
    let catalog = catalog();
    let report = catalog
        .apply_file("host/host.js", "class Host {}\n")
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["file"], "host/host.js");
    assert_eq!(json["changed"], false);
    assert_eq!(json["patches"][0]["id"], "remove-preference-noop");
    assert_eq!(json["patches"][0]["status"], "not-applied");
    assert!(json["patches"][0]["reason"]
        .as_str()
        .unwrap()
        .contains("removePreference"));
    assert!(json.get("text").is_none());
}
