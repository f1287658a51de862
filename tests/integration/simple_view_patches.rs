//! Every built-in patch against the upstream fixture of its file.

use super::fixture;
use devtools_simpleview::patch::{simple_view, PatchCatalog, PatchOutcome, SimpleViewOptions};

/// (patch id, file, fragments the patched output must contain)
const EXPECTED: &[(&str, &str, &[&str])] = &[
    (
        "common-revealer",
        "common/common.js",
        &["let reveal = function revealInVSCode(revealable, omitFocus) {"],
    ),
    (
        "quick-open-disable",
        "quick_open/quick_open.js",
        &["handleAction(context, actionId) { actionId = null; switch(actionId)"],
    ),
    (
        "command-menu-network-filter",
        "quick_open/quick_open.js",
        &["Root.Runtime.extensionSettings.get('networkEnabled');"],
    ),
    (
        "inspector-view-show-drawer",
        "ui/ui.js",
        &["_showDrawer(focus) { return false;"],
    ),
    (
        "drawer-tab-location",
        "ui/ui.js",
        &["this._showDrawer.bind(this, false), 'drawer-view', true, true, 'network.blocked-urls'"],
    ),
    ("set-tab-icon-guard", "ui/ui.js", &["if(!tab){return;}"]),
    (
        "append-tab-allowlist",
        "ui/ui.js",
        &["appendTabOverride(id, tabTitle, view, tabTooltip, userGesture, isCloseable, index) {"],
    ),
    (
        "show-request-blocking-tab",
        "ui/ui.js",
        &["if(!view.isCloseable()||id==='network.blocked-urls')"],
    ),
    (
        "persist-request-blocking-tab",
        "ui/ui.js",
        &["this._closeable=id==='network.blocked-urls'?false:closeable;"],
    ),
    ("default-tab-reset", "ui/ui.js", &["this._defaultTab=undefined;"]),
    (
        "main-view-more-tools",
        "main/main.js",
        &["const moreTools = { defaultSection: () => ({ appendItem: () => {} }) };"],
    ),
    (
        "remove-break-on-menu",
        "browser_debugger/browser_debugger.js",
        &["\"Break on\" submenu removed"],
    ),
    (
        "inspector-common-css",
        "shell.js",
        &[r".toolbar-button[aria-label='Toggle screencast'] {\n            visibility: visible !important;"],
    ),
    (
        "inspector-common-network-css",
        "shell.js",
        &[r".toolbar-button[aria-label='Export HAR...'] {\n            display: none !important;"],
    ),
    (
        "inspector-common-context-menu-css",
        "shell.js",
        &[r".soft-context-menu-item[aria-label='Save as...'] {\n            display: none !important;"],
    ),
    (
        "inspector-common-css-right-toolbar",
        "shell.js",
        &[r".tabbed-pane-right-toolbar {\n            visibility: hidden !important;\n        }"],
    ),
    (
        "inspector-common-css-tab-slider",
        "shell.js",
        &[r".tabbed-pane-tab-slider {\n            display: none !important;\n        }"],
    ),
    (
        "remove-unsupported-reveal-menu",
        "components/components.js",
        &["if(destination === \"Elements panel\")"],
    ),
    (
        "theme-from-extension-settings",
        "themes/themes.js",
        &["Root.Runtime.extensionSettings.get('theme');"],
    ),
    ("remove-preference-noop", "host/host.js", &["removePreference(name){return;}"]),
    (
        "create-extension-settings",
        "root/root.js",
        &["extensionSettings:extensionSettings"],
    ),
    (
        "port-settings",
        "root/root.js",
        &["this.getNetworkSetting", "this.getThemesSetting"],
    ),
    (
        "create-extension-settings-legacy",
        "root/root-legacy.js",
        &["Root.Runtime.extensionSettings"],
    ),
];

fn catalog() -> PatchCatalog {
    simple_view::catalog(&SimpleViewOptions::default()).unwrap()
}

#[test]
fn expected_table_covers_catalog() {
    let catalog = catalog();
    assert_eq!(EXPECTED.len(), catalog.len());
    for (id, file, _) in EXPECTED {
        let patch = catalog.get(id).unwrap_or_else(|| panic!("{id} missing"));
        assert_eq!(patch.file(), *file, "{id}");
    }
}

#[test]
fn every_patch_applies_to_its_fixture() {
    let catalog = catalog();
    for (id, file, fragments) in EXPECTED {
        let input = fixture(file);
        let output = catalog
            .get(id)
            .unwrap()
            .patch(&input)
            .unwrap()
            .unwrap_or_else(|| panic!("{id} did not apply to {file}"));
        assert_ne!(output, input, "{id}");
        for fragment in *fragments {
            assert!(output.contains(fragment), "{id}: missing {fragment}");
        }
    }
}

#[test]
fn every_patch_is_idempotent() {
    let catalog = catalog();
    for (id, file, _) in EXPECTED {
        let patch = catalog.get(id).unwrap();
        let once = patch.patch(&fixture(file)).unwrap().unwrap();
        assert_eq!(patch.apply(&once).unwrap(), PatchOutcome::AlreadyApplied, "{id}");
        assert_eq!(patch.patch(&once).unwrap().as_deref(), Some(once.as_str()), "{id}");
    }
}

#[test]
fn every_patch_returns_sentinel_on_foreign_text() {
    let catalog = catalog();
    let foreign = "// upstream rewrote this module\nexport const nothing = 0;\n";
    for (id, _, _) in EXPECTED {
        let patch = catalog.get(id).unwrap();
        assert_eq!(patch.patch(foreign).unwrap(), None, "{id}");
        assert!(matches!(
            patch.apply(foreign).unwrap(),
            PatchOutcome::NotApplied(_)
        ));
    }
}

#[test]
fn altered_signature_is_not_applied() {
    let catalog = catalog();
    let drifted = fixture("ui/ui.js").replace("_showDrawer(focus) {", "_showDrawer(shouldFocus) {");
    let patch = catalog.get("inspector-view-show-drawer").unwrap();
    assert_eq!(patch.patch(&drifted).unwrap(), None);
}

#[test]
fn show_drawer_keeps_signature_and_neighbours() {
    let catalog = catalog();
    let input = fixture("ui/ui.js");
    let output = catalog
        .get("inspector-view-show-drawer")
        .unwrap()
        .patch(&input)
        .unwrap()
        .unwrap();

    assert_eq!(
        output,
        input.replacen("_showDrawer(focus) {", "_showDrawer(focus) { return false;", 1)
    );
    assert!(output.contains("  drawerVisible() {\n    return this._drawerTabbedPane.isShowing();\n  }"));
}

#[test]
fn screencast_rule_leaves_other_rules_untouched() {
    let catalog = catalog();
    let input = fixture("shell.js");
    let output = catalog
        .get("inspector-common-css")
        .unwrap()
        .patch(&input)
        .unwrap()
        .unwrap();

    let anchor = ":host-context(.platform-mac) .monospace,";
    let at = input.find(anchor).unwrap();
    let inserted = output.len() - input.len();

    assert_eq!(&output[..at], &input[..at]);
    assert_eq!(&output[at + inserted..], &input[at..]);

    let block = &output[at..at + inserted];
    assert!(block.starts_with(
        r".toolbar-button[aria-label='Toggle screencast'] {\n            visibility: visible !important;\n        }"
    ));
    assert!(!block.contains('\n'), "escaped newlines only inside JS strings");

    // Removing the inserted block gives back the input byte for byte
    assert_eq!(output.replacen(block, "", 1), input);
}

#[test]
fn break_on_submenu_is_gone() {
    let catalog = catalog();
    let output = catalog
        .get("remove-break-on-menu")
        .unwrap()
        .patch(&fixture("browser_debugger/browser_debugger.js"))
        .unwrap()
        .unwrap();
    assert!(!output.contains("const breakpointsMenu"));
    assert!(output.contains("function toggleBreakpoint(type) {"));
}

#[test]
fn reveal_menu_keeps_push_body() {
    let catalog = catalog();
    let output = catalog
        .get("remove-unsupported-reveal-menu")
        .unwrap()
        .patch(&fixture("components/components.js"))
        .unwrap()
        .unwrap();
    assert!(output.contains(
        "if(destination === \"Elements panel\"){result.push({\n        section: 'reveal',"
    ));
    assert!(output.contains("handler: () => Common.Revealer.reveal(revealable)\n      });}"));
}

#[test]
fn allowlist_is_rendered_into_append_tab() {
    let options = SimpleViewOptions {
        allowed_tabs: vec!["elements".to_string(), "network".to_string()],
        ..SimpleViewOptions::default()
    };
    let catalog = simple_view::catalog(&options).unwrap();
    let output = catalog
        .get("append-tab-allowlist")
        .unwrap()
        .patch(&fixture("ui/ui.js"))
        .unwrap()
        .unwrap();
    assert!(output.contains("if (id !== 'elements' && id !== 'network') {\n      return;\n    }"));
    assert!(output.contains(
        "this.appendTabOverride(id, tabTitle, view, tabTooltip, userGesture, isCloseable, index);"
    ));
}

#[test]
fn revealer_calls_configured_host() {
    let options = SimpleViewOptions {
        host_object: "window.vscodeHost".to_string(),
        ..SimpleViewOptions::default()
    };
    let catalog = simple_view::catalog(&options).unwrap();
    let output = catalog
        .get("common-revealer")
        .unwrap()
        .patch(&fixture("common/common.js"))
        .unwrap()
        .unwrap();
    assert!(output.contains("window.vscodeHost.openInEditor(revealable.uiSourceCode._url"));
    assert!(!output.contains("InspectorFrontendHost.openInEditor"));
}
