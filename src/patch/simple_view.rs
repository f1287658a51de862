//! The built-in simple-view patch set.
//!
//! Each function below builds one named patch against one file of the
//! DevTools front-end output directory. Anchors are deliberately long so a
//! stale upstream reports "not applied" instead of patching the wrong site.

use crate::host::RevealerScript;
use crate::patch::css::{render_block, CssNewline, CssRule};
use crate::patch::{NamedPatch, PatchCatalog};
use crate::transform::{MatchSpec, Replacement, Scope, SpecError, Transform};
use serde::Deserialize;

/// Drawer tab that stays visible and cannot be closed.
pub const REQUEST_BLOCKING_TAB: &str = "network.blocked-urls";

/// Tabs the simple view keeps.
pub const DEFAULT_ALLOWED_TABS: &[&str] = &[
    "elements",
    "Styles",
    "Computed",
    "accessibility.view",
    "console-view",
    "network",
    "network.blocked-urls",
    "network.search-network-tab",
    "headers",
    "preview",
    "response",
    "timing",
    "initiator",
    "cookies",
    "eventSource",
    "webSocketFrames",
    "preferences",
    "workspace",
    "experiments",
    "blackbox",
    "devices",
    "throttling-conditions",
    "emulation-geolocations",
    "Shortcuts",
];

/// Knobs of the built-in catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimpleViewOptions {
    /// Tab ids `appendTab` still accepts
    pub allowed_tabs: Vec<String>,
    pub css_newline: CssNewline,
    /// Host object the revealer calls `openInEditor` on
    pub host_object: String,
}

impl Default for SimpleViewOptions {
    fn default() -> Self {
        Self {
            allowed_tabs: DEFAULT_ALLOWED_TABS.iter().map(|t| t.to_string()).collect(),
            css_newline: CssNewline::default(),
            host_object: RevealerScript::default().host_object,
        }
    }
}

/// Build the full simple-view catalog.
pub fn catalog(options: &SimpleViewOptions) -> Result<PatchCatalog, SpecError> {
    let patches = [
        common_revealer(options)?,
        quick_open_disable()?,
        command_menu_network_filter()?,
        inspector_view_show_drawer()?,
        drawer_tab_location()?,
        set_tab_icon_guard()?,
        append_tab_allowlist(options)?,
        show_request_blocking_tab()?,
        persist_request_blocking_tab()?,
        default_tab_reset()?,
        main_view_more_tools()?,
        remove_break_on_menu()?,
        inspector_common_css(options)?,
        inspector_common_network_css(options)?,
        inspector_common_context_menu_css(options)?,
        inspector_common_css_right_toolbar(options)?,
        inspector_common_css_tab_slider(options)?,
        remove_unsupported_reveal_menu()?,
        theme_from_extension_settings()?,
        remove_preference_noop()?,
        create_extension_settings()?,
        port_settings()?,
        create_extension_settings_legacy()?,
    ];

    let mut catalog = PatchCatalog::new();
    for patch in patches {
        catalog.push(patch)?;
    }
    Ok(catalog)
}

/// Pattern match with a literal replacement; no capture expansion.
fn pattern_to_text(pattern: &str, text: &str) -> Result<Transform, SpecError> {
    Transform::new(
        MatchSpec::pattern(pattern)?,
        Replacement::Literal(text.to_string()),
        Scope::First,
    )
}

fn common_revealer(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    let script = RevealerScript::new(options.host_object.as_str());
    let replacement = format!("let reveal = {}", script.render_open());
    Ok(NamedPatch::new("common-revealer", "common/common.js")
        .describe("Send reveal requests to the host editor")
        .step(Transform::literal(
            "let reveal = function(revealable, omitFocus) {",
            &replacement,
        )?)
        .marker(format!("let reveal = {}", RevealerScript::SIGNATURE)))
}

fn quick_open_disable() -> Result<NamedPatch, SpecError> {
    let replacement = "handleAction(context, actionId) { actionId = null; switch(actionId)";
    Ok(NamedPatch::new("quick-open-disable", "quick_open/quick_open.js")
        .describe("Turn the quick open and command menu shortcuts into no-ops")
        .step(pattern_to_text(
            r"handleAction\(context, actionId\)\s*\{\s*switch\s*\(actionId\)",
            replacement,
        )?)
        .marker(replacement))
}

fn command_menu_network_filter() -> Result<NamedPatch, SpecError> {
    let lookup = "const networkEnabled = Root.Runtime.extensionSettings.get('networkEnabled');";
    let filter = "if (!category || (!networkEnabled && category === 'Network'))";
    Ok(
        NamedPatch::new("command-menu-network-filter", "quick_open/quick_open.js")
            .describe("Hide Network commands unless the extension enabled networking")
            .step(Transform::pattern(
                r"attach\(\)\s*\{\s*const allCommands\s*=\s*[^;]+;",
                &format!("$0\n    {lookup}"),
            )?)
            .step(Transform::pattern(
                r"(const category\s*=\s*action\.category\(\);\s*)if\s*\(!category\)",
                &format!("${{1}}{filter}"),
            )?)
            .marker(lookup)
            .marker(filter),
    )
}

fn inspector_view_show_drawer() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("inspector-view-show-drawer", "ui/ui.js")
        .describe("Never open the drawer")
        .step(Transform::new(
            MatchSpec::literal("_showDrawer(focus) {")?,
            Replacement::insert_after(" return false;"),
            Scope::First,
        )?)
        .marker("_showDrawer(focus) { return false;"))
}

fn drawer_tab_location() -> Result<NamedPatch, SpecError> {
    let replacement = format!(
        "this._showDrawer.bind(this, false), 'drawer-view', true, true, '{REQUEST_BLOCKING_TAB}')"
    );
    Ok(NamedPatch::new("drawer-tab-location", "ui/ui.js")
        .describe("Make request blocking the drawer's default tab")
        .step(pattern_to_text(
            r"this\._showDrawer\.bind\(this,\s*false\),\s*'drawer-view',\s*true,\s*true\)",
            &replacement,
        )?)
        .marker(replacement))
}

fn set_tab_icon_guard() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("set-tab-icon-guard", "ui/ui.js")
        .describe("Ignore icon updates for tabs that were never appended")
        .step(pattern_to_text(
            r"setTabIcon\(id,\s*icon\)\s*\{\s*const tab\s*=\s*this\._tabsById\.get\(id\);",
            "setTabIcon(id, icon) {const tab = this._tabsById.get(id); if(!tab){return;}",
        )?)
        .marker("if(!tab){return;}"))
}

/// Condition that is true for tab ids outside the allowlist.
fn blocked_tab_condition(allowed_tabs: &[String]) -> String {
    if allowed_tabs.is_empty() {
        return "true".to_string();
    }
    allowed_tabs
        .iter()
        .map(|tab| format!("id !== '{}'", tab.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(" && ")
}

fn append_tab_allowlist(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    const PARAMS: &str = "id, tabTitle, view, tabTooltip, userGesture, isCloseable, index";
    let replacement = format!(
        "appendTab({PARAMS}) {{\n    if ({condition}) {{\n      return;\n    }}\n    \
         this.appendTabOverride({PARAMS});\n  }}\n\n  appendTabOverride({PARAMS}) {{",
        condition = blocked_tab_condition(&options.allowed_tabs),
    );
    Ok(NamedPatch::new("append-tab-allowlist", "ui/ui.js")
        .describe("Only append tabs on the simple-view allowlist")
        .step(pattern_to_text(
            r"appendTab\(id,\s*tabTitle,\s*view,\s*tabTooltip,\s*userGesture,\s*isCloseable,\s*index\)\s*\{",
            &replacement,
        )?)
        .marker(format!("appendTabOverride({PARAMS}) {{")))
}

fn show_request_blocking_tab() -> Result<NamedPatch, SpecError> {
    let replacement = format!("if(!view.isCloseable()||id==='{REQUEST_BLOCKING_TAB}')");
    Ok(NamedPatch::new("show-request-blocking-tab", "ui/ui.js")
        .describe("Keep the request blocking tab out of the closeable-tab setting")
        .step(pattern_to_text(r"if\s*\(!view\.isCloseable\(\)\)", &replacement)?)
        .marker(replacement))
}

fn persist_request_blocking_tab() -> Result<NamedPatch, SpecError> {
    let replacement = format!("this._closeable=id==='{REQUEST_BLOCKING_TAB}'?false:closeable;");
    Ok(NamedPatch::new("persist-request-blocking-tab", "ui/ui.js")
        .describe("Remove the close button from the request blocking tab")
        .step(pattern_to_text(r"this\._closeable\s*=\s*closeable;", &replacement)?)
        .marker(replacement))
}

fn default_tab_reset() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("default-tab-reset", "ui/ui.js")
        .describe("Drop tabbed locations' default tab")
        .step(pattern_to_text(
            r"this\._defaultTab\s*=\s*defaultTab;",
            "this._defaultTab=undefined;",
        )?)
        .marker("this._defaultTab=undefined;"))
}

fn main_view_more_tools() -> Result<NamedPatch, SpecError> {
    let replacement = "const moreTools = { defaultSection: () => ({ appendItem: () => {} }) };";
    Ok(NamedPatch::new("main-view-more-tools", "main/main.js")
        .describe("Empty the main menu's More tools submenu")
        .step(pattern_to_text(r"const moreTools\s*=\s*[^;]+;", replacement)?)
        .marker(replacement))
}

fn remove_break_on_menu() -> Result<NamedPatch, SpecError> {
    let replacement = "/* \"Break on\" submenu removed */";
    Ok(
        NamedPatch::new("remove-break-on-menu", "browser_debugger/browser_debugger.js")
            .describe("Remove the DOM breakpoint submenu from the elements context menu")
            .step(pattern_to_text(
                r"(?s)const breakpointsMenu\s*=\s*contextMenu\.debugSection\(\)\.appendSubMenuItem\(.*?breakpointsMenu\.defaultSection\(\)\.appendCheckboxItem\(.*?\);\s*\}",
                replacement,
            )?)
            .marker(replacement),
    )
}

/// Insert `rules` in front of `anchor` in the bundled stylesheets.
fn css_patch(
    id: &str,
    description: &str,
    anchor: &str,
    rules: &[CssRule],
    newline: CssNewline,
) -> Result<NamedPatch, SpecError> {
    let block = render_block(rules, newline);
    let mut patch = NamedPatch::new(id, "shell.js")
        .describe(description)
        .step(Transform::insert_before(anchor, &block)?);
    if let Some(first) = rules.first() {
        patch = patch.marker(first.render(newline));
    }
    Ok(patch)
}

fn inspector_common_css(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    css_patch(
        "inspector-common-css",
        "Show the screencast toggle and hide window-level toolbar buttons",
        ":host-context(.platform-mac) .monospace,",
        &[
            CssRule::visible(".toolbar-button[aria-label='Toggle screencast']"),
            CssRule::hidden(".toolbar-button[aria-label='Customize and control DevTools']"),
            CssRule::hidden(".toolbar-button[aria-label='Close']"),
        ],
        options.css_newline,
    )
}

fn inspector_common_network_css(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    css_patch(
        "inspector-common-network-css",
        "Hide HAR import and export in the network panel",
        ":host-context(.platform-windows) .monospace,",
        &[
            CssRule::hidden(".toolbar-button[aria-label='Export HAR...']"),
            CssRule::hidden(".toolbar-button[aria-label='Import HAR file...']"),
        ],
        options.css_newline,
    )
}

fn inspector_common_context_menu_css(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    css_patch(
        "inspector-common-context-menu-css",
        "Hide context menu items the host cannot serve",
        ".soft-context-menu-item {",
        &[
            CssRule::hidden(".soft-context-menu-item[aria-label='Save as...']"),
            CssRule::hidden(".soft-context-menu-item[aria-label='Open in new tab']"),
            CssRule::hidden(".soft-context-menu-item[aria-label='Reveal in Sources panel']"),
        ],
        options.css_newline,
    )
}

fn inspector_common_css_right_toolbar(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    css_patch(
        "inspector-common-css-right-toolbar",
        "Hide the tabbed pane's right toolbar",
        ".tabbed-pane-right-toolbar {",
        &[CssRule::invisible(".tabbed-pane-right-toolbar")],
        options.css_newline,
    )
}

fn inspector_common_css_tab_slider(options: &SimpleViewOptions) -> Result<NamedPatch, SpecError> {
    css_patch(
        "inspector-common-css-tab-slider",
        "Hide the selected-tab slider",
        ".tabbed-pane-tab-slider {",
        &[CssRule::hidden(".tabbed-pane-tab-slider")],
        options.css_newline,
    )
}

fn remove_unsupported_reveal_menu() -> Result<NamedPatch, SpecError> {
    Ok(
        NamedPatch::new("remove-unsupported-reveal-menu", "components/components.js")
            .describe("Offer \"Reveal in\" only for the elements panel")
            .step(Transform::pattern(
                r"(?s)(const destination\s*=\s*Common\.Revealer\.revealDestination\(revealable\);\s*)(result\.push\(\{.*?\}\);)",
                r#"${1}if(destination === "Elements panel"){${2}}"#,
            )?)
            .marker(r#"if(destination === "Elements panel"){"#),
    )
}

fn theme_from_extension_settings() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("theme-from-extension-settings", "themes/themes.js")
        .describe("Take the theme from the extension settings")
        .step(pattern_to_text(
            r"this\._themeName\s*=\s*setting\.get\(\)[^;]*;",
            "this._themeName = Root.Runtime.extensionSettings.get('theme');",
        )?)
        .marker("Root.Runtime.extensionSettings.get('theme');"))
}

fn remove_preference_noop() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("remove-preference-noop", "host/host.js")
        .describe("Keep preferences when DevTools asks to remove them")
        .step(pattern_to_text(
            r"removePreference\(name\)\s*\{\s*delete window\.localStorage\[name\];\s*\}",
            "removePreference(name){return;}",
        )?)
        .marker("removePreference(name){return;}"))
}

fn create_extension_settings() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("create-extension-settings", "root/root.js")
        .describe("Export an extensionSettings map from the root module")
        .step(Transform::pattern(
            r"(var Runtime\$1\s*=\s*/\*#__PURE__\*/Object\.freeze\(\{__proto__:null,Runtime:Runtime,)",
            "const extensionSettings = new Map();\n${1}extensionSettings:extensionSettings,",
        )?)
        .marker("extensionSettings:extensionSettings"))
}

const SETTINGS_READERS: &str = "getNetworkSetting() {
    const networkEnabled = new URLSearchParams(self.location.search).get('networkEnabled');
    extensionSettings.set('networkEnabled', networkEnabled === 'true');
  }

  getThemesSetting() {
    const theme = new URLSearchParams(self.location.search).get('theme');
    extensionSettings.set('theme', theme === 'dark' ? 'dark' : 'default');
  }

  ";

fn port_settings() -> Result<NamedPatch, SpecError> {
    Ok(NamedPatch::new("port-settings", "root/root.js")
        .describe("Fill extensionSettings from the launch query string")
        .requires("create-extension-settings")
        .step(Transform::insert_before(
            "constructor(descriptors) {",
            SETTINGS_READERS,
        )?)
        .step(Transform::new(
            MatchSpec::pattern(r"constructor\(descriptors\)\s*\{")?,
            Replacement::insert_after("\n    this.getNetworkSetting();\n    this.getThemesSetting();"),
            Scope::First,
        )?)
        .marker("this.getNetworkSetting();")
        .marker("this.getThemesSetting();"))
}

fn create_extension_settings_legacy() -> Result<NamedPatch, SpecError> {
    Ok(
        NamedPatch::new("create-extension-settings-legacy", "root/root-legacy.js")
            .describe("Expose extensionSettings on the legacy Root.Runtime global")
            .step(Transform::pattern(
                r"Root\.Runtime\s*=\s*RootModule\.Runtime\.Runtime;",
                "$0\nRoot.Runtime.extensionSettings = RootModule.Runtime.extensionSettings;",
            )?)
            .marker("Root.Runtime.extensionSettings = RootModule.Runtime.extensionSettings;"),
    )
}
