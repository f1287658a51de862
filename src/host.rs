//! The host editor's "open file at location" capability.
//!
//! The embedded DevTools redirect "reveal source" requests to the host
//! editor. The host object is always passed in explicitly: Rust callers hand
//! a [`FrontendHost`] to [`reveal_in_editor`], and the JavaScript installed
//! by the `common-revealer` patch names its host object through
//! [`RevealerScript`].

/// A source position the DevTools want to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Revealable {
    pub ui_source_code: Option<UiSourceCode>,
    pub line_number: u32,
    pub column_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiSourceCode {
    pub url: String,
}

/// Location handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation<'a> {
    pub url: &'a str,
    pub line_number: u32,
    pub column_number: u32,
}

/// Host-provided editor capability.
pub trait FrontendHost {
    /// Open `location` in the host editor. Whatever the host does in
    /// response is its own business.
    fn open_in_editor(&self, location: &SourceLocation<'_>, omit_focus: bool);
}

/// Forward a reveal request to the host editor.
///
/// Returns whether the host was called; revealables without a source URL
/// have nothing to open.
pub fn reveal_in_editor<H: FrontendHost + ?Sized>(
    host: &H,
    revealable: Option<&Revealable>,
    omit_focus: bool,
) -> bool {
    let Some(revealable) = revealable else {
        return false;
    };
    let Some(source) = &revealable.ui_source_code else {
        return false;
    };
    if source.url.is_empty() {
        return false;
    }

    host.open_in_editor(
        &SourceLocation {
            url: &source.url,
            line_number: revealable.line_number,
            column_number: revealable.column_number,
        },
        omit_focus,
    );
    true
}

/// JavaScript equivalent of [`reveal_in_editor`], as installed into the
/// bundle's revealer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealerScript {
    /// Expression naming the host object in the bundle's global scope
    pub host_object: String,
}

impl Default for RevealerScript {
    fn default() -> Self {
        Self {
            host_object: "InspectorFrontendHost".to_string(),
        }
    }
}

impl RevealerScript {
    pub fn new(host_object: impl Into<String>) -> Self {
        Self {
            host_object: host_object.into(),
        }
    }

    /// Signature line of the installed function.
    pub const SIGNATURE: &'static str = "function revealInVSCode(revealable, omitFocus) {";

    /// Render the function head and body without its closing brace.
    ///
    /// The upstream function's own body and closing brace follow the
    /// inserted text, so they become unreachable after the `return`.
    pub fn render_open(&self) -> String {
        format!(
            "{signature}\n\
             \x20   if (revealable && revealable.uiSourceCode && revealable.uiSourceCode._url) {{\n\
             \x20       {host}.openInEditor(revealable.uiSourceCode._url, revealable.lineNumber, revealable.columnNumber, omitFocus);\n\
             \x20   }}\n\
             \x20   return Promise.resolve();\n",
            signature = Self::SIGNATURE,
            host = self.host_object,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHost {
        calls: RefCell<Vec<(String, u32, u32, bool)>>,
    }

    impl FrontendHost for RecordingHost {
        fn open_in_editor(&self, location: &SourceLocation<'_>, omit_focus: bool) {
            self.calls.borrow_mut().push((
                location.url.to_string(),
                location.line_number,
                location.column_number,
                omit_focus,
            ));
        }
    }

    fn bing() -> Revealable {
        Revealable {
            ui_source_code: Some(UiSourceCode {
                url: "http://bing.com".to_string(),
            }),
            line_number: 0,
            column_number: 0,
        }
    }

    #[test]
    fn reveal_calls_open_in_editor() {
        let host = RecordingHost::default();
        assert!(reveal_in_editor(&host, Some(&bing()), false));
        assert_eq!(
            host.calls.borrow().as_slice(),
            &[("http://bing.com".to_string(), 0, 0, false)]
        );
    }

    #[test]
    fn reveal_forwards_position_and_focus() {
        let host = RecordingHost::default();
        let revealable = Revealable {
            line_number: 41,
            column_number: 7,
            ..bing()
        };
        reveal_in_editor(&host, Some(&revealable), true);
        assert_eq!(host.calls.borrow()[0], ("http://bing.com".to_string(), 41, 7, true));
    }

    #[test]
    fn nothing_to_reveal_skips_host() {
        let host = RecordingHost::default();
        assert!(!reveal_in_editor(&host, None, false));
        assert!(!reveal_in_editor(&host, Some(&Revealable::default()), false));
        let no_url = Revealable {
            ui_source_code: Some(UiSourceCode::default()),
            ..Revealable::default()
        };
        assert!(!reveal_in_editor(&host, Some(&no_url), false));
        assert!(host.calls.borrow().is_empty());
    }

    #[test]
    fn script_uses_injected_host_object() {
        let script = RevealerScript::new("window.vscodeHost").render_open();
        assert!(script.starts_with(RevealerScript::SIGNATURE));
        assert!(script.contains("window.vscodeHost.openInEditor(revealable.uiSourceCode._url"));
        assert!(script.ends_with("return Promise.resolve();\n"));
        assert!(!script.trim_end().ends_with('}'));
    }
}
