//! CSS override blocks injected into stylesheet-bearing bundles.
//!
//! Stylesheets ship inside the bundle as JavaScript string literals, so in a
//! release bundle a line break must be written as the two-character escape
//! `\n` rather than a real newline.

use serde::Deserialize;

/// How line breaks are written into injected CSS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CssNewline {
    /// `\n` escape, for CSS embedded in JS string literals
    #[default]
    Escaped,
    /// Real line feed, for standalone `.css` files
    Literal,
}

impl CssNewline {
    pub fn as_str(self) -> &'static str {
        match self {
            CssNewline::Escaped => "\\n",
            CssNewline::Literal => "\n",
        }
    }
}

/// One `selector { declarations }` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector: String,
    pub declarations: Vec<String>,
}

impl CssRule {
    pub fn new(selector: &str, declarations: &[&str]) -> Self {
        Self {
            selector: selector.to_string(),
            declarations: declarations.iter().map(|d| d.to_string()).collect(),
        }
    }

    pub fn hidden(selector: &str) -> Self {
        Self::new(selector, &["display: none !important"])
    }

    pub fn invisible(selector: &str) -> Self {
        Self::new(selector, &["visibility: hidden !important"])
    }

    pub fn visible(selector: &str) -> Self {
        Self::new(selector, &["visibility: visible !important"])
    }

    pub fn render(&self, newline: CssNewline) -> String {
        let nl = newline.as_str();
        let mut out = format!("{} {{", self.selector);
        for declaration in &self.declarations {
            out.push_str(nl);
            out.push_str("            ");
            out.push_str(declaration);
            out.push(';');
        }
        out.push_str(nl);
        out.push_str("        }");
        out
    }
}

/// Render rules as a block that can be inserted in front of an existing rule.
pub fn render_block(rules: &[CssRule], newline: CssNewline) -> String {
    let nl = newline.as_str();
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.render(newline));
        out.push_str(nl);
    }
    out
}
