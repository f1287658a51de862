use crate::transform::errors::SpecError;
use crate::transform::matcher::{MatchSite, MatchSpec};

/// What a successful match is replaced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Inserted verbatim; `$` has no meaning.
    Literal(String),
    /// Text with capture references.
    ///
    /// Syntax: `$N` / `${N}` reference a group by index, `${name}` by name,
    /// `$$` is a literal dollar. `$0` is the whole match. A `$` followed by
    /// anything else is kept as-is.
    Template(String),
}

/// A template parsed and bound to a concrete match specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledReplacement {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Group(usize),
}

/// Reference as written in the template, before binding to group indices.
enum Reference<'a> {
    Index(usize),
    Name(&'a str),
}

impl Replacement {
    /// Template that re-emits the match with `text` in front of it.
    pub fn insert_before(text: &str) -> Self {
        Replacement::Template(format!("{}$0", escape(text)))
    }

    /// Template that re-emits the match followed by `text`.
    pub fn insert_after(text: &str) -> Self {
        Replacement::Template(format!("$0{}", escape(text)))
    }

    /// Replacement that removes the match.
    pub fn delete() -> Self {
        Replacement::Literal(String::new())
    }

    /// The replacement with every capture reference dropped; used to derive
    /// already-applied markers.
    pub fn static_text(&self) -> String {
        match self {
            Replacement::Literal(text) => text.clone(),
            Replacement::Template(template) => match parse(template) {
                Ok(parts) => parts
                    .into_iter()
                    .filter_map(|(part, _)| match part {
                        RawPart::Text(text) => Some(text),
                        RawPart::Ref(_) => None,
                    })
                    .collect(),
                Err(_) => template.clone(),
            },
        }
    }

    /// Bind the replacement to `spec`, rejecting references to groups the
    /// match cannot provide.
    pub(crate) fn compile(&self, spec: &MatchSpec) -> Result<CompiledReplacement, SpecError> {
        let template = match self {
            Replacement::Literal(text) => {
                return Ok(CompiledReplacement {
                    parts: vec![Part::Text(text.clone())],
                })
            }
            Replacement::Template(template) => template,
        };

        let mut parts = Vec::new();
        for (raw, _offset) in parse(template)? {
            let part = match raw {
                RawPart::Text(text) => Part::Text(text),
                RawPart::Ref(Reference::Index(index)) => {
                    if index >= spec.group_count() {
                        return Err(dangling(format!("${index}"), spec));
                    }
                    Part::Group(index)
                }
                RawPart::Ref(Reference::Name(name)) => match spec.group_index(name) {
                    Some(index) => Part::Group(index),
                    None => return Err(dangling(format!("${{{name}}}"), spec)),
                },
            };
            parts.push(part);
        }

        Ok(CompiledReplacement { parts })
    }
}

impl CompiledReplacement {
    /// Render the replacement for one match site.
    ///
    /// Captured text is copied verbatim and never re-expanded.
    pub(crate) fn render(&self, site: &MatchSite<'_>) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Group(index) => {
                    if let Some(Some(captured)) = site.groups.get(*index) {
                        out.push_str(captured);
                    }
                }
            }
        }
        out
    }
}

/// Escape `text` so it can be embedded in a template unchanged.
pub fn escape(text: &str) -> String {
    text.replace('$', "$$")
}

fn dangling(reference: String, spec: &MatchSpec) -> SpecError {
    let groups = spec.group_count() - 1;
    let available = match (spec, groups) {
        (MatchSpec::Literal(_), _) => "$0 (literal anchor)".to_string(),
        (_, 0) => "$0".to_string(),
        (_, n) => format!("$0..${n}"),
    };
    SpecError::DanglingCapture {
        reference,
        available,
    }
}

enum RawPart<'a> {
    Text(String),
    Ref(Reference<'a>),
}

fn parse(template: &str) -> Result<Vec<(RawPart<'_>, usize)>, SpecError> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let bytes = template.as_bytes();
    let mut i = 0;

    while i < template.len() {
        let Some(rel) = template[i..].find('$') else {
            text.push_str(&template[i..]);
            break;
        };
        text.push_str(&template[i..i + rel]);
        let at = i + rel;
        let next = bytes.get(at + 1).copied();

        match next {
            Some(b'$') => {
                text.push('$');
                i = at + 2;
            }
            Some(b'{') => {
                let close = template[at..]
                    .find('}')
                    .map(|p| at + p)
                    .ok_or_else(|| SpecError::MalformedTemplate {
                        offset: at,
                        message: "unterminated `${`".to_string(),
                    })?;
                let inner = &template[at + 2..close];
                let reference = if inner.is_empty() {
                    return Err(SpecError::MalformedTemplate {
                        offset: at,
                        message: "empty `${}` reference".to_string(),
                    });
                } else if inner.bytes().all(|b| b.is_ascii_digit()) {
                    Reference::Index(parse_index(inner, at)?)
                } else if inner
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_')
                {
                    Reference::Name(inner)
                } else {
                    return Err(SpecError::MalformedTemplate {
                        offset: at,
                        message: format!("invalid group name `{inner}`"),
                    });
                };
                flush(&mut parts, &mut text, at);
                parts.push((RawPart::Ref(reference), at));
                i = close + 1;
            }
            Some(b) if b.is_ascii_digit() => {
                let digits = template[at + 1..]
                    .bytes()
                    .take_while(u8::is_ascii_digit)
                    .count();
                let index = parse_index(&template[at + 1..at + 1 + digits], at)?;
                flush(&mut parts, &mut text, at);
                parts.push((RawPart::Ref(Reference::Index(index)), at));
                i = at + 1 + digits;
            }
            _ => {
                text.push('$');
                i = at + 1;
            }
        }
    }

    flush(&mut parts, &mut text, template.len());
    Ok(parts)
}

fn parse_index(digits: &str, offset: usize) -> Result<usize, SpecError> {
    digits.parse().map_err(|_| SpecError::MalformedTemplate {
        offset,
        message: format!("group index `{digits}` out of range"),
    })
}

fn flush<'a>(parts: &mut Vec<(RawPart<'a>, usize)>, text: &mut String, offset: usize) {
    if !text.is_empty() {
        parts.push((RawPart::Text(std::mem::take(text)), offset));
    }
}
