//! Property attribute strings
//!
//! A declared property is described by a comma-delimited list of specifiers,
//! each a one-character code optionally followed by a value, for example
//! `T@"NSString",C,N,V_name`. Commas inside a quoted class name or inside a
//! bracketed type encoding do not split specifiers.

use smallvec::SmallVec;

/// One `code value` specifier from an attribute string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyAttribute {
    pub code: char,
    pub value: String,
}

/// Split an attribute string into its specifiers. Empty segments are skipped.
pub fn split_attributes(attributes: &str) -> Vec<PropertyAttribute> {
    let mut result = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (idx, ch) in attributes.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '{' | '(' | '[' | '<' if !quoted => depth += 1,
            '}' | ')' | ']' | '>' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                push_attribute(&mut result, &attributes[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    push_attribute(&mut result, &attributes[start..]);

    result
}

fn push_attribute(out: &mut Vec<PropertyAttribute>, segment: &str) {
    let mut chars = segment.chars();
    if let Some(code) = chars.next() {
        out.push(PropertyAttribute {
            code,
            value: chars.as_str().to_string(),
        });
    }
}

/// Class name and protocol list carried by an object type encoding
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectType<'a> {
    /// Declared class name, `None` for a bare `id` or `id<Protocol>`
    pub class_name: Option<&'a str>,
    pub protocols: SmallVec<[&'a str; 2]>,
}

/// Decode `@"ClassName<P1><P2>"`. Returns `None` if the encoding does not
/// carry a quoted type name (plain `@`, blocks, non-objects).
pub fn parse_object_type(encoding: &str) -> Option<ObjectType<'_>> {
    let body = encoding.strip_prefix("@\"")?;
    let body = match body.find('"') {
        Some(end) => &body[..end],
        None => body,
    };

    let name_end = body.find('<').unwrap_or(body.len());
    let class_name = Some(&body[..name_end]).filter(|name| !name.is_empty());

    let mut protocols = SmallVec::new();
    let mut rest = &body[name_end..];
    while let Some(inner) = rest.strip_prefix('<') {
        let Some(close) = inner.find('>') else {
            break;
        };
        let protocol = &inner[..close];
        if !protocol.is_empty() {
            protocols.push(protocol);
        }
        rest = &inner[close + 1..];
    }

    Some(ObjectType { class_name, protocols })
}
