//! Decomposition of raw MT103-style message text into tagged fields.

use std::collections::HashMap;

/// Parsed view of a raw wire message: the tag-to-value map extracted from
/// block 4.
///
/// Parsing never fails. Text that does not decompose into braced blocks
/// yields an empty map, and the validator then reports the missing fields;
/// structural garbage is a validation outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct WireMessage {
    fields: HashMap<String, String>,
}

impl WireMessage {
    /// Extract the field map from raw message text.
    ///
    /// Block 4 is the text between `{4:` and its `-}` (or bare `}`)
    /// terminator. Each field starts at a line of the form `:TAG:value`;
    /// the value continues over following lines until the next tag marker
    /// or the end of the block. If a tag repeats, the last occurrence wins.
    pub fn parse(raw: &str) -> Self {
        let mut fields = HashMap::new();
        if let Some(body) = block4(raw) {
            let mut current: Option<(String, String)> = None;
            for line in body.lines() {
                if let Some((tag, value)) = split_tagged_line(line) {
                    if let Some((tag, value)) = current.take() {
                        fields.insert(tag, value);
                    }
                    current = Some((tag.to_string(), value.to_string()));
                } else if let Some((_, value)) = current.as_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
            }
            if let Some((tag, value)) = current {
                fields.insert(tag, value);
            }
        }
        Self { fields }
    }

    /// Raw value of a tag, if the tag appeared in block 4.
    pub fn field(&self, tag: &str) -> Option<&str> {
        self.fields.get(tag).map(String::as_str)
    }

    /// Tag present with a non-blank value.
    pub fn has_field(&self, tag: &str) -> bool {
        self.field(tag).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn block4(raw: &str) -> Option<&str> {
    let start = raw.find("{4:")? + 3;
    let rest = &raw[start..];
    let end = rest.find('}')?;
    let body = &rest[..end];
    Some(body.strip_suffix('-').unwrap_or(body))
}

/// Split a `:TAG:value` line; tags are 2-3 alphanumeric characters.
fn split_tagged_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(':')?;
    let colon = rest.find(':')?;
    let tag = &rest[..colon];
    if !(2..=3).contains(&tag.len()) || !tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some((tag, &rest[colon + 1..]))
}
