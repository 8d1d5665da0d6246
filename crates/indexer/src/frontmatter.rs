use serde_json::Value;
use std::collections::BTreeMap;

/// Parsed frontmatter fields, keyed by field name.
pub type Frontmatter = BTreeMap<String, Value>;

/// Raw `---` delimited block at the top of a markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    /// YAML text between the delimiters
    pub yaml: String,
    /// Everything after the closing delimiter
    pub body: &'a str,
    /// 1-based line number of the first body line
    pub body_start_line: usize,
}

/// Split a frontmatter block off the top of `input`.
///
/// Returns `None` if the first line is not `---` or the block is never closed.
pub fn split_frontmatter(input: &str) -> Option<FrontmatterBlock<'_>> {
    let content = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut offset = 0usize;
    let mut lines = content.split_inclusive('\n');

    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    offset += first.len();

    let mut yaml_lines: Vec<&str> = Vec::new();
    let mut line_no = 1usize;
    for line in lines {
        line_no += 1;
        offset += line.len();
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some(FrontmatterBlock {
                yaml: yaml_lines.join("\n"),
                body: &content[offset..],
                body_start_line: line_no + 1,
            });
        }
        yaml_lines.push(trimmed);
    }

    None
}

/// Parse frontmatter YAML into a JSON-compatible map.
///
/// Uses serde_yaml to parse, then converts to serde_json::Value so downstream
/// checks handle one value model. Non-mapping documents yield `None`.
pub fn parse_frontmatter(yaml: &str) -> Option<Frontmatter> {
    if yaml.trim().is_empty() {
        return Some(Frontmatter::new());
    }
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml).ok()?;
    let json_value: Value = serde_json::to_value(yaml_value).ok()?;

    match json_value {
        Value::Object(map) => Some(map.into_iter().collect()),
        Value::Null => Some(Frontmatter::new()),
        _ => None,
    }
}

/// Read a field that may be a YAML list or a comma-separated string.
pub fn string_list(frontmatter: &Frontmatter, key: &str) -> Vec<String> {
    match frontmatter.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(raw)) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Read a scalar string field.
pub fn string_field<'a>(frontmatter: &'a Frontmatter, key: &str) -> Option<&'a str> {
    frontmatter
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
