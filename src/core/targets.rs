use crate::utils::error::Result;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

/// Matches "prefix(alias)" anchored at both ends, the shorthand for an
/// organization with a registered alias.
fn alias_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*?)\((.*?)\)$").expect("alias pattern compiles"))
}

/// Normalizes a raw target spec into a deduplicated ordered target list.
///
/// If `spec` names an existing file it is read line by line; otherwise it
/// is treated as a single literal line. Each line may expand into two
/// targets via the alias shorthand. Order of first occurrence is kept.
pub fn parse_targets(spec: &str) -> Result<Vec<String>> {
    let mut raw = Vec::new();
    if Path::new(spec).is_file() {
        let content = std::fs::read_to_string(spec)?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            raw.extend(split_alias(line));
        }
    } else {
        raw.extend(split_alias(spec));
    }

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for target in raw {
        let target = target.trim().to_string();
        if target.is_empty() {
            continue;
        }
        if seen.insert(target.clone()) {
            targets.push(target);
        }
    }
    Ok(targets)
}

fn split_alias(line: &str) -> Vec<String> {
    if let Some(caps) = alias_pattern().captures(line) {
        return vec![caps[1].trim().to_string(), caps[2].trim().to_string()];
    }
    vec![line.to_string()]
}
