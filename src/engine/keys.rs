//! Key resolution
//!
//! Operators abbreviate column names (`mem_cap` for `Memory Capacity (GiB)`).
//! A candidate resolves to the first known name, in caller order, whose
//! canonical form contains the candidate's canonical characters as a
//! subsequence. Earlier-declared columns therefore win ties. Wrapping the
//! candidate in quotes demands exact canonical equality instead.

/// Canonical form of a column or key name: lowercased, parenthetical groups
/// removed, runs of spaces/hyphens/underscores collapsed into one `_`.
pub fn canonicalize(name: &str) -> String {
    let mut stripped = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.to_lowercase().chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth > 0 => {}
            _ => stripped.push(c),
        }
    }

    let mut canonical = String::with_capacity(stripped.len());
    let mut pending_separator = false;
    for c in stripped.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_separator = !canonical.is_empty();
        } else {
            if pending_separator {
                canonical.push('_');
                pending_separator = false;
            }
            canonical.push(c);
        }
    }
    canonical
}

/// True if every character of `needle` occurs in `haystack`, in order.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut remaining = haystack.chars();
    needle.chars().all(|c| remaining.any(|h| h == c))
}

/// Inner text of a candidate wrapped in matching single or double quotes
pub fn strip_verbatim(candidate: &str) -> Option<&str> {
    let trimmed = candidate.trim();
    ['"', '\''].iter().find_map(|&quote| {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            Some(&trimmed[1..trimmed.len() - 1])
        } else {
            None
        }
    })
}

/// Resolve `candidate` against `known`, returning the matching known name.
pub fn resolve_key<S: AsRef<str>>(candidate: &str, known: &[S]) -> Option<String> {
    let (text, verbatim) = match strip_verbatim(candidate) {
        Some(inner) => (inner, true),
        None => (candidate, false),
    };

    let wanted = canonicalize(text);
    if wanted.is_empty() {
        return None;
    }

    known
        .iter()
        .map(AsRef::as_ref)
        .find(|name| {
            let canonical = canonicalize(name);
            if verbatim {
                canonical == wanted
            } else {
                is_subsequence(&wanted, &canonical)
            }
        })
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("Memory Capacity (GiB)"), "memory_capacity");
        assert_eq!(canonicalize("xname"), "xname");
        assert_eq!(canonicalize("Power  -  State"), "power_state");
        assert_eq!(canonicalize("  Leading Space"), "leading_space");
        assert_eq!(canonicalize("a (b (c)) d"), "a_d");
    }

    #[test]
    fn test_subsequence_abbreviation() {
        assert_eq!(
            resolve_key("mem_cap", &["memory_capacity"]),
            Some("memory_capacity".to_string())
        );
    }

    #[test]
    fn test_first_declared_match_wins() {
        assert_eq!(resolve_key("ae", &["name", "place"]), Some("name".to_string()));
        assert_eq!(resolve_key("ae", &["place", "name"]), Some("place".to_string()));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(resolve_key("zzz", &["name"]), None);
        assert_eq!(resolve_key("", &["name"]), None);
        assert_eq!(resolve_key("name", &[] as &[&str]), None);
    }

    #[test]
    fn test_case_and_separator_insensitive() {
        assert_eq!(
            resolve_key("Power-State", &["xname", "power_state"]),
            Some("power_state".to_string())
        );
        assert_eq!(
            resolve_key("mem", &["Memory Capacity (GiB)"]),
            Some("Memory Capacity (GiB)".to_string())
        );
    }

    #[test]
    fn test_verbatim_requires_exact_match() {
        let known = ["state", "status"];
        assert_eq!(resolve_key("stat", &known), Some("state".to_string()));
        assert_eq!(resolve_key("\"status\"", &known), Some("status".to_string()));
        assert_eq!(resolve_key("'stat'", &known), None);
        assert_eq!(resolve_key("'STATE'", &known), Some("state".to_string()));
    }

    #[test]
    fn test_strip_verbatim() {
        assert_eq!(strip_verbatim("\"a b\""), Some("a b"));
        assert_eq!(strip_verbatim("'x'"), Some("x"));
        assert_eq!(strip_verbatim("'x\""), None);
        assert_eq!(strip_verbatim("\""), None);
    }
}
