// Fuzzy matching utilities for stage key suggestions

/// Calculate Levenshtein distance between two strings
/// Returns the minimum number of single-character edits (insertions, deletions, substitutions)
/// needed to transform one string into another
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Two-row rolling DP: prev holds distances for the previous s1 prefix
    let mut prev: Vec<usize> = (0..=s2_chars.len()).collect();
    for (i, c1) in s1_chars.iter().enumerate() {
        let mut row = Vec::with_capacity(s2_chars.len() + 1);
        row.push(i + 1);
        for (j, c2) in s2_chars.iter().enumerate() {
            let cost = if c1 == c2 { 0 } else { 1 };
            let value = (prev[j + 1] + 1)        // deletion
                .min(row[j] + 1)                 // insertion
                .min(prev[j] + cost);            // substitution
            row.push(value);
        }
        prev = row;
    }

    prev[s2_chars.len()]
}

/// Find close matches for a stage key the user typed.
/// Prefix matches count as near regardless of distance; otherwise the
/// case-insensitive edit distance must be within `max_distance`.
/// Returns up to 3 matches sorted by distance (closest first).
pub fn find_near_stage_matches(
    search_key: &str,
    stage_keys: &[String],
    max_distance: usize,
) -> Vec<(String, usize)> {
    let search_lower = search_key.to_lowercase();
    let mut matches: Vec<(String, usize)> = Vec::new();

    for key in stage_keys {
        let key_lower = key.to_lowercase();
        let distance = levenshtein_distance(&search_lower, &key_lower);

        if distance <= max_distance {
            matches.push((key.clone(), distance));
        } else if !search_lower.is_empty() && key_lower.starts_with(&search_lower) {
            // Typed a prefix of a longer key ("prod" for "production")
            matches.push((key.clone(), key_lower.len() - search_lower.len()));
        }
    }

    matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    matches.into_iter().take(3).collect()
}

/// Best single suggestion for an unknown stage key, if any is close enough
pub fn suggest_stage(search_key: &str, stage_keys: &[String]) -> Option<String> {
    find_near_stage_matches(search_key, stage_keys, 2)
        .into_iter()
        .next()
        .map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("same", "same"), 0);
        assert_eq!(levenshtein_distance("abc", "def"), 3);
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_near_stage_matches() {
        let stages = keys(&["lead", "inspection", "legal", "contract", "production"]);

        // Typo one edit away
        let matches = find_near_stage_matches("leag", &stages, 2);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].0, "lead");

        // Prefix of a longer key
        let matches = find_near_stage_matches("prod", &stages, 2);
        assert_eq!(matches[0].0, "production");

        // Nothing close
        let matches = find_near_stage_matches("warranty", &stages, 2);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_suggest_stage() {
        let stages = keys(&["lead", "legal", "billing"]);
        assert_eq!(suggest_stage("legl", &stages), Some("legal".to_string()));
        assert_eq!(suggest_stage("lwad", &stages), Some("lead".to_string()));
        assert_eq!(suggest_stage("zzzzz", &stages), None);
    }

    #[test]
    fn test_suggest_stage_is_case_insensitive() {
        let stages = keys(&["Lead", "Legal"]);
        assert_eq!(suggest_stage("lead", &stages), Some("Lead".to_string()));
    }
}
