// Command abbreviation matching for the Ridgeline CLI

/// Find all commands that start with the given prefix (case-insensitive)
pub fn find_matching_commands<'a>(prefix: &str, commands: &'a [&str]) -> Vec<&'a str> {
    let prefix_lower = prefix.to_lowercase();
    commands
        .iter()
        .filter(|cmd| cmd.to_lowercase().starts_with(&prefix_lower))
        .copied()
        .collect()
}

/// Find a unique command match for the given prefix
/// Returns Ok(command) if exactly one match, Err(matches) if ambiguous, Err(empty) if no match
/// Note: Exact matches take precedence over prefix matches (e.g., "show" matches "show" not "showall")
pub fn find_unique_command<'a>(prefix: &str, commands: &'a [&str]) -> Result<&'a str, Vec<&'a str>> {
    // First check for exact match (case-insensitive)
    let prefix_lower = prefix.to_lowercase();
    for cmd in commands {
        if cmd.to_lowercase() == prefix_lower {
            return Ok(*cmd);
        }
    }

    // Then check for prefix matches
    let matches = find_matching_commands(prefix, commands);

    if matches.is_empty() {
        Err(Vec::new())
    } else if matches.len() == 1 {
        Ok(matches[0])
    } else {
        Err(matches)
    }
}

/// Top-level commands in Ridgeline
pub const TOP_LEVEL_COMMANDS: &[&str] = &[
    "board", "list", "show", "move", "delete", "stages", "status",
];

/// Expand a command abbreviation in the argument list.
/// Only the first non-flag token is a command; everything after it is ids,
/// stage keys, and flags that must pass through untouched.
pub fn expand_command_abbreviations(args: Vec<String>) -> Result<Vec<String>, String> {
    let Some(first) = args.first() else {
        return Ok(args);
    };
    if first.starts_with('-') {
        return Ok(args);
    }

    match find_unique_command(first, TOP_LEVEL_COMMANDS) {
        Ok(full_cmd) => {
            let mut expanded = Vec::with_capacity(args.len());
            expanded.push(full_cmd.to_string());
            expanded.extend(args.into_iter().skip(1));
            Ok(expanded)
        }
        Err(matches) => {
            if matches.is_empty() {
                // Not a known command; let clap produce its own error
                Ok(args)
            } else {
                let match_list = matches.join(", ");
                Err(format!(
                    "Ambiguous command '{}'. Did you mean one of: {}?",
                    first, match_list
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_matching_commands() {
        let commands = &["board", "list", "stages", "status"];
        assert_eq!(find_matching_commands("b", commands), vec!["board"]);
        assert_eq!(find_matching_commands("st", commands), vec!["stages", "status"]);
        assert_eq!(find_matching_commands("z", commands), Vec::<&str>::new());
    }

    #[test]
    fn test_find_unique_command() {
        let commands = &["board", "stages", "status"];
        assert_eq!(find_unique_command("b", commands), Ok("board"));
        assert_eq!(find_unique_command("stag", commands), Ok("stages"));
        assert_eq!(find_unique_command("status", commands), Ok("status"));

        let matches = find_unique_command("st", commands);
        assert!(matches.is_err());
        if let Err(matches) = matches {
            assert_eq!(matches.len(), 2);
        }
    }

    #[test]
    fn test_expand_command_abbreviations() {
        assert_eq!(expand_command_abbreviations(args(&["b"])), Ok(args(&["board"])));
        assert_eq!(
            expand_command_abbreviations(args(&["mo", "e-12", "legal"])),
            Ok(args(&["move", "e-12", "legal"]))
        );

        // "s" is ambiguous across show/stages/status
        let result = expand_command_abbreviations(args(&["s"]));
        assert!(result.is_err());
        if let Err(msg) = result {
            assert!(msg.contains("Ambiguous"));
        }
    }

    #[test]
    fn test_expansion_leaves_later_tokens_alone() {
        // "legal" after the command must not be treated as a command
        assert_eq!(
            expand_command_abbreviations(args(&["move", "e-1", "leg"])),
            Ok(args(&["move", "e-1", "leg"]))
        );
    }

    #[test]
    fn test_expansion_passes_through_flags_and_unknowns() {
        assert_eq!(expand_command_abbreviations(args(&["--help"])), Ok(args(&["--help"])));
        assert_eq!(expand_command_abbreviations(args(&["frobnicate"])), Ok(args(&["frobnicate"])));
        assert_eq!(expand_command_abbreviations(vec![]), Ok(vec![]));
    }
}
