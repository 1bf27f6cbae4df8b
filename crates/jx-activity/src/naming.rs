//! Name helpers: DNS-safe identities and human readable step names

/// Convert `name` into a lowercase DNS-1123 style name.
///
/// ASCII letters and digits are kept (lowercased); every run of other
/// characters collapses into a single `-`; leading and trailing `-` are
/// dropped. The result is never truncated.
pub fn to_valid_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Split on `-` and `_` and title-case each word: `git-clone` becomes `Git Clone`.
pub fn humanize(text: &str) -> String {
    text.split(|c| c == '-' || c == '_' || c == ' ')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stage name for a pipeline task: hyphens become spaces, case is kept.
pub fn stage_name(task_name: &str) -> String {
    task_name.replace('-', " ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name_lowercases_and_joins() {
        assert_eq!(to_valid_name("acme-app-main-1"), "acme-app-main-1");
        assert_eq!(to_valid_name("Acme-App-PR-42-3"), "acme-app-pr-42-3");
    }

    #[test]
    fn test_valid_name_rewrites_invalid_chars() {
        assert_eq!(to_valid_name("acme-app-feature/login-1"), "acme-app-feature-login-1");
        assert_eq!(to_valid_name("acme-app-v1.2_x-7"), "acme-app-v1-2-x-7");
        assert_eq!(to_valid_name("--a//b--"), "a-b");
    }

    #[test]
    fn test_valid_name_empty() {
        assert_eq!(to_valid_name(""), "");
        assert_eq!(to_valid_name("///"), "");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("git-clone"), "Git Clone");
        assert_eq!(humanize("step_build-and_test"), "Step Build And Test");
        assert_eq!(humanize("jx"), "Jx");
    }

    #[test]
    fn test_stage_name_keeps_case() {
        assert_eq!(stage_name("build-and-test"), "build and test");
        assert_eq!(stage_name("from-Build-pack"), "from Build pack");
    }
}
