use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` (either separator style) to the user's home directory.
/// Paths without the prefix, or hosts without a home directory, are returned
/// as given after trimming.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let remainder = match trimmed {
        "~" => Some(""),
        _ => trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")),
    };
    match (remainder, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_plain_paths_untouched() {
        assert_eq!(expand_tilde(" /etc/spotinst/credentials "), PathBuf::from("/etc/spotinst/credentials"));
        assert_eq!(expand_tilde("relative/~/file"), PathBuf::from("relative/~/file"));
    }

    #[test]
    fn expands_home_prefix() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/.spotinst/credentials"), home.join(".spotinst/credentials"));
        }
    }
}
