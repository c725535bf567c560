//! Classification of changed paths against the configured replace pairs

use crate::config::Config;
use std::path::is_separator;

/// Result of matching one changed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatch {
    /// The config file itself changed
    Config {
        /// Absolute path of the config file
        source: String,
    },
    /// One side of a replace pair changed
    Mirror {
        /// Absolute path that changed
        source: String,
        /// Absolute path it should be copied to
        destination: String,
    },
    /// Nothing to do for this path
    NoMatch,
}

/// Maps relative changed paths to mirror jobs
#[derive(Debug, Clone, Copy)]
pub struct PathMatcher<'a> {
    config: &'a Config,
}

impl<'a> PathMatcher<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Classify `relative`, a path relative to the monitor root
    ///
    /// Pairs are tried in order. For each pair the first occurrence of the
    /// original name is searched, then (only if absent) the replacement name.
    /// The occurrence must be a whole path segment; if it is not, the pair is
    /// skipped.
    pub fn classify(&self, relative: &str) -> PathMatch {
        let root = self.config.monitor_root();

        if relative == self.config.config_file() {
            return PathMatch::Config {
                source: format!("{root}{relative}"),
            };
        }

        for pair in &self.config.replace_pairs {
            let (start, from, to) = if let Some(start) = relative.find(&pair.original) {
                (start, &pair.original, &pair.replacement)
            } else if let Some(start) = relative.find(&pair.replacement) {
                (start, &pair.replacement, &pair.original)
            } else {
                continue;
            };

            let end = start + from.len();
            if !is_whole_segment(relative, start, end) {
                continue;
            }

            let mut destination =
                String::with_capacity(root.len() + relative.len() - from.len() + to.len());
            destination.push_str(root);
            destination.push_str(&relative[..start]);
            destination.push_str(to);
            destination.push_str(&relative[end..]);

            return PathMatch::Mirror {
                source: format!("{root}{relative}"),
                destination,
            };
        }

        PathMatch::NoMatch
    }
}

/// True when `path[start..end]` is bounded by separators or the string ends
fn is_whole_segment(path: &str, start: usize, end: usize) -> bool {
    let before = path[..start].chars().next_back();
    let after = path[end..].chars().next();
    before.map_or(true, is_separator) && after.map_or(true, is_separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(pairs: &[(&str, &str)]) -> Config {
        let mut config = Config::new("/repo/", "twinsync.toml");
        for (original, replacement) in pairs {
            config = config.with_replace_pair(*original, *replacement).unwrap();
        }
        config
    }

    fn mirror(source: &str, destination: &str) -> PathMatch {
        PathMatch::Mirror {
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    #[test]
    fn test_config_file_is_recognized() {
        let config = config_for(&[("A", "B")]);
        let matcher = PathMatcher::new(&config);

        assert_eq!(
            matcher.classify("twinsync.toml"),
            PathMatch::Config {
                source: "/repo/twinsync.toml".to_string()
            }
        );
        // Only the root-level file counts
        assert_eq!(matcher.classify("sub/twinsync.toml"), PathMatch::NoMatch);
    }

    #[test]
    fn test_segment_match_in_both_directions() {
        let config = config_for(&[("oldName", "newName")]);
        let matcher = PathMatcher::new(&config);

        assert_eq!(
            matcher.classify("dir/oldName/file"),
            mirror("/repo/dir/oldName/file", "/repo/dir/newName/file")
        );
        assert_eq!(
            matcher.classify("newName/file"),
            mirror("/repo/newName/file", "/repo/oldName/file")
        );
        assert_eq!(
            matcher.classify("dir/oldName"),
            mirror("/repo/dir/oldName", "/repo/dir/newName")
        );
    }

    #[test]
    fn test_partial_names_do_not_match() {
        let config = config_for(&[("oldName", "newName")]);
        let matcher = PathMatcher::new(&config);

        assert_eq!(matcher.classify("prefix_oldNameX/file"), PathMatch::NoMatch);
        assert_eq!(matcher.classify("oldNameX/file"), PathMatch::NoMatch);
        assert_eq!(matcher.classify("dir/xnewName"), PathMatch::NoMatch);
        assert_eq!(matcher.classify("unrelated/file"), PathMatch::NoMatch);
    }

    #[test]
    fn test_unbounded_first_occurrence_skips_pair() {
        // The first occurrence of `A` is inside `AX`, so the pair is skipped
        // even though `B` appears as a whole segment later on.
        let config = config_for(&[("A", "B")]);
        let matcher = PathMatcher::new(&config);
        assert_eq!(matcher.classify("AX/B/file"), PathMatch::NoMatch);

        // A later pair still gets its chance
        let config = config_for(&[("A", "B"), ("C", "D")]);
        let matcher = PathMatcher::new(&config);
        assert_eq!(
            matcher.classify("AX/C/file"),
            mirror("/repo/AX/C/file", "/repo/AX/D/file")
        );
    }

    #[test]
    fn test_only_first_occurrence_is_replaced() {
        let config = config_for(&[("A", "B")]);
        let matcher = PathMatcher::new(&config);

        assert_eq!(
            matcher.classify("A/A/x.txt"),
            mirror("/repo/A/A/x.txt", "/repo/B/A/x.txt")
        );
    }

    #[test]
    fn test_first_matching_pair_wins() {
        // `B` belongs to both pairs; the first pair decides the direction
        let config = config_for(&[("A", "B"), ("B", "C")]);
        let matcher = PathMatcher::new(&config);

        assert_eq!(
            matcher.classify("B/x.txt"),
            mirror("/repo/B/x.txt", "/repo/A/x.txt")
        );
        assert_eq!(
            matcher.classify("C/x.txt"),
            mirror("/repo/C/x.txt", "/repo/B/x.txt")
        );
    }

    #[test]
    fn test_whole_segment_boundaries() {
        assert!(is_whole_segment("A", 0, 1));
        assert!(is_whole_segment("x/A/y", 2, 3));
        assert!(!is_whole_segment("xA/y", 1, 2));
        assert!(!is_whole_segment("x/Ay", 2, 3));
    }
}
