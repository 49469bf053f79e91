use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The root `.gitignore` exists but could not be read. A missing file yields an
/// empty rule set instead; only a read failure is an error.
#[derive(Debug, Error)]
#[error("cannot read ignore file {}: {source}", path.display())]
pub struct GitignoreError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// One parsed ignore rule, in file order.
struct Rule {
    glob: Pattern,
    /// Pattern text after stripping `!`, leading `/` and trailing `/`.
    raw: String,
    /// Root-relative match (leading `/`, or any interior `/` in the pattern).
    anchored: bool,
    /// Trailing `/`: matches directories only.
    dir_only: bool,
    /// Leading `!`: re-includes paths excluded by an earlier rule.
    negated: bool,
}

/// Ordered rule set parsed from a single root-level ignore file.
///
/// Evaluation is last-match-wins: the final rule whose pattern matches a path
/// (respecting its directory/file scope) decides, and an unmatched path is not
/// ignored. A rule that matches a directory covers everything beneath it.
pub struct Gitignore {
    rules: Vec<Rule>,
}

fn match_opts() -> MatchOptions {
    MatchOptions {
        case_sensitive: true,
        // `*` and `?` must not cross path separators; `**` still does.
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

/// Parse a single line into a rule. Blank lines, comments and patterns the glob
/// compiler rejects yield `None`; a half-written ignore file never fails the scan.
fn parse_line(line: &str) -> Option<Rule> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (negated, rest) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    // `\#` and `\!` escape the comment/negation markers.
    let rest = rest
        .strip_prefix("\\#")
        .map(|r| format!("#{r}"))
        .or_else(|| rest.strip_prefix("\\!").map(|r| format!("!{r}")))
        .unwrap_or_else(|| rest.to_string());

    let (dir_only, rest) = match rest.strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, rest.as_str()),
    };

    let (lead_anchor, rest) = match rest.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    if rest.is_empty() {
        return None;
    }

    let anchored = lead_anchor || rest.contains('/');

    let glob = match Pattern::new(rest) {
        Ok(glob) => glob,
        Err(e) => {
            debug!("skipping malformed ignore pattern {line:?}: {e}");
            return None;
        }
    };

    Some(Rule {
        glob,
        raw: rest.to_string(),
        anchored,
        dir_only,
        negated,
    })
}

impl Rule {
    /// Match one concrete candidate path. Anchored patterns run against the full
    /// root-relative path, unanchored ones against the final component.
    fn hits(&self, candidate: &str) -> bool {
        if self.anchored {
            self.glob.matches_with(candidate, match_opts())
        } else {
            let name = candidate.rsplit('/').next().unwrap_or(candidate);
            self.glob.matches_with(name, match_opts())
        }
    }

    /// Does this rule apply to `path`? True when the pattern matches the path
    /// itself (scope permitting) or any of its ancestor directories.
    fn matches(&self, path: &str, is_dir: bool) -> bool {
        if (is_dir || !self.dir_only) && self.hits(path) {
            return true;
        }
        // Ancestors are always directories, so directory-only scope never blocks here.
        path.match_indices('/').any(|(i, _)| self.hits(&path[..i]))
    }

    /// Could this rule match some path strictly below `dir`? Used to decide
    /// whether an ignored directory may still shelter re-included entries.
    fn reaches_into(&self, dir_prefix: &str) -> bool {
        if !self.anchored {
            return true;
        }
        let literal = match self.raw.find(['*', '?', '[']) {
            Some(i) => &self.raw[..i],
            None => &self.raw,
        };
        literal.starts_with(dir_prefix) || dir_prefix.starts_with(literal)
    }
}

impl Gitignore {
    /// Matcher with no rules: nothing is ever ignored.
    pub fn empty() -> Self {
        Gitignore { rules: Vec::new() }
    }

    /// Parse ignore-file content. Infallible: bad lines are dropped.
    pub fn parse(content: &str) -> Self {
        Gitignore {
            rules: content.lines().filter_map(parse_line).collect(),
        }
    }

    /// Load `.gitignore` from the scan root. Missing file → empty matcher.
    pub fn load(root: &Path) -> Result<Self, GitignoreError> {
        let path = root.join(".gitignore");
        if !path.exists() {
            return Ok(Self::empty());
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let matcher = Self::parse(&content);
                debug!(
                    "loaded {} ignore rule(s) from {}",
                    matcher.rules.len(),
                    path.display()
                );
                Ok(matcher)
            }
            Err(source) => Err(GitignoreError { path, source }),
        }
    }

    /// Last-match-wins evaluation over the ordered rule set.
    ///
    /// `path` is root-relative with `/` separators and no leading slash.
    pub fn is_ignored(&self, path: &str, is_dir: bool) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.matches(path, is_dir) {
                ignored = !rule.negated;
            }
        }
        ignored
    }

    /// True when descent into `dir` can be skipped entirely: the directory is
    /// ignored and no negation rule could re-include anything beneath it.
    pub fn should_prune(&self, dir: &str) -> bool {
        self.is_ignored(dir, true) && !self.may_reinclude_under(dir)
    }

    fn may_reinclude_under(&self, dir: &str) -> bool {
        let prefix = format!("{dir}/");
        self.rules
            .iter()
            .filter(|r| r.negated)
            .any(|r| r.reaches_into(&prefix))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
