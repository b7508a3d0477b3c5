/// Counter extraction: find `name: number` pairs in result file text.
///
/// Matches look like `hits: 10`, `l2_misses:\t3.5` or `ipc:  1.02`. The
/// value is kept as the matched text; nothing is parsed as a number.
use crate::error::ReportError;
use regex::Regex;
use std::sync::LazyLock;

/// Word run, colon, whitespace, then digits and dots.
pub const DEFAULT_COUNTER_PATTERN: &str = r"(\w+):\s+([\d.]+)";

static COUNTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_COUNTER_PATTERN).unwrap());

/// Extracts `(name, value)` pairs using group 1 and group 2 of a regex.
#[derive(Debug, Clone)]
pub struct CounterExtractor {
    pattern: Regex,
}

impl CounterExtractor {
    /// Build an extractor from a custom pattern.
    ///
    /// The pattern must define at least two capture groups.
    pub fn new(pattern: &str) -> Result<Self, ReportError> {
        let pattern = Regex::new(pattern)?;
        // captures_len counts the implicit whole-match group
        let groups = pattern.captures_len() - 1;
        if groups < 2 {
            return Err(ReportError::PatternGroups(groups));
        }
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// All non-overlapping matches in `text`, in order of appearance.
    pub fn extract<'t>(&self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str();
                let value = caps.get(2)?.as_str();
                Some((name, value))
            })
            .collect()
    }
}

impl Default for CounterExtractor {
    fn default() -> Self {
        Self {
            pattern: COUNTER_RE.clone(),
        }
    }
}
