use std::fmt::{Display, Formatter};

use besio_error::{BesResult, besio_err};
use regex::Regex;

/// A glob pattern over field paths or branch names.
///
/// `*` matches any run of characters, including `/`, and `?` matches exactly one character.
/// Every other character matches itself. A pattern must match the whole name.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    glob: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compiles `glob`.
    pub fn new(glob: &str) -> BesResult<Self> {
        let mut pattern = String::with_capacity(glob.len() + 8);
        pattern.push_str("^(?:");
        for c in glob.chars() {
            match c {
                '*' => pattern.push_str(".*"),
                '?' => pattern.push('.'),
                other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        pattern.push_str(")$");

        let regex = Regex::new(&pattern)
            .map_err(|err| besio_err!("invalid selection pattern {}: {}", glob, err))?;
        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    /// Returns whether `name` matches in full.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Returns the pattern as written.
    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

impl Display for GlobPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.glob)
    }
}
