//! Allow-list filters for file names and encoding names.
//!
//! Callers supply `|`-separated literal tokens (`"txt|md|csv"`,
//! `"GBK|GB18030"`), not raw regex syntax. Tokens are validated and escaped,
//! then compiled into a single anchored, case-insensitive pattern, so a
//! caller can never smuggle in a catastrophic expression.

use regex::{Regex, RegexBuilder};

use crate::error::{ConvertError, ConvertResult};

/// Characters a token may contain besides ASCII alphanumerics.
const TOKEN_EXTRAS: &[char] = &['.', '_', '-', '+'];

/// An anchored, case-insensitive allow-list over literal alternatives.
#[derive(Debug, Clone)]
pub struct AllowList {
    regex: Regex,
}

impl AllowList {
    /// Allow-list of file extensions, matched against a full file name
    /// (`"txt|md"` accepts `a.TXT`, rejects `c.txt.bak`).
    pub fn file_extensions(pattern: &str) -> ConvertResult<Self> {
        Self::compile(pattern, |alts| format!(r"^.*\.({alts})$"))
    }

    /// Allow-list of exact names, matched in full (`"GBK|Big5"`).
    pub fn exact_names(pattern: &str) -> ConvertResult<Self> {
        Self::compile(pattern, |alts| format!("^({alts})$"))
    }

    fn compile(pattern: &str, shape: fn(&str) -> String) -> ConvertResult<Self> {
        let tokens = tokenize(pattern)?;
        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&shape(&alternation))
            .case_insensitive(true)
            .build()
            .map_err(|e| ConvertError::pattern(pattern, e.to_string()))?;

        Ok(Self { regex })
    }

    /// Whether the candidate fully matches one of the alternatives.
    pub fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

fn tokenize(pattern: &str) -> ConvertResult<Vec<String>> {
    let tokens: Vec<String> = pattern.split('|').map(|t| t.trim().to_string()).collect();

    for token in &tokens {
        if token.is_empty() {
            return Err(ConvertError::pattern(pattern, "empty alternative"));
        }
        if let Some(bad) = token
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && !TOKEN_EXTRAS.contains(c))
        {
            return Err(ConvertError::pattern(
                pattern,
                format!("unsupported character `{bad}` in `{token}`"),
            ));
        }
    }

    Ok(tokens)
}

/// Decide whether a file participates in a run, by file name.
///
/// An absent or empty pattern accepts everything. The pattern is compiled at
/// evaluation time, so a malformed pattern fails only the file being
/// evaluated, never the files already in flight.
pub fn accepts_file_name(file_name: &str, pattern: Option<&str>) -> ConvertResult<bool> {
    match pattern.filter(|p| !p.trim().is_empty()) {
        None => Ok(true),
        Some(pattern) => Ok(AllowList::file_extensions(pattern)?.matches(file_name)),
    }
}
