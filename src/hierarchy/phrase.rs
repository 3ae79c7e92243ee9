use regex::Regex;

/// What the search box holds before the user has typed anything.  Treated the
/// same as an empty phrase so the first render shows the whole catalogue.
pub const DEFAULT_PLACEHOLDER: &str = "Search";

/// A search phrase, tokenized once so it can be checked against tens of
/// thousands of labels in a single build.
///
/// Matching is an ordered, contiguous, per-word prefix test: the needle words
/// must be prefixes of consecutive label words, in order.  So `"blood pr"`
/// matches "Blood pressure" but `"pr blood"` does not, and `"date of b"`
/// matches "Date of birth".  Labels have their parentheses removed before
/// being split so qualifiers like "(left)" participate as ordinary words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    needle: Vec<String>,
}

impl Phrase {
    pub fn parse(raw: &str) -> Phrase {
        Phrase::with_placeholder(raw, DEFAULT_PLACEHOLDER)
    }

    pub fn with_placeholder(raw: &str, placeholder: &str) -> Phrase {
        if raw == placeholder {
            return Phrase::everything();
        }
        Phrase {
            needle: raw
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn everything() -> Phrase {
        Phrase { needle: vec![] }
    }

    /// Empty, blank and placeholder phrases filter nothing out.
    pub fn matches_everything(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, label: &str) -> bool {
        lazy_static! {
            static ref RE_PARENS: Regex = Regex::new("[()]").unwrap();
        }

        if self.needle.is_empty() {
            return true;
        }

        let lowered = label.to_lowercase();
        let stripped = RE_PARENS.replace_all(&lowered, "");
        let haystack: Vec<&str> = stripped.split_whitespace().collect();

        // A label shorter than the needle yields no windows and thus no match.
        haystack.windows(self.needle.len()).any(|run| {
            run.iter()
                .zip(self.needle.iter())
                .all(|(word, prefix)| word.starts_with(prefix.as_str()))
        })
    }
}

/// One-shot convenience over `Phrase`, using the default placeholder.
pub fn matches(phrase: &str, label: &str) -> bool {
    Phrase::parse(phrase).matches(label)
}
