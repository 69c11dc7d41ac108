//! Query matching for names and paths.
//!
//! Three modes, chosen from the query text and options:
//! - wildcard: the query contains `*` or `?`; compiled to an anchored regex
//!   that must match the whole candidate (takes precedence over whole-word)
//! - whole word: the query must appear bounded by string edges or non-word
//!   characters
//! - substring: plain containment
//!
//! Outside wildcard mode, case-insensitive matching lowercases both sides with
//! Unicode rules. Wildcard mode leaves the query untouched and relies on the
//! regex engine's case-insensitive flag.

use std::borrow::Cow;
use std::sync::LazyLock;

use fnv::FnvHashMap;
use memchr::memmem::Finder;
use parking_lot::Mutex;
use regex::{Regex, RegexBuilder};

/// Number of compiled patterns kept before the cache is cleared.
pub const PATTERN_CACHE_CAPACITY: usize = 256;

/// Compiled size limit handed to the regex engine.
pub const PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Process-wide cache of compiled wildcard patterns.
pub static PATTERN_CACHE: LazyLock<PatternCache> = LazyLock::new(PatternCache::default);

/// Options that change how a query matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    pub match_whole_word: bool,
}

/// Returns true if `query` contains `*` or `?`.
pub fn has_wildcards(query: &str) -> bool {
    query.contains(['*', '?'])
}

/// Translates a wildcard query into an anchored regex pattern.
///
/// `*` becomes `.*`, `?` becomes `.`, everything else is escaped literally.
pub fn wildcard_to_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 8);
    pattern.push('^');

    let mut literal_start = 0;
    for (offset, ch) in query.char_indices() {
        let wildcard = match ch {
            '*' => ".*",
            '?' => ".",
            _ => continue,
        };
        pattern.push_str(&regex::escape(&query[literal_start..offset]));
        pattern.push_str(wildcard);
        literal_start = offset + ch.len_utf8();
    }
    pattern.push_str(&regex::escape(&query[literal_start..]));

    pattern.push('$');
    pattern
}

/// Compiled wildcard patterns keyed by `(query, case_sensitive)`.
///
/// Failed compilations are cached too, as `None`, so a bad query is not
/// recompiled on every search.
pub struct PatternCache {
    compiled: Mutex<FnvHashMap<(Box<str>, bool), Option<Regex>>>,
    capacity: usize,
    size_limit: usize,
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(PATTERN_CACHE_CAPACITY, PATTERN_SIZE_LIMIT)
    }
}

impl PatternCache {
    pub fn new(capacity: usize, size_limit: usize) -> Self {
        Self {
            compiled: Mutex::new(FnvHashMap::default()),
            capacity: capacity.max(1),
            size_limit,
        }
    }

    /// Returns the compiled pattern for a wildcard query, or `None` if it
    /// does not compile.
    pub fn get_or_compile(&self, query: &str, case_sensitive: bool) -> Option<Regex> {
        let key = (Box::<str>::from(query), case_sensitive);
        if let Some(compiled) = self.compiled.lock().get(&key) {
            return compiled.clone();
        }

        let compiled = self.compile(query, case_sensitive);

        let mut cache = self.compiled.lock();
        if cache.len() >= self.capacity {
            cache.clear();
        }
        cache.insert(key, compiled.clone());
        compiled
    }

    pub fn len(&self) -> usize {
        self.compiled.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.compiled.lock().clear();
    }

    fn compile(&self, query: &str, case_sensitive: bool) -> Option<Regex> {
        let pattern = wildcard_to_pattern(query);
        match RegexBuilder::new(&pattern)
            .case_insensitive(!case_sensitive)
            .dot_matches_new_line(true)
            .size_limit(self.size_limit)
            .build()
        {
            Ok(regex) => Some(regex),
            Err(error) => {
                log::debug!("wildcard query {query:?} falls back to substring matching: {error}");
                None
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Mode {
    /// Empty query: matches nothing.
    Never,
    Wildcard(Regex),
    Substring(Finder<'static>),
    WholeWord(Finder<'static>),
}

/// A query prepared once and matched against many candidates.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    query: String,
    options: MatchOptions,
    mode: Mode,
}

impl CompiledQuery {
    /// Prepares `query` using the process-wide pattern cache.
    pub fn new(query: &str, options: MatchOptions) -> Self {
        Self::with_cache(query, options, &PATTERN_CACHE)
    }

    pub fn with_cache(query: &str, options: MatchOptions, cache: &PatternCache) -> Self {
        let mode = if query.is_empty() {
            Mode::Never
        } else if has_wildcards(query) {
            match cache.get_or_compile(query, options.case_sensitive) {
                Some(regex) => Mode::Wildcard(regex),
                None => Mode::Substring(needle(query, options.case_sensitive)),
            }
        } else if options.match_whole_word {
            Mode::WholeWord(needle(query, options.case_sensitive))
        } else {
            Mode::Substring(needle(query, options.case_sensitive))
        };

        Self {
            query: query.to_string(),
            options,
            mode,
        }
    }

    /// The query exactly as given.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Returns true if the query compiled to a wildcard pattern.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.mode, Mode::Wildcard(_))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.mode {
            Mode::Never => false,
            Mode::Wildcard(regex) => regex.is_match(candidate),
            Mode::Substring(needle) => needle.find(self.fold(candidate).as_bytes()).is_some(),
            Mode::WholeWord(needle) => contains_whole_word(&self.fold(candidate), needle),
        }
    }

    fn fold<'c>(&self, candidate: &'c str) -> Cow<'c, str> {
        if self.options.case_sensitive {
            Cow::Borrowed(candidate)
        } else {
            Cow::Owned(candidate.to_lowercase())
        }
    }
}

/// Matches a single candidate. Prefer [`CompiledQuery`] when matching many.
pub fn matches(candidate: &str, query: &str, options: MatchOptions) -> bool {
    CompiledQuery::new(query, options).matches(candidate)
}

fn needle(query: &str, case_sensitive: bool) -> Finder<'static> {
    if case_sensitive {
        Finder::new(query.as_bytes()).into_owned()
    } else {
        Finder::new(query.to_lowercase().as_bytes()).into_owned()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Tries every occurrence of the needle, overlapping ones included.
fn contains_whole_word(text: &str, needle: &Finder<'_>) -> bool {
    let needle_len = needle.needle().len();
    let bytes = text.as_bytes();
    let mut start = 0;

    while let Some(found) = needle.find(&bytes[start..]) {
        let begin = start + found;
        let end = begin + needle_len;

        let before = text[..begin]
            .chars()
            .next_back()
            .map_or(true, |ch| !is_word_char(ch));
        let after = text[end..]
            .chars()
            .next()
            .map_or(true, |ch| !is_word_char(ch));
        if before && after {
            return true;
        }

        start = begin + text[begin..].chars().next().map_or(1, char::len_utf8);
    }
    false
}
