//! Name and path search over a loaded database.
//!
//! Both search forms scan linearly in storage order, files first and then
//! folders, so results are reproducible for identical inputs. A result bound
//! reached while scanning files leaves no room for folders.

use serde::Serialize;

use crate::database::Database;
use crate::matcher::{CompiledQuery, MatchOptions};
use crate::types::{Entry, Folder};
use crate::view::EntryView;

/// Parameters for [`Database::search`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOptions {
    pub query: String,
    pub case_sensitive: bool,
    pub match_whole_word: bool,
    pub search_in_files: bool,
    pub search_in_folders: bool,
    /// Maximum combined number of files and folders returned; 0 means unlimited.
    pub max_results: usize,
}

impl SearchOptions {
    /// Case-insensitive substring search over both files and folders, unbounded.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            case_sensitive: false,
            match_whole_word: false,
            search_in_files: true,
            search_in_folders: true,
            max_results: 0,
        }
    }

    fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            match_whole_word: self.match_whole_word,
        }
    }
}

/// Matching entries, borrowed from the database that produced them.
#[derive(Debug, Clone)]
pub struct SearchResult<'a> {
    database: &'a Database,
    pub files: Vec<&'a Entry>,
    pub folders: Vec<&'a Folder>,
}

impl<'a> SearchResult<'a> {
    fn empty(database: &'a Database) -> Self {
        Self {
            database,
            files: Vec::new(),
            folders: Vec::new(),
        }
    }

    /// Combined number of files and folders.
    pub fn len(&self) -> usize {
        self.files.len() + self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// Views over all matches, files first.
    pub fn iter(&self) -> impl Iterator<Item = EntryView<'a>> + '_ {
        let database = self.database;
        self.files
            .iter()
            .copied()
            .chain(self.folders.iter().map(|folder| folder.entry()))
            .map(move |entry| EntryView::new(database, entry))
    }
}

/// Remaining room under a result bound.
struct Budget {
    limit: usize,
    used: usize,
}

impl Budget {
    fn new(max_results: usize) -> Self {
        Self {
            limit: max_results,
            used: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.limit != 0 && self.used >= self.limit
    }

    fn take(&mut self) {
        self.used += 1;
    }
}

impl Database {
    /// Matches the query against bare entry names.
    pub fn search(&self, options: &SearchOptions) -> SearchResult<'_> {
        let mut result = SearchResult::empty(self);
        if options.query.is_empty() {
            return result;
        }

        let query = CompiledQuery::new(&options.query, options.match_options());
        let mut budget = Budget::new(options.max_results);

        if options.search_in_files {
            for file in self.files() {
                if budget.is_full() {
                    break;
                }
                if query.matches(file.name()) {
                    result.files.push(file);
                    budget.take();
                }
            }
        }

        if options.search_in_folders {
            for folder in self.folders() {
                if budget.is_full() {
                    break;
                }
                if query.matches(folder.name()) {
                    result.folders.push(folder);
                    budget.take();
                }
            }
        }

        log::debug!(
            "name search {:?} (wildcard: {}): {} files, {} folders",
            options.query,
            query.is_wildcard(),
            result.files.len(),
            result.folders.len()
        );
        result
    }

    /// Matches a pattern against full paths of every file and folder.
    ///
    /// Paths are resolved through the path cache, so the first search fills it.
    pub fn search_by_path(&self, pattern: &str, case_sensitive: bool) -> SearchResult<'_> {
        let mut result = SearchResult::empty(self);
        if pattern.is_empty() {
            return result;
        }

        let query = CompiledQuery::new(
            pattern,
            MatchOptions {
                case_sensitive,
                match_whole_word: false,
            },
        );

        result.files = self
            .files()
            .iter()
            .filter(|file| query.matches(&self.resolve_path(file)))
            .collect();
        result.folders = self
            .folders()
            .iter()
            .filter(|folder| query.matches(&self.resolve_path(folder.entry())))
            .collect();

        log::debug!(
            "path search {:?}: {} files, {} folders ({} paths cached)",
            pattern,
            result.files.len(),
            result.folders.len(),
            self.cached_path_count()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_database;

    fn file_names(result: &SearchResult<'_>) -> Vec<String> {
        result.files.iter().map(|file| file.name().to_string()).collect()
    }

    fn folder_names(result: &SearchResult<'_>) -> Vec<String> {
        result
            .folders
            .iter()
            .map(|folder| folder.name().to_string())
            .collect()
    }

    #[test]
    fn test_substring_search() {
        let db = sample_database();
        let result = db.search(&SearchOptions::new("test"));
        assert_eq!(file_names(&result), vec!["test.txt", "test.go"]);
        assert!(result.folders.is_empty());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_wildcard_search_files_only() {
        let db = sample_database();
        let options = SearchOptions {
            search_in_folders: false,
            ..SearchOptions::new("*.txt")
        };
        let result = db.search(&options);
        assert_eq!(file_names(&result), vec!["test.txt", "readme.txt"]);
        assert!(result.folders.is_empty());
    }

    #[test]
    fn test_case_sensitive_search() {
        let db = sample_database();
        let options = SearchOptions {
            case_sensitive: true,
            ..SearchOptions::new("Test")
        };
        assert!(db.search(&options).is_empty());

        let options = SearchOptions {
            case_sensitive: true,
            ..SearchOptions::new("Documents")
        };
        assert_eq!(folder_names(&db.search(&options)), vec!["Documents"]);
    }

    #[test]
    fn test_folder_search() {
        let db = sample_database();
        let options = SearchOptions {
            search_in_files: false,
            ..SearchOptions::new("do")
        };
        let result = db.search(&options);
        assert!(result.files.is_empty());
        assert_eq!(folder_names(&result), vec!["Documents", "Downloads"]);
    }

    #[test]
    fn test_whole_word_search() {
        let db = sample_database();
        let options = SearchOptions {
            match_whole_word: true,
            ..SearchOptions::new("test")
        };
        assert_eq!(file_names(&db.search(&options)), vec!["test.txt", "test.go"]);

        let options = SearchOptions {
            match_whole_word: true,
            ..SearchOptions::new("tes")
        };
        assert!(db.search(&options).is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let db = sample_database();
        assert!(db.search(&SearchOptions::new("")).is_empty());
        assert!(db.search_by_path("", false).is_empty());
    }

    #[test]
    fn test_search_in_neither_collection() {
        let db = sample_database();
        let options = SearchOptions {
            search_in_files: false,
            search_in_folders: false,
            ..SearchOptions::new("e")
        };
        assert!(db.search(&options).is_empty());
    }

    #[test]
    fn test_max_results_is_file_biased() {
        let db = sample_database();
        // Every non-empty name matches; the files alone fill the bound.
        let options = SearchOptions {
            max_results: 5,
            ..SearchOptions::new("?*")
        };
        let result = db.search(&options);
        assert_eq!(result.files.len(), 5);
        assert!(result.folders.is_empty());
    }

    #[test]
    fn test_max_results_never_exceeded() {
        let db = sample_database();
        for max_results in 1..12 {
            let options = SearchOptions {
                max_results,
                ..SearchOptions::new("*")
            };
            let result = db.search(&options);
            assert_eq!(result.len(), max_results.min(10), "max_results = {max_results}");
        }

        let options = SearchOptions {
            max_results: 7,
            ..SearchOptions::new("*")
        };
        let result = db.search(&options);
        assert_eq!(result.files.len(), 5);
        assert_eq!(folder_names(&result), vec!["", "home"]);
    }

    #[test]
    fn test_unbounded_search() {
        let db = sample_database();
        let result = db.search(&SearchOptions::new("*"));
        assert_eq!(result.files.len(), 5);
        assert_eq!(result.folders.len(), 5);
    }

    #[test]
    fn test_search_by_path() {
        let db = sample_database();
        let result = db.search_by_path("/home/*", false);
        assert_eq!(file_names(&result), vec!["test.txt", "readme.txt"]);
        assert_eq!(folder_names(&result), vec!["user"]);
    }

    #[test]
    fn test_search_by_path_substring() {
        let db = sample_database();
        let result = db.search_by_path("documents/", false);
        assert_eq!(file_names(&result), vec!["document.pdf", "test.go"]);
        assert!(result.folders.is_empty());

        assert!(db.search_by_path("documents/", true).is_empty());
    }

    #[test]
    fn test_search_by_path_fills_cache() {
        let db = sample_database();
        assert_eq!(db.cached_path_count(), 0);
        db.search_by_path("*.zip", false);
        assert_eq!(db.cached_path_count(), 10);
    }

    #[test]
    fn test_result_views() {
        let db = sample_database();
        let result = db.search(&SearchOptions::new("test"));
        let paths = result
            .iter()
            .map(|view| view.full_path().to_string())
            .collect::<Vec<_>>();
        assert_eq!(paths, vec!["/home/user/test.txt", "/Documents/test.go"]);
    }

    #[test]
    fn test_searches_share_database_across_threads() {
        let db = sample_database();
        let counts = std::thread::scope(|scope| {
            let handles = (0..4)
                .map(|_| scope.spawn(|| db.search_by_path("*t*", false).len()))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });
        assert!(counts.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(db.cached_path_count(), 10);
    }
}
