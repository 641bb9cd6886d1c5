//! Navigation state and file list logic for fex.
//!
//! [Explorer] owns the listing of the current directory (or the results of a
//! recursive search), the filtered and sorted view over it, the cursor, the
//! directory history and the sort mode. Every operation updates listing, view
//! and cursor together, so the cursor never points outside the view.

use crate::config::{ClassifierChoice, Config};
use crate::core::classify::{Classifier, FileCommandClassifier, MagicClassifier};
use crate::core::diagnostics::Diagnostics;
use crate::core::error::PathError;
use crate::core::find::{self, NameMatcher};
use crate::core::fm::{FileEntry, browse_dir};
use crate::utils::expand_home_path;

use serde::Deserialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

/// Order of the visible entries. Cycles in declaration order.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    NameAsc,
    NameDesc,
    SizeAsc,
    SizeDesc,
    /// Name ascending, without a header label.
    None,
}

impl SortMode {
    pub fn next(self) -> Self {
        match self {
            SortMode::NameAsc => SortMode::NameDesc,
            SortMode::NameDesc => SortMode::SizeAsc,
            SortMode::SizeAsc => SortMode::SizeDesc,
            SortMode::SizeDesc => SortMode::None,
            SortMode::None => SortMode::NameAsc,
        }
    }

    /// Header label. Empty for [SortMode::None].
    pub fn describe(self) -> &'static str {
        match self {
            SortMode::NameAsc => "Name ascending",
            SortMode::NameDesc => "Name descending",
            SortMode::SizeAsc => "Size ascending",
            SortMode::SizeDesc => "Size descending",
            SortMode::None => "",
        }
    }

    /// Compares two entries, falling back to listing order on equal keys.
    fn compare(self, a: (usize, &FileEntry), b: (usize, &FileEntry)) -> Ordering {
        let key = match self {
            SortMode::NameAsc | SortMode::None => a.1.display_name().cmp(b.1.display_name()),
            SortMode::NameDesc => b.1.display_name().cmp(a.1.display_name()),
            SortMode::SizeAsc => a.1.size().cmp(&b.1.size()),
            SortMode::SizeDesc => b.1.size().cmp(&a.1.size()),
        };
        key.then(a.0.cmp(&b.0))
    }
}

/// Listing options for an [Explorer].
#[derive(Default)]
pub struct ExplorerOptions {
    pub sort: SortMode,
    pub dot_entries: bool,
    pub classifier: Option<Box<dyn Classifier>>,
}

impl ExplorerOptions {
    pub fn from_config(config: &Config, diag: &Diagnostics) -> Self {
        let general = config.general();
        let classifier: Option<Box<dyn Classifier>> = match general.classifier() {
            ClassifierChoice::Internal => Some(Box::new(MagicClassifier)),
            ClassifierChoice::File => match FileCommandClassifier::detect() {
                Some(c) => Some(Box::new(c)),
                None => {
                    diag.note("file command not found, using the internal classifier");
                    Some(Box::new(MagicClassifier))
                }
            },
            ClassifierChoice::Off => None,
        };
        Self {
            sort: general.sort(),
            dot_entries: general.dot_entries(),
            classifier,
        }
    }
}

pub struct Explorer {
    entries: Vec<FileEntry>,
    visible: Vec<usize>,
    cursor: usize,
    history: Vec<PathBuf>,
    sort: SortMode,
    dot_entries: bool,
    classifier: Option<Box<dyn Classifier>>,
    diag: Diagnostics,
}

impl Explorer {
    /// Opens `start` (resolved against the process working directory).
    pub fn new(
        start: impl AsRef<Path>,
        opts: ExplorerOptions,
        diag: Diagnostics,
    ) -> Result<Self, PathError> {
        let mut explorer = Explorer {
            entries: Vec::new(),
            visible: Vec::new(),
            cursor: 0,
            history: Vec::new(),
            sort: opts.sort,
            dot_entries: opts.dot_entries,
            classifier: opts.classifier,
            diag,
        };
        explorer.change_directory(start)?;
        Ok(explorer)
    }

    // Getters / Accessors

    /// The directory on top of the history.
    pub fn cwd(&self) -> &Path {
        self.history.last().map_or(Path::new(""), PathBuf::as_path)
    }

    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of visible entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    #[inline]
    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    #[inline]
    pub fn history(&self) -> &[PathBuf] {
        &self.history
    }

    /// All listed entries, in listing order, regardless of the filter.
    #[inline]
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// The current view as indices into [Explorer::entries].
    #[inline]
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.visible.iter().map(|&i| &self.entries[i])
    }

    pub fn entry_at(&self, pos: usize) -> Option<&FileEntry> {
        self.visible.get(pos).map(|&i| &self.entries[i])
    }

    pub fn current_entry(&self) -> Option<&FileEntry> {
        self.entry_at(self.cursor)
    }

    /// Every selected entry, visible or not, in listing order.
    pub fn selected_entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.entries.iter().filter(|e| e.is_selected())
    }

    pub fn selected_paths(&self) -> Vec<PathBuf> {
        self.selected_entries()
            .map(|e| e.full_path().to_path_buf())
            .collect()
    }

    pub fn classifier(&self) -> Option<&dyn Classifier> {
        self.classifier.as_deref()
    }

    // Navigation functions

    fn resolve(&self, path: &Path) -> Result<PathBuf, PathError> {
        let expanded = match path.to_str() {
            Some(s) => expand_home_path(s),
            None => path.to_path_buf(),
        };
        let absolute = if expanded.is_relative() && !self.history.is_empty() {
            self.cwd().join(&expanded)
        } else {
            expanded
        };
        fs::canonicalize(&absolute).map_err(|e| PathError::new(&absolute, e))
    }

    fn list(&self, dir: &Path) -> Result<Vec<FileEntry>, PathError> {
        browse_dir(dir, self.classifier(), self.dot_entries).map_err(|e| PathError::new(dir, e))
    }

    /// Replaces the listing and resets the view to every entry, sorted.
    fn load(&mut self, entries: Vec<FileEntry>) {
        self.entries = entries;
        self.visible = (0..self.entries.len()).collect();
        self.apply_sort();
        self.cursor = 0;
    }

    fn apply_sort(&mut self) {
        let entries = &self.entries;
        let sort = self.sort;
        self.visible
            .sort_by(|&a, &b| sort.compare((a, &entries[a]), (b, &entries[b])));
    }

    /// Lists `path` and makes it the current directory.
    ///
    /// A leading `~` is expanded and relative paths are taken from the current
    /// directory. On failure nothing changes.
    pub fn change_directory(&mut self, path: impl AsRef<Path>) -> Result<(), PathError> {
        let resolved = self.resolve(path.as_ref())?;
        let entries = self.list(&resolved)?;

        self.load(entries);
        self.diag.note(format!("cd {}", resolved.display()));
        // revisiting a directory rewinds the history to it
        match self.history.iter().position(|p| *p == resolved) {
            Some(i) => self.history.truncate(i + 1),
            None => self.history.push(resolved),
        }
        Ok(())
    }

    /// Drops the current directory from the history and re-lists the previous
    /// one. No-op with a single history entry.
    ///
    /// Previous directories that can no longer be listed are dropped too. When
    /// none is left the current directory stays and the last failure is
    /// returned.
    pub fn go_back(&mut self) -> Result<(), PathError> {
        if self.history.len() < 2 {
            return Ok(());
        }
        let Some(current) = self.history.pop() else {
            return Ok(());
        };

        let mut failure = None;
        while let Some(prev) = self.history.last().cloned() {
            match self.list(&prev) {
                Ok(entries) => {
                    self.load(entries);
                    self.diag.note(format!("back to {}", prev.display()));
                    return Ok(());
                }
                Err(e) => {
                    self.diag.note(format!("dropped from history: {e}"));
                    self.history.pop();
                    failure = Some(e);
                }
            }
        }

        self.history.push(current);
        failure.map_or(Ok(()), Err)
    }

    /// Re-lists the current directory, discarding filters and search results.
    pub fn refresh(&mut self) -> Result<(), PathError> {
        let cwd = self.cwd().to_path_buf();
        self.change_directory(cwd)
    }

    /// Moves the cursor to `pos`, clamped into the view.
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos.min(self.visible.len().saturating_sub(1));
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.next();
        self.apply_sort();
        self.diag.note(format!("sort: {:?}", self.sort));
    }

    /// Flips the selection of the entry at view position `pos` and returns the
    /// new state, or `None` when `pos` is outside the view.
    pub fn toggle_select(&mut self, pos: usize) -> Option<bool> {
        let idx = *self.visible.get(pos)?;
        let entry = &mut self.entries[idx];
        let selected = !entry.is_selected();
        entry.set_selected(selected);
        Some(selected)
    }

    pub fn clear_selection(&mut self) {
        for entry in &mut self.entries {
            entry.set_selected(false);
        }
    }

    /// Shows only the entries whose name matches `pattern` and puts the cursor
    /// on the first one.
    pub fn filter_by_name(&mut self, pattern: &str) {
        let matcher = NameMatcher::new(pattern);
        self.visible = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matcher.is_match(e.display_name()))
            .map(|(i, _)| i)
            .collect();
        self.apply_sort();
        self.cursor = 0;
    }

    /// Shows every entry again. Cursor and selection are kept (clamped).
    pub fn clear_filter(&mut self) {
        self.visible = (0..self.entries.len()).collect();
        self.apply_sort();
        self.set_cursor(self.cursor);
    }

    /// Replaces the listing with every entry below the current directory whose
    /// name matches `pattern`. The history is left alone.
    pub fn search_recursive(&mut self, pattern: &str) -> Result<(), PathError> {
        let matcher = NameMatcher::new(pattern);
        let results = find::search_recursive(self.cwd(), &matcher)?;
        self.diag.note(format!(
            "search '{}' in {}: {} result(s)",
            pattern,
            self.cwd().display(),
            results.len()
        ));
        self.load(results);
        Ok(())
    }
}

/// Navigation tests
#[cfg(test)]
mod tests {
    use super::*;

    use rand::seq::SliceRandom;
    use rand::{Rng, rng};
    use std::error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn plain() -> ExplorerOptions {
        ExplorerOptions {
            sort: SortMode::NameAsc,
            dot_entries: false,
            classifier: None,
        }
    }

    fn write_file(path: &Path, size: usize) -> Result<(), Box<dyn error::Error>> {
        let mut f = File::create(path)?;
        f.write_all(&vec![b'x'; size])?;
        Ok(())
    }

    fn names(ex: &Explorer) -> Vec<String> {
        ex.visible_entries()
            .map(|e| e.display_name().to_string())
            .collect()
    }

    #[test]
    fn test_sort_is_independent_of_creation_order() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut files: Vec<String> = (0..20).map(|i| format!("file_{i:02}")).collect();
        files.shuffle(&mut rng());
        for name in &files {
            File::create(dir.path().join(name))?;
        }

        let ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;
        files.sort();
        assert_eq!(names(&ex), files);
        Ok(())
    }

    #[test]
    fn test_sort_cycle_returns_to_start() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        for (name, size) in [("a", 30), ("b", 10), ("c", 20), ("d", 10)] {
            write_file(&dir.path().join(name), size)?;
        }
        let mut ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;
        let start = ex.visible_indices().to_vec();

        ex.cycle_sort();
        assert_eq!(names(&ex), ["d", "c", "b", "a"]);
        ex.cycle_sort();
        let sizes: Vec<u64> = ex.visible_entries().map(|e| e.size()).collect();
        assert_eq!(sizes, [10, 10, 20, 30]);
        let ties = &ex.visible_indices()[..2];
        assert!(ties[0] < ties[1], "equal sizes keep listing order");
        let once = ex.visible_indices().to_vec();
        ex.apply_sort();
        assert_eq!(ex.visible_indices(), once, "sorting twice is a no-op");

        ex.cycle_sort();
        ex.cycle_sort();
        assert_eq!(ex.sort_mode(), SortMode::None);
        ex.cycle_sort();
        assert_eq!(ex.sort_mode(), SortMode::NameAsc);
        assert_eq!(ex.visible_indices(), start);
        Ok(())
    }

    #[test]
    fn test_cursor_stays_in_bounds() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        for i in 0..15 {
            File::create(dir.path().join(format!("f{i}")))?;
        }
        let mut ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;
        let mut rng = rng();

        for _ in 0..500 {
            match rng.random_range(0..5) {
                0 => ex.set_cursor(ex.cursor() + rng.random_range(0..40)),
                1 => ex.set_cursor(ex.cursor().saturating_sub(rng.random_range(0..40))),
                2 => ex.filter_by_name(&format!("{}", rng.random_range(0..20))),
                3 => ex.clear_filter(),
                _ => ex.cycle_sort(),
            }
            assert!(ex.cursor() < ex.len().max(1));
            let mut seen = ex.visible_indices().to_vec();
            seen.sort_unstable();
            seen.dedup();
            assert_eq!(seen.len(), ex.len(), "visible indices must be unique");
            assert!(seen.iter().all(|&i| i < ex.entries().len()));
        }
        Ok(())
    }

    #[test]
    fn test_filter_idempotent_and_clear_restores() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        for name in ["main.rs", "lib.rs", "notes.md", "Cargo.toml"] {
            File::create(dir.path().join(name))?;
        }
        let mut ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;
        let all = ex.visible_indices().to_vec();

        ex.set_cursor(3);
        ex.filter_by_name(".rs");
        assert_eq!(ex.cursor(), 0);
        let once = ex.visible_indices().to_vec();
        ex.filter_by_name(".rs");
        assert_eq!(ex.visible_indices(), once);
        assert_eq!(names(&ex), ["lib.rs", "main.rs"]);

        ex.filter_by_name(r"r:.*\.MD");
        assert_eq!(names(&ex), ["notes.md"]);

        ex.filter_by_name("r:[");
        assert!(ex.is_empty());
        assert!(ex.current_entry().is_none());

        ex.clear_filter();
        assert_eq!(ex.visible_indices(), all);
        Ok(())
    }

    #[test]
    fn test_selection_survives_filter() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        for name in ["alpha", "beta", "gamma"] {
            File::create(dir.path().join(name))?;
        }
        let mut ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;

        assert_eq!(ex.toggle_select(0), Some(true));
        assert_eq!(ex.toggle_select(2), Some(true));
        assert_eq!(ex.toggle_select(9), None);

        ex.filter_by_name("beta");
        assert_eq!(ex.selected_paths().len(), 2, "hidden entries stay selected");
        ex.clear_filter();
        let selected: Vec<_> = ex.visible_entries().map(|e| e.is_selected()).collect();
        assert_eq!(selected, [true, false, true]);

        ex.filter_by_name("a");
        ex.clear_selection();
        ex.clear_filter();
        assert!(ex.selected_paths().is_empty());
        Ok(())
    }

    #[test]
    fn test_history_skips_duplicates() -> Result<(), Box<dyn error::Error>> {
        let base = tempdir()?;
        let a = base.path().join("a");
        let b = base.path().join("b");
        fs::create_dir(&a)?;
        fs::create_dir(&b)?;
        File::create(b.join("inside"))?;

        let mut ex = Explorer::new(&a, plain(), Diagnostics::default())?;
        ex.go_back()?;
        assert_eq!(ex.history().len(), 1, "back on a single entry is a no-op");

        ex.change_directory("../b")?;
        assert_eq!(names(&ex), ["inside"]);
        ex.change_directory(&b)?;
        assert_eq!(ex.history().len(), 2, "same directory is not pushed twice");

        ex.go_back()?;
        assert_eq!(ex.cwd(), fs::canonicalize(&a)?);
        assert_eq!(ex.history().len(), 1);
        Ok(())
    }

    #[test]
    fn test_revisit_rewinds_history() -> Result<(), Box<dyn error::Error>> {
        let base = tempdir()?;
        let a = base.path().join("a");
        let b = base.path().join("b");
        fs::create_dir(&a)?;
        fs::create_dir(&b)?;

        let mut ex = Explorer::new(&a, plain(), Diagnostics::default())?;
        ex.change_directory(&b)?;
        ex.change_directory(&a)?;
        assert_eq!(ex.history(), [fs::canonicalize(&a)?]);

        ex.go_back()?;
        assert_eq!(ex.cwd(), fs::canonicalize(&a)?);
        Ok(())
    }

    #[test]
    fn test_back_skips_removed_directories() -> Result<(), Box<dyn error::Error>> {
        let base = tempdir()?;
        let (a, b, c) = (base.path().join("a"), base.path().join("b"), base.path().join("c"));
        for dir in [&a, &b, &c] {
            fs::create_dir(dir)?;
        }
        File::create(a.join("in_a"))?;

        let mut ex = Explorer::new(&a, plain(), Diagnostics::default())?;
        ex.change_directory(&b)?;
        ex.change_directory(&c)?;
        fs::remove_dir(&b)?;

        ex.go_back()?;
        assert_eq!(ex.cwd(), fs::canonicalize(&a)?);
        assert_eq!(ex.history().len(), 1);
        assert_eq!(names(&ex), ["in_a"]);
        Ok(())
    }

    #[test]
    fn test_back_with_nothing_listable_stays() -> Result<(), Box<dyn error::Error>> {
        let base = tempdir()?;
        let (a, b) = (base.path().join("a"), base.path().join("b"));
        fs::create_dir(&a)?;
        fs::create_dir(&b)?;
        File::create(b.join("in_b"))?;

        let mut ex = Explorer::new(&a, plain(), Diagnostics::default())?;
        ex.change_directory(&b)?;
        fs::remove_dir(&a)?;

        assert!(ex.go_back().is_err());
        assert_eq!(ex.cwd(), fs::canonicalize(&b)?);
        assert_eq!(ex.history().len(), 1);
        assert_eq!(names(&ex), ["in_b"]);
        ex.go_back()?;
        Ok(())
    }

    #[test]
    fn test_sort_none_orders_by_name() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        let mut files = vec!["zeta", "alpha", "mid", "beta", "omega", "kappa"];
        files.shuffle(&mut rng());
        for name in &files {
            File::create(dir.path().join(name))?;
        }
        let opts = ExplorerOptions {
            sort: SortMode::None,
            ..plain()
        };
        let ex = Explorer::new(dir.path(), opts, Diagnostics::default())?;
        assert_eq!(names(&ex), ["alpha", "beta", "kappa", "mid", "omega", "zeta"]);
        assert_eq!(ex.sort_mode().describe(), "");
        Ok(())
    }

    #[test]
    fn test_failed_cd_keeps_state() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        File::create(dir.path().join("keep"))?;
        let mut ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;
        ex.toggle_select(0);

        let err = ex.change_directory("missing_dir");
        assert!(err.is_err());
        assert_eq!(ex.cwd(), fs::canonicalize(dir.path())?);
        assert_eq!(names(&ex), ["keep"]);
        assert_eq!(ex.selected_paths().len(), 1);
        assert_eq!(ex.history().len(), 1);
        Ok(())
    }

    #[test]
    fn test_recursive_search_then_refresh() -> Result<(), Box<dyn error::Error>> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("src/app"))?;
        File::create(dir.path().join("src/app/mode.rs"))?;
        File::create(dir.path().join("src/lib.rs"))?;
        File::create(dir.path().join("README.md"))?;

        let mut ex = Explorer::new(dir.path(), plain(), Diagnostics::default())?;
        ex.search_recursive(r"r:.*\.rs")?;
        assert_eq!(ex.len(), 2);
        assert_eq!(ex.history().len(), 1);
        assert!(ex.visible_entries().all(|e| e.full_path().is_absolute()));

        ex.refresh()?;
        assert_eq!(names(&ex), ["README.md", "src"]);
        Ok(())
    }

    #[test]
    fn test_dot_entries_lead_to_parent() -> Result<(), Box<dyn error::Error>> {
        let base = tempdir()?;
        let sub = base.path().join("sub");
        fs::create_dir(&sub)?;
        let opts = ExplorerOptions {
            sort: SortMode::None,
            dot_entries: true,
            classifier: None,
        };
        let mut ex = Explorer::new(&sub, opts, Diagnostics::default())?;
        assert_eq!(names(&ex), [".", ".."]);

        let parent = ex.entry_at(1).ok_or("missing ..")?.full_path().to_path_buf();
        ex.change_directory(parent)?;
        assert_eq!(ex.cwd(), fs::canonicalize(base.path())?);
        Ok(())
    }
}
