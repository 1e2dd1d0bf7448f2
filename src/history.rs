//! Command history and its on-disk form.
//!
//! The file is a plain newline-separated list of past command lines, oldest
//! first. Loading renumbers entries from zero; within a session numbers only
//! grow, even after the oldest entries have been dropped.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default number of retained entries.
pub const HISTORY_MAX: usize = 4096;

/// Default file name, placed in `$HOME`.
pub const HISTORY_FILE: &str = ".hsh_history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub number: usize,
    pub line: String,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    next_number: usize,
    max: usize,
}

impl History {
    pub fn new(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            next_number: 0,
            max,
        }
    }

    /// Build a history from previously saved lines, keeping the newest `max`.
    pub fn from_lines<I, S>(lines: I, max: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::new(max);
        for line in lines {
            history.push(line);
        }
        history.renumber();
        history
    }

    /// Append a line and return its number.
    pub fn push(&mut self, line: impl Into<String>) -> usize {
        let number = self.next_number;
        self.entries.push_back(HistoryEntry {
            number,
            line: line.into(),
        });
        self.next_number += 1;
        while self.entries.len() > self.max {
            self.entries.pop_front();
        }
        number
    }

    fn renumber(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.number = i;
        }
        self.next_number = self.entries.len();
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.line.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_MAX)
    }
}

/// Read saved history lines. A missing file yields an empty list.
pub fn load_history(path: &Path) -> Result<Vec<String>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("can't read history {}", path.display()));
        }
    };
    Ok(text
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}

/// Write `lines` to `path`, one per line, replacing any previous contents.
pub fn save_history<'a>(path: &Path, lines: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("can't create history {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer
        .flush()
        .with_context(|| format!("can't write history {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_truncates_oldest_and_keeps_numbers_increasing() {
        let mut history = History::new(2);
        assert_eq!(history.push("a"), 0);
        assert_eq!(history.push("b"), 1);
        assert_eq!(history.push("c"), 2);

        let numbers: Vec<usize> = history.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(history.lines().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_from_lines_renumbers_from_zero() {
        let history = History::from_lines(["one", "two", "three"], 2);
        let entries: Vec<(usize, &str)> =
            history.iter().map(|e| (e.number, e.line.as_str())).collect();
        assert_eq!(entries, vec![(0, "two"), (1, "three")]);

        let mut history = history;
        assert_eq!(history.push("four"), 2);
    }

    #[test]
    fn test_save_then_load_reproduces_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history");
        let lines = vec!["ls -l", "echo $HOME", "false || true"];

        save_history(&path, lines.iter().copied())?;
        assert_eq!(load_history(&path)?, lines);

        // saving again without changes is idempotent
        let loaded = load_history(&path)?;
        save_history(&path, loaded.iter().map(String::as_str))?;
        assert_eq!(load_history(&path)?, lines);
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(load_history(&dir.path().join("absent"))?.is_empty());
        Ok(())
    }
}
