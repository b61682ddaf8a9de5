use std::io;
use std::path::Path;

/// Ordered, immutable class label table, indexed `0..len`.
///
/// For a detector its length bounds the class indices the engine may
/// return; for a classifier it must match the network's output size
/// exactly (validated at classifier construction).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Builds a table from newline-separated text, one label per line,
    /// trailing whitespace stripped. Empty lines are kept out.
    pub fn from_lines(text: &str) -> Self {
        let labels = text
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();
        Self { labels }
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_lines(&text))
    }

    /// Fallback table for networks shipped without label metadata: the
    /// class indices themselves, as strings.
    pub fn numbered(len: usize) -> Self {
        Self {
            labels: (0..len).map(|i| i.to_string()).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}
