//! Sample records and the ordered sample index

use std::path::{Path, PathBuf};

use crate::error::{DatasetError, Result};

/// One labelled sample of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sample {
    /// 1-based id, matches the `<id>.bs2` file name
    pub id: u32,
    /// Class index
    pub label: u32,
}

impl Sample {
    /// Create a new sample record
    pub const fn new(id: u32, label: u32) -> Self {
        Self { id, label }
    }
}

/// Ordered list of samples. Order defines minibatch traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleIndex {
    samples: Vec<Sample>,
}

impl SampleIndex {
    /// Wrap an already ordered list of samples
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Parse index text: one `<id> <label>` pair per line, whitespace or
    /// comma separated. Blank lines and `#` comment lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_named(text, Path::new("<memory>"))
    }

    /// Load an index file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DatasetError::from_io(path, e))?;
        let index = Self::parse_named(&text, path)?;
        log::info!("Loaded {} samples from {}", index.len(), path.display());
        Ok(index)
    }

    fn parse_named(text: &str, origin: &Path) -> Result<Self> {
        let mut samples = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|f| !f.is_empty());
            let (id, label) = match (fields.next(), fields.next(), fields.next()) {
                (Some(id), Some(label), None) => (id, label),
                _ => {
                    return Err(DatasetError::format(
                        PathBuf::from(origin),
                        format!("line {}: expected `<id> <label>`, found {:?}", line_no + 1, line),
                    ))
                }
            };

            let id = parse_field(id, "sample id", line_no, origin)?;
            let label = parse_field(label, "label", line_no, origin)?;
            samples.push(Sample { id, label });
        }
        Ok(Self { samples })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at a traversal position
    pub fn get(&self, position: usize) -> Option<&Sample> {
        self.samples.get(position)
    }

    /// Iterate in traversal order
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// All samples in traversal order
    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Labels in traversal order
    pub fn labels(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.label).collect()
    }
}

impl<'a> IntoIterator for &'a SampleIndex {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl FromIterator<Sample> for SampleIndex {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

fn parse_field(field: &str, what: &str, line_no: usize, origin: &Path) -> Result<u32> {
    field.parse().map_err(|_| {
        DatasetError::format(
            PathBuf::from(origin),
            format!("line {}: invalid {} {:?}", line_no + 1, what, field),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let text = "#sample\t#class\n1\t5\n2\t0\n\n3\t4\n";
        let index = SampleIndex::parse(text).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get(0), Some(&Sample::new(1, 5)));
        assert_eq!(index.labels(), vec![5, 0, 4]);
    }

    #[test]
    fn test_order_is_file_order_not_id_order() {
        let index = SampleIndex::parse("10 1\n2 3\n7,9\n").unwrap();
        let ids: Vec<u32> = index.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![10, 2, 7]);
    }

    #[test]
    fn test_malformed_lines() {
        let err = SampleIndex::parse("1 5\n2\n").unwrap_err();
        match err {
            DatasetError::FormatError { reason, .. } => assert!(reason.starts_with("line 2")),
            other => panic!("unexpected error: {other}"),
        }

        assert!(SampleIndex::parse("1 5 9\n").is_err());
        assert!(SampleIndex::parse("one 5\n").is_err());
        assert!(SampleIndex::parse("1 -5\n").is_err());
    }

    #[test]
    fn test_missing_index_file() {
        let err = SampleIndex::from_file("/nonexistent/train1K.txt").unwrap_err();
        assert!(matches!(err, DatasetError::FileNotFound { .. }));
    }
}
