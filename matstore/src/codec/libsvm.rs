//! LIBSVM codec (read only)

use super::file_io;
use crate::error::Result;
use crate::handle::LabeledData;
use matstore_core::validation::parse_libsvm_line;
use matstore_core::{CooMatrix, CoreError};
use std::path::Path;

/// Parsing options
#[derive(Debug, Clone, Copy, Default)]
pub struct LibsvmOptions {
    /// Feature indices start at 0
    pub zero_based: bool,
    /// Minimum number of feature columns
    pub n_features: Option<usize>,
}

pub fn read(path: &Path, options: LibsvmOptions) -> Result<LabeledData> {
    let text = file_io::read_to_string(path)?;
    Ok(parse(&text, options)?)
}

fn parse(text: &str, options: LibsvmOptions) -> std::result::Result<LabeledData, CoreError> {
    let mut labels = Vec::new();
    let mut triplets = Vec::new();
    let mut features = Vec::new();
    let mut width = 0;
    for (index, line) in text.lines().enumerate() {
        features.clear();
        let Some(label) = parse_libsvm_line(line, index + 1, options.zero_based, &mut features)?
        else {
            continue;
        };
        let row = labels.len();
        labels.push(label);
        for &(col, value) in &features {
            let end = col
                .checked_add(1)
                .ok_or(CoreError::malformed(index + 1, "feature index too large"))?;
            width = width.max(end);
            triplets.push((row, col, value));
        }
    }

    let ncols = match options.n_features {
        Some(n) if n < width => {
            return Err(CoreError::malformed(0, "feature index exceeds n_features"));
        }
        Some(n) => n,
        None => width,
    };
    let features = CooMatrix::from_triplets(labels.len(), ncols, triplets)?;
    Ok(LabeledData { features, labels })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1 1:0.5 3:2\n# comment line\n-1 qid:4 2:1.5 # trailing\n\n1\n";

    #[test]
    fn test_parse_labels_and_features() {
        let data = parse(SAMPLE, LibsvmOptions::default()).unwrap();
        assert_eq!(data.labels, vec![1.0, -1.0, 1.0]);
        assert_eq!(data.features.shape(), (3, 3));
        assert_eq!(
            data.features.triplets().collect::<Vec<_>>(),
            vec![(0, 0, 0.5), (0, 2, 2.0), (1, 1, 1.5)]
        );
    }

    #[test]
    fn test_options() {
        let wide = LibsvmOptions {
            n_features: Some(10),
            ..LibsvmOptions::default()
        };
        assert_eq!(parse(SAMPLE, wide).unwrap().features.shape(), (3, 10));

        let narrow = LibsvmOptions {
            n_features: Some(2),
            ..LibsvmOptions::default()
        };
        assert!(parse(SAMPLE, narrow).is_err());

        let zero_based = LibsvmOptions {
            zero_based: true,
            ..LibsvmOptions::default()
        };
        let data = parse("0 0:1 4:2\n", zero_based).unwrap();
        assert_eq!(data.features.shape(), (1, 5));
        assert!(parse("0 0:1\n", LibsvmOptions::default()).is_err());
    }

    #[test]
    fn test_index_at_usize_max_is_malformed() {
        let zero_based = LibsvmOptions {
            zero_based: true,
            ..LibsvmOptions::default()
        };
        let line = format!("1 {}:1\n", usize::MAX);
        assert_eq!(
            parse(&line, zero_based),
            Err(CoreError::malformed(1, "feature index too large"))
        );
    }

    #[test]
    fn test_empty_file() {
        let data = parse("", LibsvmOptions::default()).unwrap();
        assert!(data.is_empty());
        assert_eq!(data.features.shape(), (0, 0));
    }
}
