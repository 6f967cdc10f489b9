//! Feature reduction
//!
//! Post-processes the full corpus into the slim, model-ready dataset: the
//! per-point eye-landmark columns are averaged into one synthetic column per
//! eye and axis, and a fixed subset of corpus columns is passed through
//! unchanged. One slim row per corpus row, a pure projection with no filtering.

use crate::error::ProcessError;
use crate::table::{ColumnTable, Value};
use crate::types::{EYE_LMK_0_RANGE, EYE_LMK_1_RANGE, SLIM_PASSTHROUGH_COLUMNS};

const AXES: [&str; 3] = ["X", "Y", "Z"];

/// Derive the slim dataset from the full corpus.
///
/// Fails with `MissingColumn` when the corpus lacks a landmark or
/// pass-through column the slim schema requires.
pub fn reduce(corpus: &ColumnTable) -> Result<ColumnTable, ProcessError> {
    let mut slim = ColumnTable::new();

    for (eye, range) in [("0", EYE_LMK_0_RANGE), ("1", EYE_LMK_1_RANGE)] {
        for axis in AXES {
            let mut sources = Vec::new();
            for i in range.clone() {
                let name = format!("eye_lmk_{}_{}", axis, i);
                let column = corpus
                    .column(&name)
                    .ok_or(ProcessError::MissingColumn(name))?;
                sources.push(column);
            }
            let means = row_means(&sources, corpus.row_count());
            slim.push_column(&format!("eye_lmk_{}_{}", eye, axis), means)?;
        }
    }

    for name in SLIM_PASSTHROUGH_COLUMNS {
        let column = corpus
            .column(name)
            .ok_or_else(|| ProcessError::MissingColumn(name.to_string()))?;
        slim.push_column(name, column.to_vec())?;
    }

    Ok(slim)
}

/// Row-wise arithmetic mean across columns, skipping null cells.
/// A row whose every addend is null stays null.
fn row_means(columns: &[&[Value]], rows: usize) -> Vec<Value> {
    (0..rows)
        .map(|r| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for column in columns {
                if let Some(v) = column[r].as_f64() {
                    sum += v;
                    count += 1;
                }
            }
            if count == 0 {
                Value::Null
            } else {
                Value::Float(sum / count as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Corpus with every column the slim schema needs; landmark value is
    /// `base + point index` so the expected means are easy to read off.
    fn sample_corpus(rows: usize, base: f64) -> ColumnTable {
        let mut corpus = ColumnTable::new();
        for axis in AXES {
            for i in (20..=27).chain(48..=55) {
                let values = (0..rows)
                    .map(|_| Value::Float(base + i as f64))
                    .collect();
                corpus
                    .push_column(&format!("eye_lmk_{}_{}", axis, i), values)
                    .unwrap();
            }
        }
        for name in SLIM_PASSTHROUGH_COLUMNS {
            corpus
                .push_column(name, vec![Value::Int(1); rows])
                .unwrap();
        }
        corpus
    }

    #[test]
    fn test_landmark_means() {
        let corpus = sample_corpus(2, 0.0);
        let slim = reduce(&corpus).unwrap();

        // indices 20..=27 average to 23.5, 48..=55 to 51.5
        assert_eq!(slim.column("eye_lmk_0_X").unwrap()[0], Value::Float(23.5));
        assert_eq!(slim.column("eye_lmk_1_Z").unwrap()[1], Value::Float(51.5));
    }

    #[test]
    fn test_slim_schema_is_fixed() {
        let mut corpus = sample_corpus(1, 0.0);
        // extra corpus columns must not leak into the slim dataset
        corpus
            .push_column("pose_Rx", vec![Value::Float(0.1)])
            .unwrap();

        let slim = reduce(&corpus).unwrap();
        assert_eq!(slim.column_count(), 6 + SLIM_PASSTHROUGH_COLUMNS.len());
        assert_eq!(slim.row_count(), 1);
        assert!(!slim.has_column("pose_Rx"));
    }

    #[test]
    fn test_mean_skips_nulls() {
        let mut corpus = sample_corpus(1, 0.0);
        corpus.set_constant("eye_lmk_X_20", Value::Null);

        let slim = reduce(&corpus).unwrap();
        // mean over the seven remaining values 21..=27
        assert_eq!(slim.column("eye_lmk_0_X").unwrap()[0], Value::Float(24.0));
    }

    #[test]
    fn test_all_null_row_stays_null() {
        let mut corpus = sample_corpus(1, 0.0);
        for i in 20..=27 {
            corpus.set_constant(&format!("eye_lmk_Y_{}", i), Value::Null);
        }

        let slim = reduce(&corpus).unwrap();
        assert_eq!(slim.column("eye_lmk_0_Y").unwrap()[0], Value::Null);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let corpus = ColumnTable::new();
        let err = reduce(&corpus).unwrap_err();
        assert!(matches!(err, ProcessError::MissingColumn(_)));
    }

    #[test]
    fn test_known_mean_example() {
        let mut corpus = sample_corpus(1, 0.0);
        for (offset, i) in (20..=27).enumerate() {
            corpus.set_constant(
                &format!("eye_lmk_X_{}", i),
                Value::Float(offset as f64 + 1.0),
            );
        }

        let slim = reduce(&corpus).unwrap();
        // mean of 1..=8
        assert_eq!(slim.column("eye_lmk_0_X").unwrap()[0], Value::Float(4.5));
    }
}
