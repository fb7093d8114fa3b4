use std::fmt;

use plantai_backend::{FilePrediction, Prediction};

use crate::locale::format_confidence;

const ERROR_PREFIX: &str = "Error processing file";
const NO_PREDICTIONS: &str = "No predictions returned";
const UNNAMED_FILE: &str = "(unnamed)";
const HEADERS: [&str; 3] = ["Filename", "Prediction", "Confidence"];

/// One rendered row of the batch results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRow {
    /// Only set on the first row of each file.
    pub filename: Option<String>,
    pub prediction: String,
    pub confidence: String,
    pub is_error: bool,
}

/// Top predictions for a batch of images, flattened for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionTable {
    rows: Vec<PredictionRow>,
    files: usize,
}

impl PredictionTable {
    pub fn from_results(results: &[FilePrediction]) -> Self {
        let mut rows = Vec::new();
        for result in results {
            let filename = result
                .filename
                .clone()
                .unwrap_or_else(|| UNNAMED_FILE.to_string());

            if result.top_predictions.is_empty() {
                rows.push(PredictionRow {
                    filename: Some(filename),
                    prediction: NO_PREDICTIONS.to_string(),
                    confidence: String::new(),
                    is_error: false,
                });
                continue;
            }

            for (index, prediction) in result.top_predictions.iter().enumerate() {
                rows.push(row(
                    (index == 0).then(|| filename.clone()),
                    prediction,
                ));
            }
        }

        Self {
            rows,
            files: results.len(),
        }
    }

    pub fn file_count(&self) -> usize {
        self.files
    }

    pub fn has_errors(&self) -> bool {
        self.rows.iter().any(|row| row.is_error)
    }
}

fn row(filename: Option<String>, prediction: &Prediction) -> PredictionRow {
    match prediction.class_name.strip_prefix(ERROR_PREFIX) {
        Some(rest) => PredictionRow {
            filename,
            prediction: format!("Error: {}", rest.trim_start_matches(':').trim()),
            confidence: "N/A".to_string(),
            is_error: true,
        },
        None => PredictionRow {
            filename,
            prediction: prediction.class_name.clone(),
            confidence: format_confidence(prediction.confidence),
            is_error: false,
        },
    }
}

impl fmt::Display for PredictionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<[&str; 3]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.filename.as_deref().unwrap_or(""),
                    row.prediction.as_str(),
                    row.confidence.as_str(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|header| header.chars().count());
        for line in &cells {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(f, &widths, HEADERS)?;
        writeln!(
            f,
            "{}",
            "-".repeat(widths.iter().sum::<usize>() + 4)
        )?;
        for line in cells {
            write_row(f, &widths, line)?;
        }
        Ok(())
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize; 3], line: [&str; 3]) -> fmt::Result {
    writeln!(
        f,
        "{:<w0$}  {:<w1$}  {:>w2$}",
        line[0],
        line[1],
        line[2],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
    )
}
