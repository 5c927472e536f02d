//! Comma-delimited dataset loading.
//!
//! Format: one example per line, `f1,f2,...,fn,label`. The first
//! `feature_count` fields are parsed as `f64`; the next field is a class
//! name. Class names are indexed in order of first appearance and each
//! label becomes a one-hot row. Blank lines are skipped.

use std::path::Path;
use tracing::{debug, warn};

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    inputs: Vec<Matrix>,
    targets: Vec<Matrix>,
    classes: Vec<usize>,
    class_names: Vec<String>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>, feature_count: usize) -> Result<Dataset> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let dataset = Dataset::parse(&text, feature_count)?;
        debug!(
            path = %path.display(),
            examples = dataset.len(),
            classes = dataset.class_count(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    pub fn parse(text: &str, feature_count: usize) -> Result<Dataset> {
        let mut features: Vec<Vec<f64>> = Vec::new();
        let mut classes: Vec<usize> = Vec::new();
        let mut class_names: Vec<String> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            if cells.len() < feature_count + 1 {
                return Err(NnError::Parse {
                    line: line_no,
                    message: format!(
                        "expected {} features and a label, got {} fields",
                        feature_count,
                        cells.len()
                    ),
                });
            }

            let row = cells[..feature_count]
                .iter()
                .map(|cell| {
                    cell.parse::<f64>().map_err(|_| NnError::Parse {
                        line: line_no,
                        message: format!("'{cell}' is not a number"),
                    })
                })
                .collect::<Result<Vec<f64>>>()?;

            let label = cells[feature_count];
            let class = match class_names.iter().position(|name| name == label) {
                Some(class) => class,
                None => {
                    class_names.push(label.to_string());
                    class_names.len() - 1
                }
            };

            features.push(row);
            classes.push(class);
        }

        let class_count = class_names.len();
        let inputs = features.into_iter().map(Matrix::row_vector).collect();
        let targets = classes.iter().map(|&c| one_hot(c, class_count)).collect();

        Ok(Dataset {
            inputs,
            targets,
            classes,
            class_names,
        })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn inputs(&self) -> &[Matrix] {
        &self.inputs
    }

    pub fn targets(&self) -> &[Matrix] {
        &self.targets
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn class_count(&self) -> usize {
        self.class_names.len()
    }

    /// Class index of example `i`.
    pub fn class_of(&self, i: usize) -> Option<usize> {
        self.classes.get(i).copied()
    }

    /// Sends the first `train_per_class` examples of every class to the
    /// training set and the rest to the test set, keeping file order.
    pub fn split_per_class(&self, train_per_class: usize) -> (Dataset, Dataset) {
        let mut seen = vec![0usize; self.class_count()];
        let mut train = self.empty_like();
        let mut test = self.empty_like();

        for (i, &class) in self.classes.iter().enumerate() {
            let part = if seen[class] < train_per_class {
                &mut train
            } else {
                &mut test
            };
            seen[class] += 1;
            part.push(self.inputs[i].clone(), self.targets[i].clone(), class);
        }

        for (name, count) in self.class_names.iter().zip(&seen) {
            if *count <= train_per_class {
                warn!(
                    class = %name,
                    examples = *count,
                    train_per_class,
                    "class has no test examples"
                );
            }
        }

        (train, test)
    }

    fn empty_like(&self) -> Dataset {
        Dataset {
            class_names: self.class_names.clone(),
            ..Dataset::default()
        }
    }

    fn push(&mut self, input: Matrix, target: Matrix, class: usize) {
        self.inputs.push(input);
        self.targets.push(target);
        self.classes.push(class);
    }
}

fn one_hot(class: usize, class_count: usize) -> Matrix {
    let mut row = vec![0.0; class_count];
    row[class] = 1.0;
    Matrix::row_vector(row)
}
