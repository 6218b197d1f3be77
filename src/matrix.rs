use std::fmt::Display;

use serde::Serialize;

use crate::{
    error::DashboardError,
    results::{CONTROL_DIM, GainMatrix, STATE_DIM},
};

/// Gain matrix laid out for display: one row per control channel, one
/// column per state channel, every cell already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentedMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<String>>,
}

pub fn present(gain: Option<&GainMatrix>) -> Result<PresentedMatrix, DashboardError> {
    let gain = gain.ok_or(DashboardError::MatrixUnavailable)?;

    let row_labels = (1..=CONTROL_DIM).map(|r| format!("u{r}")).collect();
    let col_labels = (1..=STATE_DIM).map(|c| format!("x{c}")).collect();

    let cells = (0..CONTROL_DIM)
        .map(|r| {
            (0..STATE_DIM)
                .map(|c| format!("{:.4}", gain.get(r, c)))
                .collect()
        })
        .collect();

    Ok(PresentedMatrix {
        row_labels,
        col_labels,
        cells,
    })
}

impl PresentedMatrix {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }
}

impl Display for PresentedMatrix {
    /// Markdown table with the column labels as header
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "| |")?;
        for label in &self.col_labels {
            write!(f, " {label} |")?;
        }
        writeln!(f)?;

        write!(f, "|---|")?;
        for _ in &self.col_labels {
            write!(f, "---|")?;
        }
        writeln!(f)?;

        for (label, row) in self.row_labels.iter().zip(&self.cells) {
            write!(f, "| **{label}** |")?;
            for cell in row {
                write!(f, " {cell} |")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::SMatrix;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_present_labels_and_precision() {
        let gain = GainMatrix(SMatrix::from_fn(|r, c| {
            (r as f64 + 1.0) * 0.5 + c as f64 / 3.0
        }));

        let presented = present(Some(&gain)).unwrap();

        assert_eq!(presented.row_labels, vec!["u1", "u2", "u3", "u4"]);
        assert_eq!(presented.col_labels.len(), 12);
        assert_eq!(presented.col_labels[0], "x1");
        assert_eq!(presented.col_labels[11], "x12");

        assert_eq!(presented.cells.len(), 4);
        for row in &presented.cells {
            assert_eq!(row.len(), 12);
            for cell in row {
                let decimals = cell.split('.').nth(1).unwrap();
                assert_eq!(decimals.len(), 4, "{cell}");
            }
        }

        assert_eq!(presented.cell(0, 0), Some("0.5000"));
        assert_eq!(presented.cell(0, 1), Some("0.8333"));
        assert_eq!(presented.cell(3, 0), Some("2.0000"));
        assert_eq!(presented.cell(4, 0), None);
    }

    #[test]
    fn test_negative_and_large_values() {
        let mut m = SMatrix::<f64, 4, 12>::zeros();
        m[(1, 2)] = -31.62277;
        m[(2, 5)] = 1234.5;

        let presented = present(Some(&GainMatrix(m))).unwrap();

        assert_eq!(presented.cell(1, 2), Some("-31.6228"));
        assert_eq!(presented.cell(2, 5), Some("1234.5000"));
        assert_eq!(presented.cell(0, 0), Some("0.0000"));
    }

    #[test]
    fn test_absent_gain() {
        assert!(matches!(
            present(None),
            Err(DashboardError::MatrixUnavailable)
        ));
    }

    #[test]
    fn test_markdown() {
        let presented = present(Some(&GainMatrix(SMatrix::zeros()))).unwrap();
        let md = presented.to_string();
        let lines: Vec<&str> = md.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("| | x1 | x2 |"));
        assert!(lines[2].starts_with("| **u1** | 0.0000 |"));
    }
}
