use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Variant-by-sample table of optional numbers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTable {
    variants: BTreeSet<String>,
    samples: BTreeSet<String>,
    cells: BTreeMap<(String, String), f64>,
}

impl PivotTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(variant, sample, value)` rows.
    ///
    /// Every variant and sample seen becomes a row/column even when its value
    /// is missing. A repeated cell keeps the last value.
    pub fn from_rows<I, V, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (V, S, Option<f64>)>,
        V: Into<String>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (variant, sample, value) in rows {
            table.insert(variant, sample, value);
        }
        table
    }

    pub fn insert(&mut self, variant: impl Into<String>, sample: impl Into<String>, value: Option<f64>) {
        let variant = variant.into();
        let sample = sample.into();
        self.variants.insert(variant.clone());
        self.samples.insert(sample.clone());
        if let Some(value) = value {
            self.cells.insert((variant, sample), value);
        }
    }

    #[must_use]
    pub fn get(&self, variant: &str, sample: &str) -> Option<f64> {
        self.cells
            .get(&(variant.to_string(), sample.to_string()))
            .copied()
    }

    #[must_use]
    pub fn samples(&self) -> Vec<&str> {
        self.samples.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn variants(&self) -> Vec<&str> {
        self.variants.iter().map(String::as_str).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Write as TSV: a `Variant` column followed by one column per sample.
    /// Missing cells are left empty.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the writer.
    pub fn write_tsv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        write!(out, "Variant")?;
        for sample in &self.samples {
            write!(out, "\t{sample}")?;
        }
        writeln!(out)?;

        for variant in &self.variants {
            write!(out, "{variant}")?;
            for sample in &self.samples {
                match self.cells.get(&(variant.clone(), sample.clone())) {
                    Some(value) => write!(out, "\t{value}")?,
                    None => write!(out, "\t")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    }
}
