/*
 *  sweep.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  Measurement samples and immutable sweep rows
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::Arc;

/// One measurement at a point in the spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub frequency: f64,
    pub power: f64,
}

impl Sample {
    pub const fn new(frequency: f64, power: f64) -> Self {
        Self { frequency, power }
    }
}

impl From<(f64, f64)> for Sample {
    fn from((frequency, power): (f64, f64)) -> Self {
        Sample { frequency, power }
    }
}

/// One sweep: samples in ascending frequency order.
///
/// Rows are immutable and cheap to clone; clones share storage, so a
/// snapshot of the history never copies sample data.
#[derive(Debug, Clone)]
pub struct Row {
    samples: Arc<[Sample]>,
}

impl Row {
    /// Build a row, sorting by frequency if the input is not already ordered.
    pub fn new(mut samples: Vec<Sample>) -> Self {
        let sorted = samples.windows(2).all(|w| w[0].frequency <= w[1].frequency);
        if !sorted {
            samples.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        }
        Self { samples: samples.into() }
    }

    pub fn empty() -> Self {
        Self { samples: Arc::from(Vec::<Sample>::new()) }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// True when both handles point at the same pushed row.
    pub fn same_as(&self, other: &Row) -> bool {
        Arc::ptr_eq(&self.samples, &other.samples)
    }

    /// (lowest, highest) frequency, None for an empty row
    pub fn frequency_range(&self) -> Option<(f64, f64)> {
        Some((self.samples.first()?.frequency, self.samples.last()?.frequency))
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.samples == other.samples
    }
}

impl FromIterator<Sample> for Row {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Row::new(iter.into_iter().collect())
    }
}

impl From<Vec<Sample>> for Row {
    fn from(samples: Vec<Sample>) -> Self {
        Row::new(samples)
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_sorts_by_frequency() {
        let row = Row::new(vec![
            Sample::new(30.0, 1.0),
            Sample::new(10.0, 2.0),
            Sample::new(20.0, 3.0),
        ]);
        let freqs: Vec<f64> = row.iter().map(|s| s.frequency).collect();
        assert_eq!(freqs, vec![10.0, 20.0, 30.0]);
        assert_eq!(row.samples()[0].power, 2.0);
        assert_eq!(row.frequency_range(), Some((10.0, 30.0)));
    }

    #[test]
    fn test_clone_shares_storage() {
        let row: Row = [(1.0, -90.0), (2.0, -80.0)].into_iter().map(Sample::from).collect();
        let copy = row.clone();
        assert!(row.same_as(&copy));
        assert_eq!(row, copy);
    }

    #[test]
    fn test_equal_content_distinct_rows() {
        let a = Row::new(vec![Sample::new(1.0, 1.0)]);
        let b = Row::new(vec![Sample::new(1.0, 1.0)]);
        assert!(!a.same_as(&b));
        assert_eq!(a, b);
        assert_ne!(a, Row::new(vec![Sample::new(1.0, 2.0)]));
    }

    #[test]
    fn test_empty_row() {
        let row = Row::empty();
        assert!(row.is_empty());
        assert_eq!(row.len(), 0);
        assert_eq!(row.frequency_range(), None);
    }
}
