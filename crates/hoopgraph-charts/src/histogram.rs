// Equal-width histogram binning.

/// Bin edges over `[min, max]`. Bin `i` covers `[edges[i], edges[i+1])`,
/// except the final bin, which also includes its upper edge.
#[derive(Debug, Clone, PartialEq)]
pub struct BinLayout {
    pub min: f64,
    pub max: f64,
    pub width: f64,
    pub edges: Vec<f64>,
}

impl BinLayout {
    /// Lay out `bin_count` bins over the range of `values`. Non-finite values
    /// are ignored; `None` when nothing finite remains or `bin_count` is 0.
    pub fn from_values(values: &[f64], bin_count: usize) -> Option<Self> {
        if bin_count == 0 {
            return None;
        }
        let (min, max) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let width = (max - min) / bin_count as f64;
        let mut edges: Vec<f64> = (0..=bin_count).map(|i| min + i as f64 * width).collect();
        // Accumulated rounding must not push the top edge below the maximum.
        edges[bin_count] = max;

        Some(Self {
            min,
            max,
            width,
            edges,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Index of the bin holding `value`, or `None` outside `[min, max]`.
    ///
    /// When every value is equal (zero width) they all land in the final bin.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !(self.min..=self.max).contains(&value) {
            return None;
        }
        let last = self.bin_count() - 1;
        let interior = &self.edges[1..=last];
        Some(interior.partition_point(|edge| *edge <= value).min(last))
    }

    /// Count per bin. The counts sum to the number of in-range values.
    pub fn counts(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.bin_count()];
        for idx in values.iter().filter_map(|v| self.bin_index(*v)) {
            counts[idx] += 1;
        }
        counts
    }
}
