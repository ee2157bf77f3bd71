use ndarray::{Array1, Array2, ArrayD};

/// A coordinate column accompanying reduced ROI data.
#[derive(Clone, Debug, PartialEq)]
pub enum CoordValue {
    /// Coordinates of a single original axis.
    Axis(Array1<f64>),
    /// Per-sample coordinate tuples covering several original axes jointly,
    /// one column per axis in the key's label order.
    Joined(Array2<f64>),
}

/// Reduced ROI data together with its companion coordinate dictionary.
///
/// Coordinate keys name the original axes each column represents. Axes
/// folded into a single column are joined with `", "` (see [`join_labels`]
/// and [`split_key`]); downstream plotting and CSV export rely on this key
/// text to split joined columns back into per-axis labels, so the convention
/// is part of the output contract.
#[derive(Clone, Debug, PartialEq)]
pub struct RoiOutput {
    /// Reduced data of rank 0, 1, or 2. The shape matches the lengths of the
    /// non-reduced coordinate columns, in `coords` order.
    pub data: ArrayD<f64>,
    /// Coordinate columns keyed by (possibly joined) axis labels.
    pub coords: Vec<(String, CoordValue)>,
}

impl RoiOutput {
    /// Look up a coordinate column by its exact key text.
    pub fn coord(&self, key: &str) -> Option<&CoordValue> {
        self.coords
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }
}

/// Join axis labels into a composite coordinate key.
pub fn join_labels(labels: &[&str]) -> String {
    labels.join(", ")
}

/// Split a composite coordinate key back into its axis labels.
pub fn split_key(key: &str) -> Vec<&str> {
    key.split(", ").collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let key = join_labels(&["H", "K", "L"]);
        assert_eq!(key, "H, K, L");
        assert_eq!(split_key(&key), vec!["H", "K", "L"]);
    }

    #[test]
    fn test_single_label_key() {
        assert_eq!(join_labels(&["K"]), "K");
        assert_eq!(split_key("K"), vec!["K"]);
    }
}
