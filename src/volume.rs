use ndarray::Array3;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("duplicate dimension label '{0}'")]
    DuplicateLabel(String),

    #[error("dimension '{label}' has {coords} coordinates but the data extent is {extent}")]
    CoordinateLengthMismatch {
        label: String,
        coords: usize,
        extent: usize,
    },

    #[error("dimension '{0}' has zero extent")]
    EmptyAxis(String),

    #[error("coordinates for dimension '{0}' are not strictly monotonic")]
    NonMonotonic(String),
}

/// A 3D data array paired with named, ordered per-axis coordinate arrays.
///
/// The order of the labels defines the axis order of `data`, and each
/// coordinate array is strictly monotonic (increasing or decreasing) along
/// its axis. A `LabeledVolume` is immutable once constructed; ROI
/// computations read it and produce fresh output arrays.
#[derive(Clone, Debug)]
pub struct LabeledVolume {
    data: Array3<f64>,
    labels: [String; 3],
    coords: [Vec<f64>; 3],
}

impl LabeledVolume {
    /// Build a volume from a 3D array and its three labeled coordinate axes,
    /// given in axis order.
    ///
    /// # Errors
    ///
    /// Returns an error if the labels are not distinct, a coordinate array's
    /// length does not match the data extent along its axis, an axis is
    /// empty, or a coordinate array is not strictly monotonic.
    pub fn new(data: Array3<f64>, axes: [(&str, Vec<f64>); 3]) -> Result<Self, VolumeError> {
        let shape = data.dim();
        let extents = [shape.0, shape.1, shape.2];

        for (i, (label, coords)) in axes.iter().enumerate() {
            if axes[..i].iter().any(|(other, _)| other == label) {
                return Err(VolumeError::DuplicateLabel(label.to_string()));
            }
            if extents[i] == 0 {
                return Err(VolumeError::EmptyAxis(label.to_string()));
            }
            if coords.len() != extents[i] {
                return Err(VolumeError::CoordinateLengthMismatch {
                    label: label.to_string(),
                    coords: coords.len(),
                    extent: extents[i],
                });
            }
            if !Self::is_monotonic(coords) {
                return Err(VolumeError::NonMonotonic(label.to_string()));
            }
        }

        let [a0, a1, a2] = axes;
        Ok(Self {
            data,
            labels: [a0.0.to_string(), a1.0.to_string(), a2.0.to_string()],
            coords: [a0.1, a1.1, a2.1],
        })
    }

    fn is_monotonic(coords: &[f64]) -> bool {
        coords.windows(2).all(|w| w[1] > w[0]) || coords.windows(2).all(|w| w[1] < w[0])
    }

    /// Get a reference to the underlying data
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Get the dimensions of the volume in axis order
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Dimension labels in axis order.
    pub fn labels(&self) -> [&str; 3] {
        self.labels.each_ref().map(|label| label.as_str())
    }

    /// Axis position of a dimension label, if present.
    pub fn axis_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Coordinate array for a dimension label, if present.
    pub fn coords(&self, label: &str) -> Option<&[f64]> {
        self.axis_index(label).map(|i| self.coords[i].as_slice())
    }

    pub(crate) fn axis_coords(&self, axis: usize) -> &[f64] {
        &self.coords[axis]
    }

    pub(crate) fn extent(&self, axis: usize) -> usize {
        self.coords[axis].len()
    }
}
