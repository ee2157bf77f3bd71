use ndarray::{Array1, Array2, ArrayD, Axis, arr0, s};
use rayon::prelude::*;
use thiserror::Error;

use crate::enums::{LineReduceOp, ReduceOp, SmoothingShape};
use crate::mapper::PixelMapper;
use crate::output::{CoordValue, RoiOutput, join_labels};
use crate::rasterize;
use crate::volume::LabeledVolume;

/// Largest accepted line ROI smoothing radius.
pub const MAX_SMOOTHING_RADIUS: u32 = 10;

/// Maximum fold step where NaN poisons the running maximum.
///
/// `None` marks a sequence with no elements yet; folds that end on `None`
/// report NaN, so an empty selection reduces to NaN rather than a sentinel.
fn nan_max(acc: Option<f64>, value: f64) -> Option<f64> {
    Some(match acc {
        None => value,
        Some(max) if max.is_nan() || value.is_nan() => f64::NAN,
        Some(max) => max.max(value),
    })
}

#[derive(Debug, Error)]
pub enum RoiError {
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("invalid endpoints: {0}")]
    InvalidEndpoints(String),

    #[error("invalid reduction: {0}")]
    InvalidReduction(String),

    #[error("smoothing radius {0} exceeds the maximum of {MAX_SMOOTHING_RADIUS}")]
    SmoothingRadiusTooLarge(u32),

    #[error("average/max reduction requires at least one axis")]
    MissingReductionAxes,
}

/// An inclusive coordinate bound pair for one dimension.
///
/// A `None` side extends to the volume's extreme coordinate on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundPair {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl BoundPair {
    /// The unbounded pair, covering a dimension's full extent.
    pub const FULL: Self = Self {
        low: None,
        high: None,
    };

    pub fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }
}

/// An axis-aligned box region of interest over a [`LabeledVolume`].
///
/// Bounds are mapped to half-open pixel ranges that clamp to the volume's
/// edges; the clipped sub-volume is then collapsed over the selected axes by
/// the arithmetic mean or maximum. The ROI is a mutable controller:
/// `set_bounds`/`set_reduction` update its state and [`apply`](Self::apply)
/// recomputes the output from the current state each call.
#[derive(Clone, Debug)]
pub struct RectRoi {
    dims: [String; 3],
    bounds: [BoundPair; 3],
    reduction: Option<(ReduceOp, Vec<String>)>,
    output: Option<RoiOutput>,
}

impl Default for RectRoi {
    fn default() -> Self {
        Self::new()
    }
}

impl RectRoi {
    /// Box ROI over the default `x`, `y`, `z` dimension labels.
    pub fn new() -> Self {
        Self::with_dims(["x", "y", "z"])
    }

    /// Box ROI over explicit dimension labels.
    pub fn with_dims(dims: [&str; 3]) -> Self {
        Self {
            dims: dims.map(str::to_string),
            bounds: [BoundPair::FULL; 3],
            reduction: None,
            output: None,
        }
    }

    /// Set the coordinate bounds, keyed by dimension label.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::InvalidBounds`] if the key set does not exactly
    /// match the ROI's dimension labels or a pair has `low > high`.
    pub fn set_bounds(&mut self, bounds: &[(&str, BoundPair)]) -> Result<(), RoiError> {
        if bounds.len() != 3 {
            return Err(RoiError::InvalidBounds(format!(
                "expected 3 dimensions, got {}",
                bounds.len()
            )));
        }

        let mut next = [BoundPair::FULL; 3];
        let mut seen = [false; 3];
        for (label, pair) in bounds {
            let Some(i) = self.dims.iter().position(|dim| dim == label) else {
                return Err(RoiError::InvalidBounds(format!(
                    "unknown dimension '{label}'"
                )));
            };
            if seen[i] {
                return Err(RoiError::InvalidBounds(format!(
                    "duplicate dimension '{label}'"
                )));
            }
            if let (Some(low), Some(high)) = (pair.low, pair.high) {
                if low > high {
                    return Err(RoiError::InvalidBounds(format!(
                        "low {low} exceeds high {high} for dimension '{label}'"
                    )));
                }
            }
            seen[i] = true;
            next[i] = *pair;
        }

        self.bounds = next;
        Ok(())
    }

    /// Select the reduction operator and the axes to collapse.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::InvalidReduction`] if `axes` is not a
    /// duplicate-free subset of the ROI's dimension labels.
    pub fn set_reduction(&mut self, op: ReduceOp, axes: &[&str]) -> Result<(), RoiError> {
        for (i, axis) in axes.iter().enumerate() {
            if !self.dims.iter().any(|dim| dim == axis) {
                return Err(RoiError::InvalidReduction(format!("unknown axis '{axis}'")));
            }
            if axes[..i].contains(axis) {
                return Err(RoiError::InvalidReduction(format!(
                    "duplicate axis '{axis}'"
                )));
            }
        }

        self.reduction = Some((op, axes.iter().map(|axis| axis.to_string()).collect()));
        Ok(())
    }

    /// Clip the volume to the current bounds and reduce over the selected
    /// axes.
    ///
    /// The result is stored on the ROI (see [`output`](Self::output)) and
    /// returned. Reducing over all three axes yields a rank-0 output with
    /// empty coordinates; an empty clip propagates as NaN aggregates rather
    /// than an error. Does not mutate the input volume, and repeated calls
    /// with unchanged state recompute the identical output.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::InvalidReduction`] if no reduction has been set,
    /// [`RoiError::MissingReductionAxes`] if it selects zero axes, and
    /// [`RoiError::InvalidBounds`] if the ROI's dimension labels do not
    /// match the volume's.
    pub fn apply(&mut self, volume: &LabeledVolume) -> Result<&RoiOutput, RoiError> {
        let Some((op, axes)) = self.reduction.clone() else {
            return Err(RoiError::InvalidReduction(
                "no reduction set; call set_reduction first".to_string(),
            ));
        };
        if axes.is_empty() {
            return Err(RoiError::MissingReductionAxes);
        }

        // Map each bound pair onto a half-open pixel range, in volume axis
        // order. Label mismatches surface here.
        let labels = volume.labels();
        let mut ranges = [0..0, 0..0, 0..0];
        for (axis, label) in labels.iter().enumerate() {
            let Some(i) = self.dims.iter().position(|dim| dim == label) else {
                return Err(RoiError::InvalidBounds(format!(
                    "volume dimension '{label}' has no bounds on this ROI"
                )));
            };
            let pair = self.bounds[i];
            ranges[axis] = PixelMapper::bound_range(volume.axis_coords(axis), pair.low, pair.high);
        }

        let clipped = volume
            .data()
            .slice(s![ranges[0].clone(), ranges[1].clone(), ranges[2].clone()])
            .to_owned()
            .into_dyn();

        // Collapse the selected axes, highest index first so the remaining
        // indices stay valid.
        let mut reduce_axes: Vec<usize> =
            axes.iter().filter_map(|axis| volume.axis_index(axis)).collect();
        reduce_axes.sort_unstable_by(|a, b| b.cmp(a));

        let mut data = clipped;
        for &axis in &reduce_axes {
            data = match op {
                ReduceOp::Average => {
                    let n = data.len_of(Axis(axis)) as f64;
                    data.sum_axis(Axis(axis)).mapv_into(|v| v / n)
                }
                ReduceOp::Max => data
                    .fold_axis(Axis(axis), None, |&acc, &v| nan_max(acc, v))
                    .mapv(|max| max.unwrap_or(f64::NAN)),
            };
        }

        // Surviving axes keep their label and their identically-sliced
        // coordinates.
        let mut coords = Vec::new();
        for (axis, label) in labels.iter().enumerate() {
            if axes.iter().any(|a| a == label) {
                continue;
            }
            let sliced = volume.axis_coords(axis)[ranges[axis].clone()].to_vec();
            coords.push((label.to_string(), CoordValue::Axis(Array1::from(sliced))));
        }

        Ok(self.output.insert(RoiOutput { data, coords }))
    }

    /// The output from the most recent [`apply`](Self::apply) run.
    pub fn output(&self) -> Option<&RoiOutput> {
        self.output.as_ref()
    }
}

/// A 3D line segment region of interest over a [`LabeledVolume`].
///
/// The segment is rasterized into a discrete pixel path between its two
/// endpoints; samples falling outside the volume are discarded, in contrast
/// to [`RectRoi`]'s clamping bound ranges. Each retained pixel is sampled
/// directly or smoothed over a cube/sphere neighborhood, and the sampled
/// sequence is emitted raw or collapsed to a scalar. Same mutable-controller
/// life cycle as [`RectRoi`].
#[derive(Clone, Debug)]
pub struct LineRoi {
    dims: [String; 3],
    endpoint_a: [Option<f64>; 3],
    endpoint_b: [Option<f64>; 3],
    smoothing_radius: u32,
    smoothing_shape: SmoothingShape,
    reduction: (LineReduceOp, Option<String>),
    output: Option<RoiOutput>,
}

impl Default for LineRoi {
    fn default() -> Self {
        Self::new()
    }
}

impl LineRoi {
    /// Line ROI over the default `x`, `y`, `z` dimension labels.
    pub fn new() -> Self {
        Self::with_dims(["x", "y", "z"])
    }

    /// Line ROI over explicit dimension labels.
    pub fn with_dims(dims: [&str; 3]) -> Self {
        Self {
            dims: dims.map(str::to_string),
            endpoint_a: [None; 3],
            endpoint_b: [None; 3],
            smoothing_radius: 0,
            smoothing_shape: SmoothingShape::Cube,
            reduction: (LineReduceOp::Values, None),
            output: None,
        }
    }

    /// Set both endpoints, keyed by dimension label. A `None` coordinate
    /// defaults to pixel 0 on that axis at apply time.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::InvalidEndpoints`] if either key set does not
    /// exactly match the ROI's dimension labels.
    pub fn set_endpoints(
        &mut self,
        a: &[(&str, Option<f64>)],
        b: &[(&str, Option<f64>)],
    ) -> Result<(), RoiError> {
        let a = self.endpoint_from_entries(a)?;
        let b = self.endpoint_from_entries(b)?;
        self.endpoint_a = a;
        self.endpoint_b = b;
        Ok(())
    }

    fn endpoint_from_entries(
        &self,
        entries: &[(&str, Option<f64>)],
    ) -> Result<[Option<f64>; 3], RoiError> {
        if entries.len() != 3 {
            return Err(RoiError::InvalidEndpoints(format!(
                "expected 3 dimensions, got {}",
                entries.len()
            )));
        }
        let mut point = [None; 3];
        let mut seen = [false; 3];
        for (label, value) in entries {
            let Some(i) = self.dims.iter().position(|dim| dim == label) else {
                return Err(RoiError::InvalidEndpoints(format!(
                    "unknown dimension '{label}'"
                )));
            };
            if seen[i] {
                return Err(RoiError::InvalidEndpoints(format!(
                    "duplicate dimension '{label}'"
                )));
            }
            seen[i] = true;
            point[i] = *value;
        }
        Ok(point)
    }

    /// Configure neighborhood smoothing. Radius 0 disables smoothing.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::SmoothingRadiusTooLarge`] for radii above
    /// [`MAX_SMOOTHING_RADIUS`].
    pub fn set_smoothing(&mut self, radius: u32, shape: SmoothingShape) -> Result<(), RoiError> {
        if radius > MAX_SMOOTHING_RADIUS {
            return Err(RoiError::SmoothingRadiusTooLarge(radius));
        }
        self.smoothing_radius = radius;
        self.smoothing_shape = shape;
        Ok(())
    }

    /// Select the reduction operator and, optionally, the independent axis.
    ///
    /// For [`LineReduceOp::Values`] the axis controls which axes fold into
    /// the joined coordinate column; for `Average`/`Max` the full sampled
    /// sequence collapses to a scalar and the axis shapes the emitted
    /// coordinates only.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::InvalidReduction`] if `axis` is not one of the
    /// ROI's dimension labels.
    pub fn set_reduction(&mut self, op: LineReduceOp, axis: Option<&str>) -> Result<(), RoiError> {
        if let Some(axis) = axis {
            if !self.dims.iter().any(|dim| dim == axis) {
                return Err(RoiError::InvalidReduction(format!("unknown axis '{axis}'")));
            }
        }
        self.reduction = (op, axis.map(str::to_string));
        Ok(())
    }

    /// Rasterize the segment, sample the volume along it, and reduce.
    ///
    /// The number of sampled points equals the number of in-bounds
    /// rasterized pixels, which varies with endpoint placement; callers must
    /// not assume a fixed sample count. Zero in-bounds samples propagate as
    /// an empty sequence or a NaN scalar rather than an error.
    ///
    /// # Errors
    ///
    /// Returns [`RoiError::InvalidEndpoints`] if the ROI's dimension labels
    /// do not match the volume's.
    pub fn apply(&mut self, volume: &LabeledVolume) -> Result<&RoiOutput, RoiError> {
        let labels = volume.labels();

        // Reorder the stored endpoints into volume axis order; label
        // mismatches surface here.
        let mut a = [None; 3];
        let mut b = [None; 3];
        for (axis, label) in labels.iter().enumerate() {
            let Some(i) = self.dims.iter().position(|dim| dim == label) else {
                return Err(RoiError::InvalidEndpoints(format!(
                    "volume dimension '{label}' has no endpoint on this ROI"
                )));
            };
            a[axis] = self.endpoint_a[i];
            b[axis] = self.endpoint_b[i];
        }

        let (op, reduce_axis) = (self.reduction.0, self.reduction.1.clone());
        let axis_index = match &reduce_axis {
            Some(axis) => Some(volume.axis_index(axis).ok_or_else(|| {
                RoiError::InvalidReduction(format!("axis '{axis}' not present in volume"))
            })?),
            None => None,
        };

        let pixel_a = [0, 1, 2].map(|axis| PixelMapper::coord_to_pixel(volume.axis_coords(axis), a[axis]));
        let pixel_b = [0, 1, 2].map(|axis| PixelMapper::coord_to_pixel(volume.axis_coords(axis), b[axis]));

        let path = rasterize::line_nd(pixel_a, pixel_b);
        let pixels = rasterize::discard_out_of_bounds(&path, volume.dim());

        let samples = if self.smoothing_radius == 0 {
            let values: Vec<f64> = pixels
                .iter()
                .map(|&[i, j, k]| volume.data()[[i, j, k]])
                .collect();
            Array1::from(values)
        } else {
            self.smoothed_samples(volume, &pixels)
        };

        let data: ArrayD<f64> = match op {
            LineReduceOp::Values => samples.into_dyn(),
            LineReduceOp::Average => {
                let n = samples.len() as f64;
                arr0(samples.sum() / n).into_dyn()
            }
            LineReduceOp::Max => {
                let max = samples.fold(None, |acc, &v| nan_max(acc, v));
                arr0(max.unwrap_or(f64::NAN)).into_dyn()
            }
        };

        let coords = Self::output_coords(volume, &pixels, op, axis_index);
        Ok(self.output.insert(RoiOutput { data, coords }))
    }

    /// The output from the most recent [`apply`](Self::apply) run.
    pub fn output(&self) -> Option<&RoiOutput> {
        self.output.as_ref()
    }

    fn smoothed_samples(&self, volume: &LabeledVolume, pixels: &[[usize; 3]]) -> Array1<f64> {
        let offsets = rasterize::neighborhood_offsets(self.smoothing_radius, self.smoothing_shape);
        let dim = volume.dim();
        let data = volume.data();

        let values: Vec<f64> = pixels
            .par_iter()
            .map(|px| {
                let translated: Vec<[i64; 3]> = offsets
                    .iter()
                    .map(|off| {
                        [
                            px[0] as i64 + off[0],
                            px[1] as i64 + off[1],
                            px[2] as i64 + off[2],
                        ]
                    })
                    .collect();
                let neighborhood = rasterize::discard_out_of_bounds(&translated, dim);
                if neighborhood.is_empty() {
                    return f64::NAN;
                }
                let sum: f64 = neighborhood.iter().map(|&[i, j, k]| data[[i, j, k]]).sum();
                sum / neighborhood.len() as f64
            })
            .collect();

        Array1::from(values)
    }

    fn output_coords(
        volume: &LabeledVolume,
        pixels: &[[usize; 3]],
        op: LineReduceOp,
        axis_index: Option<usize>,
    ) -> Vec<(String, CoordValue)> {
        let labels = volume.labels();

        // Per-axis coordinate values along the retained pixel path.
        let path_coords: [Vec<f64>; 3] = [0, 1, 2].map(|axis| {
            let coords = volume.axis_coords(axis);
            pixels.iter().map(|px| coords[px[axis]]).collect()
        });

        match (op, axis_index) {
            (LineReduceOp::Values, None) => {
                let key = join_labels(&labels);
                let joined =
                    Self::join_columns(&[&path_coords[0], &path_coords[1], &path_coords[2]]);
                vec![(key, CoordValue::Joined(joined))]
            }
            (LineReduceOp::Values, Some(x_axis)) => {
                let folded: Vec<usize> = (0..3).filter(|&axis| axis != x_axis).collect();
                let y_key = join_labels(&[labels[folded[0]], labels[folded[1]]]);
                let y_columns =
                    Self::join_columns(&[&path_coords[folded[0]], &path_coords[folded[1]]]);
                vec![
                    (
                        labels[x_axis].to_string(),
                        CoordValue::Axis(Array1::from(path_coords[x_axis].clone())),
                    ),
                    (y_key, CoordValue::Joined(y_columns)),
                ]
            }
            (_, Some(x_axis)) => vec![(
                labels[x_axis].to_string(),
                CoordValue::Axis(Array1::from(path_coords[x_axis].clone())),
            )],
            (_, None) => Vec::new(),
        }
    }

    fn join_columns(columns: &[&Vec<f64>]) -> Array2<f64> {
        let rows = columns.first().map_or(0, |column| column.len());
        let mut joined = Array2::zeros((rows, columns.len()));
        for (j, column) in columns.iter().enumerate() {
            for (i, &value) in column.iter().enumerate() {
                joined[[i, j]] = value;
            }
        }
        joined
    }
}
