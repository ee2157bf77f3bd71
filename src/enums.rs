/// Aggregate operator for box ROI reductions.
///
/// Both operators propagate NaN: a NaN element anywhere in a collapsed lane
/// makes that lane's aggregate NaN, as does an empty lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    Average,
    Max,
}

/// Reduction applied to a line ROI's sampled sequence.
///
/// `Average` and `Max` propagate NaN the same way as [`ReduceOp`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineReduceOp {
    #[default]
    Values,
    Average,
    Max,
}

/// Structuring shape for line ROI smoothing neighborhoods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmoothingShape {
    #[default]
    Cube,
    Sphere,
}
