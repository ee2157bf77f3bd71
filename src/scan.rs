use ndarray::{Array2, Array3, Array4, ArrayView3, ArrayView4, Axis, s};
use thiserror::Error;

use crate::volume::{LabeledVolume, VolumeError};

/// Smallest accepted extent per axis of a gridded volume.
pub const MIN_GRID_EXTENT: usize = 10;

/// Axis labels of gridded reciprocal-space volumes, in axis order.
pub const HKL_LABELS: [&str; 3] = ["H", "K", "L"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan contains no detector frames")]
    NoFrames,

    #[error("inconsistent detector frame dimensions")]
    InconsistentFrameDimensions,

    #[error("gridded data shape must be at least (10, 10, 10), got {0:?}")]
    InvalidGridShape((usize, usize, usize)),

    #[error("invalid grid bounds for '{axis}': low {low} must be less than high {high}")]
    InvalidGridBounds {
        axis: &'static str,
        low: f64,
        high: f64,
    },

    #[error("volume error: {0}")]
    Volume(#[from] VolumeError),

    #[error("source error: {0}")]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Acquisition-side collaborator supplying a scan's detector frames and its
/// reciprocal space map.
///
/// Implementations own all detector format specifics; in particular, any
/// detector file handler registration happens when the source is
/// constructed, never as ambient module-level state.
pub trait ScanSource {
    /// Number of points (frames) recorded in the scan.
    fn point_count(&self) -> usize;

    /// The 2D detector frame recorded at `point`.
    fn frame(&self, point: usize) -> Result<Array2<f64>, ScanError>;

    /// Reciprocal space map: per-pixel `(H, K, L)` triples with shape
    /// `(points, height, width, 3)`.
    fn rsm(&self) -> Result<Array4<f64>, ScanError>;
}

/// Reciprocal-space gridding collaborator: interpolates scattered HKL-tagged
/// intensity samples onto a regular 3D grid.
pub trait RsmGridder {
    /// Grid `intensity` samples located at the `rsm` coordinates onto a
    /// regular grid of `shape` covering `bounds` (per-axis `(min, max)` in
    /// H, K, L order). Returns an `H`/`K`/`L`-labeled volume of exactly
    /// `shape`.
    fn grid(
        &self,
        rsm: ArrayView4<'_, f64>,
        intensity: ArrayView3<'_, f64>,
        shape: (usize, usize, usize),
        bounds: [(f64, f64); 3],
    ) -> Result<LabeledVolume, ScanError>;
}

/// A single scan's image data, assembled lazily from its source.
///
/// The raw frame volume and the reciprocal space map are computed on first
/// access and cached; [`grid_data`](Self::grid_data) replaces any previously
/// gridded volume each time it is invoked.
pub struct Scan<S: ScanSource> {
    source: S,
    raw_data: Option<LabeledVolume>,
    rsm: Option<Array4<f64>>,
    gridded_data: Option<LabeledVolume>,
}

impl<S: ScanSource> Scan<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            raw_data: None,
            rsm: None,
            gridded_data: None,
        }
    }

    /// Number of points in the scan.
    pub fn point_count(&self) -> usize {
        self.source.point_count()
    }

    /// Raw detector-frame volume with `t`/`x`/`y` index coordinates,
    /// assembled from the source on first call and cached.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoFrames`] for an empty scan and
    /// [`ScanError::InconsistentFrameDimensions`] when frame shapes differ.
    pub fn raw_data(&mut self) -> Result<&LabeledVolume, ScanError> {
        if self.raw_data.is_none() {
            let volume = self.assemble_frames()?;
            self.raw_data = Some(volume);
        }
        Ok(self.raw_data.as_ref().expect("populated above"))
    }

    /// Reciprocal space map, fetched from the source on first call and
    /// cached.
    pub fn rsm(&mut self) -> Result<&Array4<f64>, ScanError> {
        if self.rsm.is_none() {
            self.rsm = Some(self.source.rsm()?);
        }
        Ok(self.rsm.as_ref().expect("populated above"))
    }

    /// Gridded reciprocal-space volume from the most recent
    /// [`grid_data`](Self::grid_data) call, if any.
    pub fn gridded_data(&self) -> Option<&LabeledVolume> {
        self.gridded_data.as_ref()
    }

    /// Grid the raw intensities onto a regular HKL grid, replacing any
    /// previously gridded volume.
    ///
    /// `bounds` holds per-axis `(min, max)` pairs in H, K, L order; a `None`
    /// entry defaults to that channel's extremes in the reciprocal space
    /// map.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidGridShape`] if any extent of `shape` is
    /// below [`MIN_GRID_EXTENT`] and [`ScanError::InvalidGridBounds`] if an
    /// explicit bound pair has `low >= high`.
    pub fn grid_data(
        &mut self,
        gridder: &dyn RsmGridder,
        shape: (usize, usize, usize),
        bounds: [Option<(f64, f64)>; 3],
    ) -> Result<(), ScanError> {
        if shape.0 < MIN_GRID_EXTENT || shape.1 < MIN_GRID_EXTENT || shape.2 < MIN_GRID_EXTENT {
            return Err(ScanError::InvalidGridShape(shape));
        }
        for (axis, bound) in HKL_LABELS.into_iter().zip(bounds) {
            if let Some((low, high)) = bound {
                if low >= high {
                    return Err(ScanError::InvalidGridBounds { axis, low, high });
                }
            }
        }

        // Populate both caches before borrowing them together.
        self.rsm()?;
        self.raw_data()?;
        let rsm = self.rsm.as_ref().expect("populated above");
        let raw = self.raw_data.as_ref().expect("populated above");

        let resolved =
            [0, 1, 2].map(|i| bounds[i].unwrap_or_else(|| Self::channel_extremes(rsm, i)));

        let gridded = gridder.grid(rsm.view(), raw.data().view(), shape, resolved)?;
        self.gridded_data = Some(gridded);
        Ok(())
    }

    fn assemble_frames(&self) -> Result<LabeledVolume, ScanError> {
        let points = self.source.point_count();
        if points == 0 {
            return Err(ScanError::NoFrames);
        }

        let frames = (0..points)
            .map(|point| self.source.frame(point))
            .collect::<Result<Vec<Array2<f64>>, ScanError>>()?;

        let first_dim = frames[0].dim();
        if frames.iter().any(|frame| frame.dim() != first_dim) {
            return Err(ScanError::InconsistentFrameDimensions);
        }

        let (height, width) = first_dim;
        let mut data = Array3::<f64>::zeros((points, height, width));
        for (i, frame) in frames.iter().enumerate() {
            data.slice_mut(s![i, .., ..]).assign(frame);
        }

        let index_coords = |n: usize| (0..n).map(|i| i as f64).collect::<Vec<f64>>();
        Ok(LabeledVolume::new(
            data,
            [
                ("t", index_coords(points)),
                ("x", index_coords(height)),
                ("y", index_coords(width)),
            ],
        )?)
    }

    fn channel_extremes(rsm: &Array4<f64>, channel: usize) -> (f64, f64) {
        let view = rsm.index_axis(Axis(3), channel);
        let mut low = f64::INFINITY;
        let mut high = f64::NEG_INFINITY;
        for &value in view.iter() {
            low = low.min(value);
            high = high.max(value);
        }
        (low, high)
    }
}
