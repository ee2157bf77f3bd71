use crate::enums::SmoothingShape;

/// Rasterize a discrete 3D line between two pixel index triples.
///
/// Bresenham-style generalization to 3D: the path length is driven by the
/// largest coordinate delta, both endpoints are included, and the remaining
/// axes are sampled by rounded linear interpolation, yielding a connected
/// discrete path with no gaps.
pub(crate) fn line_nd(start: [i64; 3], stop: [i64; 3]) -> Vec<[i64; 3]> {
    let delta = [
        stop[0] - start[0],
        stop[1] - start[1],
        stop[2] - start[2],
    ];
    let steps = delta[0].abs().max(delta[1].abs()).max(delta[2].abs());
    if steps == 0 {
        return vec![start];
    }

    (0..=steps)
        .map(|t| {
            let frac = t as f64 / steps as f64;
            [0, 1, 2].map(|axis| (start[axis] as f64 + frac * delta[axis] as f64).round() as i64)
        })
        .collect()
}

/// Keep only the pixels lying within `[0, extent)` on every axis.
///
/// This is the discard-out-of-bounds policy used by line ROIs; box ROIs
/// instead clamp their bound ranges to the volume edges.
pub(crate) fn discard_out_of_bounds(
    pixels: &[[i64; 3]],
    dim: (usize, usize, usize),
) -> Vec<[usize; 3]> {
    let extents = [dim.0 as i64, dim.1 as i64, dim.2 as i64];
    pixels
        .iter()
        .filter(|px| (0..3).all(|axis| px[axis] >= 0 && px[axis] < extents[axis]))
        .map(|px| [px[0] as usize, px[1] as usize, px[2] as usize])
        .collect()
}

/// All integer offsets within the structuring neighborhood of `radius`.
///
/// `Cube` yields the full `[-r, r]^3` block; `Sphere` keeps only offsets
/// with Euclidean norm at most `radius`.
pub(crate) fn neighborhood_offsets(radius: u32, shape: SmoothingShape) -> Vec<[i64; 3]> {
    let r = radius as i64;
    let r_sq = r * r;
    let mut offsets = Vec::new();
    for i in -r..=r {
        for j in -r..=r {
            for k in -r..=r {
                if shape == SmoothingShape::Sphere && i * i + j * j + k * k > r_sq {
                    continue;
                }
                offsets.push([i, j, k]);
            }
        }
    }
    offsets
}
