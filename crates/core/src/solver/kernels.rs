//! Per-stage kernels of the dispersion step
//!
//! One step advances the concentration field `C` through five stages:
//!
//! ```text
//! 1. inject   C += (B·mask·r_bg) + (K·V·S·mask·r_tr)
//! 2. diffuse  C += D · (C_up + C_down + C_left + C_right − 4C)      (periodic)
//! 3. advect   C  = C·(1 − f) + shift(C, wind)·f                    (zero fill)
//! 4. decay    C *= 1 − λ
//! 5. clamp    C  = 0 on the outermost rows and columns
//! ```
//!
//! where `mask = clamp(E / E_norm, 0, 1)` is the permeability derived from the
//! emission base `E`, `B` the background level, `K` the congestion multiplier,
//! `V` the traffic volume, `S` the traffic emission scalar and `r_bg`/`r_tr` the
//! background/traffic shares.
//!
//! Stencil stages read every neighbour from the pre-stage buffer and write into
//! a separate output buffer, so rows can be processed in parallel without any
//! cell seeing a partially-updated neighbour.
//!
//! # Stability
//!
//! The explicit diffusion update keeps `C ≥ 0` for `D ≤ 0.25`: each output is
//! `(1 − 4D)·C + D·Σneighbours`, a non-negative combination. Advection is a
//! convex blend and decay a non-negative scale, so non-negative inputs give
//! non-negative output.

use rayon::prelude::*;

/// Emission-side constants of one step
#[derive(Debug, Clone, Copy)]
pub struct EmissionParams {
    /// Background pollutant level for the current hour
    pub background_level: f32,
    /// Share of emission from the background
    pub ratio_background: f32,
    /// Share of peak traffic on the road this hour
    pub traffic_volume: f32,
    /// Scales congestion × volume into an emission rate
    pub traffic_emission_scalar: f32,
    /// Share of emission from traffic
    pub ratio_traffic: f32,
}

/// Normalize the emission base into a `[0, 1]` permeability mask
///
/// Cells on roads at least as heavy as `normalizer` emit at full strength;
/// lighter roads emit proportionally less and non-road cells not at all.
#[must_use]
pub fn permeability_mask(emission_base: &[f32], normalizer: f32) -> Vec<f32> {
    emission_base
        .par_iter()
        .map(|&e| (e / normalizer).clamp(0.0, 1.0))
        .collect()
}

/// Stage 1: add background and traffic emission to every cell
pub fn inject_emissions(
    concentration: &mut [f32],
    mask: &[f32],
    congestion: &[f32],
    params: EmissionParams,
) {
    let background = params.background_level * params.ratio_background;
    let traffic =
        params.traffic_volume * params.traffic_emission_scalar * params.ratio_traffic;

    concentration
        .par_iter_mut()
        .zip(mask.par_iter())
        .zip(congestion.par_iter())
        .for_each(|((c, &m), &k)| {
            *c += background * m + k * traffic * m;
        });
}

/// Stage 2: explicit 5-point Laplacian with wrap-around neighbours
///
/// # Arguments
///
/// * `input` - Concentration before the stage
/// * `output` - Receives the diffused concentration
/// * `width` - Grid width in cells
/// * `height` - Grid height in cells
/// * `rate` - Diffusion coefficient per step (stable for `rate ≤ 0.25`)
pub fn diffuse(input: &[f32], output: &mut [f32], width: usize, height: usize, rate: f32) {
    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let up = if y == 0 { height - 1 } else { y - 1 };
            let down = if y + 1 == height { 0 } else { y + 1 };
            for (x, cell) in row.iter_mut().enumerate() {
                let left = if x == 0 { width - 1 } else { x - 1 };
                let right = if x + 1 == width { 0 } else { x + 1 };

                let c = input[y * width + x];
                let neighbours = input[up * width + x]
                    + input[down * width + x]
                    + input[y * width + left]
                    + input[y * width + right];
                *cell = c + rate * (neighbours - 4.0 * c);
            }
        });
}

/// Stage 3: blend towards a one-cell translation of the field
///
/// `shift(C)[row][col] = C[row − dir_y][col − dir_x]`, with cells whose source
/// lies outside the grid reading 0. Nothing wraps.
///
/// # Arguments
///
/// * `input` - Concentration before the stage
/// * `output` - Receives the advected concentration
/// * `width` - Grid width in cells
/// * `height` - Grid height in cells
/// * `dir` - `(dir_x, dir_y)`, each in `{-1, 0, 1}`
/// * `factor` - Blend weight of the shifted field, in `[0, 1]`
pub fn advect(
    input: &[f32],
    output: &mut [f32],
    width: usize,
    height: usize,
    dir: (i8, i8),
    factor: f32,
) {
    let (dx, dy) = (isize::from(dir.0), isize::from(dir.1));
    let keep = 1.0 - factor;

    output
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let src_y = y as isize - dy;
            let src_row_valid = (0..height as isize).contains(&src_y);
            for (x, cell) in row.iter_mut().enumerate() {
                let c = input[y * width + x];
                let src_x = x as isize - dx;
                let shifted = if src_row_valid && (0..width as isize).contains(&src_x) {
                    input[src_y as usize * width + src_x as usize]
                } else {
                    0.0
                };
                *cell = c * keep + shifted * factor;
            }
        });
}

/// Stages 4 and 5: multiply by `1 − decay_rate`, then zero the border
pub fn decay_and_clamp_edges(concentration: &mut [f32], width: usize, height: usize, decay_rate: f32) {
    let retain = 1.0 - decay_rate;
    concentration
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            if y == 0 || y + 1 == height {
                row.fill(0.0);
                return;
            }
            for c in row.iter_mut() {
                *c *= retain;
            }
            row[0] = 0.0;
            row[width - 1] = 0.0;
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_permeability_mask_clamps() {
        let mask = permeability_mask(&[0.0, 12.5, 25.0, 28.8, -3.0], 25.0);
        assert_eq!(mask, vec![0.0, 0.5, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_inject_splits_background_and_traffic() {
        let mut c = vec![1.0, 0.0];
        let mask = [1.0, 0.0];
        let congestion = [1.5, 1.5];
        inject_emissions(
            &mut c,
            &mask,
            &congestion,
            EmissionParams {
                background_level: 10.0,
                ratio_background: 0.3,
                traffic_volume: 0.5,
                traffic_emission_scalar: 60.0,
                ratio_traffic: 0.7,
            },
        );
        // 1 + 10·0.3 + 1.5·0.5·60·0.7
        assert_relative_eq!(c[0], 1.0 + 3.0 + 31.5, epsilon = 1e-4);
        assert_eq!(c[1], 0.0);
    }

    #[test]
    fn test_diffuse_conserves_mass_and_wraps() {
        let (w, h) = (5, 4);
        let mut input = vec![0.0; w * h];
        input[0] = 100.0; // corner: neighbours wrap to the far edges
        let mut output = vec![0.0; w * h];
        diffuse(&input, &mut output, w, h, 0.1);

        assert_relative_eq!(output[0], 60.0, epsilon = 1e-4);
        assert_relative_eq!(output[1], 10.0, epsilon = 1e-4);
        assert_relative_eq!(output[w - 1], 10.0, epsilon = 1e-4);
        assert_relative_eq!(output[w], 10.0, epsilon = 1e-4);
        assert_relative_eq!(output[(h - 1) * w], 10.0, epsilon = 1e-4);
        let total: f32 = output.iter().sum();
        assert_relative_eq!(total, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_advect_full_shift_moves_cell() {
        let (w, h) = (4, 4);
        let mut input = vec![0.0; w * h];
        input[w + 1] = 8.0; // (col 1, row 1)
        let mut output = vec![0.0; w * h];

        advect(&input, &mut output, w, h, (1, 1), 1.0);
        assert_eq!(output[w + 1], 0.0);
        assert_eq!(output[2 * w + 2], 8.0);

        advect(&input, &mut output, w, h, (-1, 0), 0.25);
        assert_relative_eq!(output[w + 1], 6.0);
        assert_relative_eq!(output[w], 2.0);
    }

    #[test]
    fn test_advect_never_wraps() {
        let (w, h) = (3, 3);
        let mut input = vec![0.0; w * h];
        input[w + 2] = 5.0; // east edge
        let mut output = vec![0.0; w * h];
        advect(&input, &mut output, w, h, (1, 0), 1.0);
        assert!(output.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_decay_and_border() {
        let (w, h) = (4, 3);
        let mut c = vec![10.0; w * h];
        decay_and_clamp_edges(&mut c, w, h, 0.5);
        for y in 0..h {
            for x in 0..w {
                let v = c[y * w + x];
                if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                    assert_eq!(v, 0.0);
                } else {
                    assert_eq!(v, 5.0);
                }
            }
        }
    }
}
