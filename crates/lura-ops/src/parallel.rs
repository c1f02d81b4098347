//! Row-parallel execution using Rayon.
//!
//! Every per-pixel operation in this crate writes one destination row at a
//! time, so rows are the natural unit of parallel work. With the
//! `parallel` feature enabled and [`ExecOptions::parallel`] set, rows are
//! distributed with `par_chunks_mut`; otherwise they run sequentially. Both
//! paths produce identical output.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Execution switches shared by the pixel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    /// Evaluate color matrices with the 4-lane `wide` kernel.
    pub simd: bool,
    /// Distribute rows over the Rayon thread pool.
    pub parallel: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            simd: true,
            parallel: cfg!(feature = "parallel"),
        }
    }
}

impl ExecOptions {
    /// Scalar, single-threaded execution. Used as the reference path.
    pub const SCALAR: Self = Self {
        simd: false,
        parallel: false,
    };
}

/// Calls `f(y, row)` for every `row_len`-sized row of `dst`.
pub fn for_each_row<F>(dst: &mut [u8], row_len: usize, opts: ExecOptions, f: F)
where
    F: Fn(usize, &mut [u8]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        if opts.parallel {
            dst.par_chunks_mut(row_len)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
            return;
        }
    }

    #[cfg(not(feature = "parallel"))]
    let _ = opts;

    dst.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_visited_once() {
        let mut buf = vec![0u8; 6 * 5];
        for_each_row(&mut buf, 6, ExecOptions::default(), |y, row| {
            row.iter_mut().for_each(|v| *v = y as u8 + 1);
        });
        for (y, row) in buf.chunks(6).enumerate() {
            assert!(row.iter().all(|&v| v == y as u8 + 1));
        }
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let mut a = vec![0u8; 64 * 32];
        let mut b = a.clone();
        let fill = |y: usize, row: &mut [u8]| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = ((x * 7 + y * 13) % 251) as u8;
            }
        };
        for_each_row(&mut a, 64, ExecOptions::SCALAR, fill);
        for_each_row(&mut b, 64, ExecOptions::default(), fill);
        assert_eq!(a, b);
    }
}
