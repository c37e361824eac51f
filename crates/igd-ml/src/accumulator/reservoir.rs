use std::fmt::Debug;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::accumulator::{add_gradient, GradientAccumulator, GradientParams};
use crate::error::{MlError, MlResult};
use crate::row::Row;

/// Accumulates the gradient of a bounded uniform sample of the pass.
///
/// Rows are sampled with reservoir sampling (Algorithm R). The gradient of
/// the sampled rows is computed when the pass is finalized, at a cost of
/// `O(k)` instead of `O(m)` per pass.
///
/// The gradient sum is normalized by the size `m` of the whole working set
/// and not by the number of sampled rows, so the step shrinks as `k` gets
/// small relative to `m`.
#[derive(Debug, Clone)]
pub struct ReservoirAccumulator<R = ChaCha8Rng> {
    params: GradientParams,
    capacity: usize,
    sample: Vec<Row>,
    /// The number of rows seen in the current pass.
    observed: usize,
    theta: Vec<f64>,
    passes: usize,
    rng: R,
}

impl ReservoirAccumulator<ChaCha8Rng> {
    pub fn seeded(params: GradientParams, capacity: usize, seed: u64) -> MlResult<Self> {
        Self::try_new(params, capacity, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ReservoirAccumulator<R> {
    pub fn try_new(params: GradientParams, capacity: usize, rng: R) -> MlResult<Self> {
        params.validate()?;
        if capacity == 0 {
            return Err(MlError::invalid("reservoir capacity must be positive"));
        }
        Ok(Self {
            params,
            capacity,
            sample: Vec::with_capacity(capacity.min(params.rows)),
            observed: 0,
            theta: vec![0.0; params.cols],
            passes: 0,
            rng,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The rows currently held in the reservoir.
    pub fn sample(&self) -> &[Row] {
        &self.sample
    }

    pub fn observed(&self) -> usize {
        self.observed
    }
}

impl<R: Rng + Debug + Send> GradientAccumulator for ReservoirAccumulator<R> {
    fn consume(&mut self, row: &Row) -> MlResult<()> {
        self.params.check_row(row)?;
        if self.observed < self.capacity {
            self.sample.push(row.clone());
        } else {
            // the row replaces a sampled row with probability `k / (observed + 1)`
            let slot = self.rng.random_range(0..=self.observed);
            if let Some(sampled) = self.sample.get_mut(slot) {
                *sampled = row.clone();
            }
        }
        self.observed += 1;
        Ok(())
    }

    fn finalize_pass(&mut self) {
        let scale = self.params.scale();
        let mut s = vec![0.0; self.params.cols];
        for row in self.sample.iter() {
            add_gradient(&mut s, &self.theta, row, scale);
        }
        for (t, s) in self.theta.iter_mut().zip(s.iter()) {
            *t -= s;
        }
        self.sample.clear();
        self.observed = 0;
        self.passes += 1;
    }

    fn passes(&self) -> usize {
        self.passes
    }

    fn max_passes(&self) -> usize {
        self.params.max_passes
    }

    fn theta(&self) -> &[f64] {
        &self.theta
    }
}
