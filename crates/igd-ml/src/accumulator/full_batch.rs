use crate::accumulator::{add_gradient, GradientAccumulator, GradientParams};
use crate::error::MlResult;
use crate::row::Row;

/// Accumulates the gradient of every row in the pass.
#[derive(Debug, Clone)]
pub struct FullBatchAccumulator {
    params: GradientParams,
    theta: Vec<f64>,
    s: Vec<f64>,
    passes: usize,
}

impl FullBatchAccumulator {
    pub fn try_new(params: GradientParams) -> MlResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            theta: vec![0.0; params.cols],
            s: vec![0.0; params.cols],
            passes: 0,
        })
    }

    /// The contribution accumulated so far in the current pass.
    pub fn pending(&self) -> &[f64] {
        &self.s
    }
}

impl GradientAccumulator for FullBatchAccumulator {
    fn consume(&mut self, row: &Row) -> MlResult<()> {
        self.params.check_row(row)?;
        add_gradient(&mut self.s, &self.theta, row, self.params.scale());
        Ok(())
    }

    fn finalize_pass(&mut self) {
        for (t, s) in self.theta.iter_mut().zip(self.s.iter_mut()) {
            *t -= *s;
            *s = 0.0;
        }
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
