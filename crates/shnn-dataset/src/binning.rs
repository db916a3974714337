//! Temporal binning of event streams into occupancy tensors
//!
//! Rows are spatial-channel units flattened as
//! `(channel * input_y + y) * input_x + x`; columns are time bins of width
//! `t_res` starting at `t_start`. Events outside `[t_start, t_end)` carry no
//! signal and are dropped.

use ndarray::{Array2, ArrayViewMut2};
use shnn_events::AddressEvent;

use crate::{
    error::{DatasetError, Result},
    params::{DatasetParams, OccupancyMode},
};

/// Dense (unit x time) spike tensor
pub type SpikeTensor = Array2<f32>;

/// Counters from one binning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinStats {
    /// Events written into the tensor
    pub placed: usize,
    /// Events whose timestamp fell outside the window
    pub dropped_out_of_window: usize,
    /// Events whose coordinates fell outside the sensor extent
    pub dropped_out_of_extent: usize,
    /// Placed events that landed in an already occupied cell
    pub collisions: usize,
}

impl BinStats {
    /// Total events dropped
    pub fn dropped(&self) -> usize {
        self.dropped_out_of_window + self.dropped_out_of_extent
    }
}

/// Maps event sequences onto the time grid described by [`DatasetParams`]
#[derive(Debug, Clone)]
pub struct TemporalBinner {
    params: DatasetParams,
}

impl TemporalBinner {
    /// Create a binner for `params`
    pub fn new(params: &DatasetParams) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// Parameters in use
    pub fn params(&self) -> &DatasetParams {
        &self.params
    }

    /// Shape of one binned tensor: `(input_size, num_time_bins)`
    pub fn shape(&self) -> (usize, usize) {
        (self.params.input_size(), self.params.num_time_bins())
    }

    /// Bin `events` into a fresh tensor
    pub fn bin(&self, events: &[AddressEvent]) -> SpikeTensor {
        let mut tensor = Array2::zeros(self.shape());
        self.fill(events, tensor.view_mut());
        tensor
    }

    /// Bin `events` into `out`, which is cleared first.
    ///
    /// `out` must have the shape returned by [`TemporalBinner::shape`]; it is
    /// typically one sample's column block of a minibatch tensor.
    pub fn bin_into(&self, events: &[AddressEvent], mut out: ArrayViewMut2<'_, f32>) -> Result<BinStats> {
        if out.dim() != self.shape() {
            return Err(DatasetError::invalid_parameter(
                "output shape",
                format!("{:?}", out.dim()),
                format!("{:?}", self.shape()),
            ));
        }
        out.fill(0.0);
        Ok(self.fill(events, out))
    }

    fn fill(&self, events: &[AddressEvent], mut out: ArrayViewMut2<'_, f32>) -> BinStats {
        let mut stats = BinStats::default();

        for event in events {
            let Some(bin) = self.params.bin_index(event.timestamp) else {
                stats.dropped_out_of_window += 1;
                continue;
            };
            let Some(row) = self.params.flat_index(event.x, event.y, event.channel) else {
                stats.dropped_out_of_extent += 1;
                continue;
            };

            let cell = &mut out[[row, bin]];
            if *cell != 0.0 {
                stats.collisions += 1;
            }
            match self.params.occupancy() {
                OccupancyMode::Binary => *cell = 1.0,
                OccupancyMode::Count => *cell += 1.0,
            }
            stats.placed += 1;
        }

        if stats.dropped_out_of_extent > 0 {
            log::warn!(
                "{} events outside the {}x{}x{} sensor extent were dropped",
                stats.dropped_out_of_extent,
                self.params.input_x(),
                self.params.input_y(),
                self.params.input_channels()
            );
        }
        log::debug!("Binned {} events: {:?}", events.len(), stats);
        stats
    }
}
