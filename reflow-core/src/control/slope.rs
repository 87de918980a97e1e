//! Temperature slope tracking

/// Rise rate between consecutive readings (°C/s, unsmoothed)
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlopeTracker {
    last: Option<(f32, u64)>,
}

impl SlopeTracker {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Forget the previous reading
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Feed a reading and return the slope since the previous one
    ///
    /// The first reading after a reset yields 0. Readings less than 1 ms
    /// apart are treated as 1 ms apart.
    pub fn sample(&mut self, temperature_c: f32, at_ms: u64) -> f32 {
        let previous = self.last.replace((temperature_c, at_ms));
        match previous {
            Some((last_c, last_ms)) => {
                let dt_s = at_ms.saturating_sub(last_ms).max(1) as f32 / 1000.0;
                (temperature_c - last_c) / dt_s
            }
            None => 0.0,
        }
    }
}
