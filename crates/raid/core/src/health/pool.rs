/// The health pool every participant drains together.
///
/// `init_max` is the opponent's unscaled maximum and never changes. `max` grows as
/// participants join; `current` always stays within `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SharedHealthPool {
    current: f32,
    max: f32,
    init_max: f32,
}

impl SharedHealthPool {
    /// Builds a full pool of `init_max × multiplier`.
    pub fn new(init_max: f32, multiplier: f32) -> Self {
        let init_max = sanitize(init_max);
        let max = sanitize(init_max * multiplier);
        Self {
            current: max,
            max,
            init_max,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn init_max(&self) -> f32 {
        self.init_max
    }

    /// Remaining fraction of the pool. An empty pool reads as `0.0`.
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Subtracts `amount` and returns how much was actually removed.
    ///
    /// Non-positive and non-finite amounts leave the pool untouched.
    pub fn drain(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current - amount).clamp(0.0, self.max);
        before - self.current
    }

    /// Changes the maximum while keeping the remaining ratio.
    pub fn rescale(&mut self, new_max: f32) {
        let new_max = sanitize(new_max);
        let ratio = self.ratio();
        self.max = new_max;
        self.current = (new_max * ratio).clamp(0.0, new_max);
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clamps_at_zero() {
        let mut pool = SharedHealthPool::new(100.0, 2.0);
        assert_eq!(pool.drain(150.0), 150.0);
        assert_eq!(pool.drain(150.0), 50.0);
        assert_eq!(pool.current(), 0.0);
        assert!(pool.is_depleted());
    }

    #[test]
    fn drain_ignores_heals_and_garbage() {
        let mut pool = SharedHealthPool::new(100.0, 1.0);
        assert_eq!(pool.drain(-10.0), 0.0);
        assert_eq!(pool.drain(f32::NAN), 0.0);
        assert_eq!(pool.drain(f32::INFINITY), 0.0);
        assert_eq!(pool.current(), 100.0);
    }

    #[test]
    fn rescale_keeps_ratio() {
        let mut pool = SharedHealthPool::new(100.0, 4.0);
        pool.drain(100.0);
        assert_eq!(pool.ratio(), 0.75);

        pool.rescale(600.0);
        assert_eq!(pool.max(), 600.0);
        assert_eq!(pool.current(), 450.0);
        assert_eq!(pool.ratio(), 0.75);
    }

    #[test]
    fn zero_multiplier_yields_empty_pool() {
        let pool = SharedHealthPool::new(100.0, 0.0);
        assert!(pool.is_depleted());
        assert_eq!(pool.ratio(), 0.0);
    }
}
