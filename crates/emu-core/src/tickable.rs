//! Trait for components that are advanced by clock ticks.

use crate::Ticks;

/// A component that can be advanced by clock ticks.
///
/// What a tick means is up to the component: the video chip counts colour
/// clocks, the timer chip counts CPU cycles. The machine that owns both is
/// responsible for keeping the ratio between them.
pub trait Tickable {
    /// Advance the component by one tick.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
