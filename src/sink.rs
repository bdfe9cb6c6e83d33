//! Display collaborators notified by the board.
//!
//! The board calls [`CellSink::attach`] once per cell when it is initialised
//! and [`CellSink::cell_changed`] once per write. Sinks only observe; they
//! never write back into the board.

/// Receiver for per-cell display updates.
pub trait CellSink {
    /// A display element for `(x, y)` is being allocated.
    fn attach(&mut self, _x: usize, _y: usize) {}

    /// `(x, y)` now holds `value` (0 = empty).
    fn cell_changed(&mut self, x: usize, y: usize, value: u32);
}

impl<T: CellSink + ?Sized> CellSink for &mut T {
    fn attach(&mut self, x: usize, y: usize) {
        (**self).attach(x, y)
    }

    fn cell_changed(&mut self, x: usize, y: usize, value: u32) {
        (**self).cell_changed(x, y, value)
    }
}

impl<T: CellSink + ?Sized> CellSink for Box<T> {
    fn attach(&mut self, x: usize, y: usize) {
        (**self).attach(x, y)
    }

    fn cell_changed(&mut self, x: usize, y: usize, value: u32) {
        (**self).cell_changed(x, y, value)
    }
}

/// Headless sink: drops every update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullSink;

impl CellSink for NullSink {
    #[inline]
    fn cell_changed(&mut self, _x: usize, _y: usize, _value: u32) {}
}

/// One `cell_changed` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellUpdate {
    pub x: usize,
    pub y: usize,
    pub value: u32,
}

/// Sink that keeps every notification in order. Used by tests and the soak
/// runner to audit what the display would have seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorder {
    attached: Vec<(usize, usize)>,
    updates: Vec<CellUpdate>,
}

impl Recorder {
    pub fn attached(&self) -> &[(usize, usize)] {
        &self.attached
    }

    pub fn updates(&self) -> &[CellUpdate] {
        &self.updates
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.attached.clear();
        self.updates.clear();
    }

    /// Replay the updates on top of `rows[y][x]`, yielding what a display
    /// that started from `rows` would show now.
    pub fn replay(&self, rows: &mut [Vec<u32>]) {
        for u in &self.updates {
            rows[u.y][u.x] = u.value;
        }
    }
}

impl CellSink for Recorder {
    fn attach(&mut self, x: usize, y: usize) {
        self.attached.push((x, y));
    }

    fn cell_changed(&mut self, x: usize, y: usize, value: u32) {
        self.updates.push(CellUpdate { x, y, value });
    }
}
