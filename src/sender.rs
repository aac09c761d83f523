use crate::messaging::Outbound;
use std::time::Duration;

/// Delay between consecutive bulk-send steps, matching the staggered
/// window-open loop this replaces.
pub const STAGGER: Duration = Duration::from_millis(2500);

/// Opening many chat tabs at once tends to get them blocked; warn above this.
pub const TAB_WARNING_THRESHOLD: usize = 5;

/// An explicit task queue for staggered bulk sends.
///
/// The queue holds the pending links plus a cursor; an external scheduler
/// (interval or timeout) advances it by calling [`BulkSender::step`] once
/// per tick, [`STAGGER`] apart. The cancellation flag is checked before
/// each step fires, so `cancel` prevents every not-yet-fired step but
/// cannot recall ones already handed out.
#[derive(Clone, Debug, Default)]
pub struct BulkSender {
    queue: Vec<Outbound>,
    cursor: usize,
    cancelled: bool,
}

impl BulkSender {
    pub fn new() -> Self {
        BulkSender::default()
    }

    /// Load a fresh batch, resetting the cursor and cancellation flag.
    pub fn start(&mut self, list: Vec<Outbound>) {
        log::info!("bulk send started with {} message(s)", list.len());
        self.queue = list;
        self.cursor = 0;
        self.cancelled = false;
    }

    /// Stop the run; pending steps will never fire.
    pub fn cancel(&mut self) {
        if !self.is_done() {
            log::info!(
                "bulk send cancelled with {} message(s) unsent",
                self.queue.len() - self.cursor
            );
        }
        self.cancelled = true;
    }

    /// The next action to perform, or `None` when cancelled or exhausted.
    /// Each returned message counts as fired.
    pub fn step(&mut self) -> Option<Outbound> {
        if self.cancelled || self.cursor >= self.queue.len() {
            return None;
        }
        let message = self.queue[self.cursor].clone();
        self.cursor += 1;
        Some(message)
    }

    /// `(done, total)` for a progress display.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.queue.len())
    }

    pub fn is_done(&self) -> bool {
        self.cancelled || self.cursor >= self.queue.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}
