use super::error::{FileError, FileResult};

/// Eviction strategy for the buffer pool.
///
/// The buffer manager drives a policy through access and evict
/// notifications and asks it for a victim only when the pool is full, so a
/// policy never has to bound its own size (CLOCK being the exception, since
/// its circular buffer is sized by the pool capacity).
pub trait ReplacementPolicy {
    /// Reset to the empty state.
    fn init(&mut self);

    /// Record an access to the page at `offset`. Called on every buffer hit
    /// and after a missed page is installed.
    fn notify_access(&mut self, offset: u64);

    /// Called after the buffer manager has removed the frame at `offset`.
    fn notify_evict(&mut self, offset: u64);

    /// Pick the page to evict. Only called when the pool is full; the
    /// returned offset must be resident.
    fn choose_victim(&mut self) -> FileResult<u64>;

    fn name(&self) -> &'static str;
}

/// Build a policy by name ("LRU", "MRU" or "CLOCK", case-insensitive).
/// `capacity` is the buffer pool size; only CLOCK needs it.
pub fn create_policy(name: &str, capacity: usize) -> Option<Box<dyn ReplacementPolicy>> {
    match name.to_ascii_uppercase().as_str() {
        "LRU" => Some(Box::new(LruPolicy::new())),
        "MRU" => Some(Box::new(MruPolicy::new())),
        "CLOCK" => Some(Box::new(ClockPolicy::new(capacity))),
        _ => None,
    }
}

/// Least-recently-used eviction.
///
/// Keeps offsets ordered from least to most recently accessed. The victim is
/// the head of the list; it is removed by the `notify_evict` that follows
/// victim selection, not by `choose_victim` itself.
pub struct LruPolicy {
    pages: Vec<u64>,
}

impl LruPolicy {
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }
}

impl Default for LruPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for LruPolicy {
    fn init(&mut self) {
        self.pages.clear();
    }

    fn notify_access(&mut self, offset: u64) {
        if let Some(pos) = self.pages.iter().position(|&o| o == offset) {
            self.pages.remove(pos);
        }
        self.pages.push(offset);
    }

    fn notify_evict(&mut self, offset: u64) {
        if let Some(pos) = self.pages.iter().position(|&o| o == offset) {
            self.pages.remove(pos);
        }
    }

    fn choose_victim(&mut self) -> FileResult<u64> {
        self.pages
            .first()
            .copied()
            .ok_or(FileError::NoEvictionCandidate("LRU"))
    }

    fn name(&self) -> &'static str {
        "LRU"
    }
}

/// Most-recently-used eviction.
///
/// Tracks only the single most recently accessed offset; `None` models the
/// state before any access. The buffer manager's invocation order
/// (`choose_victim`, `notify_evict`, then `notify_access` of the new page)
/// guarantees the tracked offset is resident whenever it is set.
pub struct MruPolicy {
    most_recently_used: Option<u64>,
}

impl MruPolicy {
    pub fn new() -> Self {
        Self {
            most_recently_used: None,
        }
    }
}

impl Default for MruPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for MruPolicy {
    fn init(&mut self) {
        self.most_recently_used = None;
    }

    fn notify_access(&mut self, offset: u64) {
        self.most_recently_used = Some(offset);
    }

    fn notify_evict(&mut self, offset: u64) {
        if self.most_recently_used == Some(offset) {
            self.most_recently_used = None;
        }
    }

    fn choose_victim(&mut self) -> FileResult<u64> {
        self.most_recently_used
            .ok_or(FileError::NoEvictionCandidate("MRU"))
    }

    fn name(&self) -> &'static str {
        "MRU"
    }
}

/// CLOCK (second-chance) eviction.
///
/// A circular buffer of `(offset, reference bit)` entries and a hand index.
/// Victim selection sweeps from the hand, clearing set reference bits and
/// evicting the first entry whose bit is already clear. The hand advances
/// modulo the live entry count and is clamped after any removal, so it can
/// never index past the end while the pool is still filling or right after
/// an eviction shrank the buffer.
pub struct ClockPolicy {
    capacity: usize,
    entries: Vec<(u64, bool)>,
    hand: usize,
}

impl ClockPolicy {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
            hand: 0,
        }
    }

    fn remove_entry(&mut self, index: usize) {
        self.entries.remove(index);
        if index < self.hand {
            self.hand -= 1;
        }
        if self.hand >= self.entries.len() {
            self.hand = 0;
        }
    }
}

impl ReplacementPolicy for ClockPolicy {
    fn init(&mut self) {
        self.entries.clear();
        self.hand = 0;
    }

    fn notify_access(&mut self, offset: u64) {
        if let Some(entry) = self.entries.iter_mut().find(|(o, _)| *o == offset) {
            entry.1 = true;
        } else if self.entries.len() < self.capacity {
            self.entries.push((offset, true));
        }
        // Otherwise nothing to do: the buffer manager evicts before
        // installing a new page, so a slot is always free by then.
    }

    fn notify_evict(&mut self, offset: u64) {
        if let Some(index) = self.entries.iter().position(|(o, _)| *o == offset) {
            self.remove_entry(index);
        }
    }

    fn choose_victim(&mut self) -> FileResult<u64> {
        if self.entries.is_empty() {
            return Err(FileError::NoEvictionCandidate("CLOCK"));
        }
        // Terminates within two sweeps: the first pass clears every set bit
        // it passes, so the second pass must find a clear one.
        loop {
            let (offset, referenced) = self.entries[self.hand];
            if !referenced {
                self.remove_entry(self.hand);
                return Ok(offset);
            }
            self.entries[self.hand].1 = false;
            self.hand = (self.hand + 1) % self.entries.len();
        }
    }

    fn name(&self) -> &'static str {
        "CLOCK"
    }
}
