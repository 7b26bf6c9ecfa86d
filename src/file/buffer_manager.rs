use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;

use super::disk_manager::DiskManager;
use super::error::{FileError, FileResult};
use super::replacement::ReplacementPolicy;

/// One cell of the buffer pool: the page image plus its dirty flag. The
/// page's offset is the frame's key in the page table.
struct PageFrame {
    data: Vec<u8>,
    dirty: bool,
}

/// Fixed-capacity cache of pages keyed by their byte offset in the data
/// file.
///
/// A miss on a full pool asks the owned replacement policy for a victim,
/// writes the victim back if dirty, and only then loads the requested page,
/// so the pool never exceeds `pool_size` frames and dirty data is never
/// dropped. The policy sees every access and every eviction, in the order
/// the operations are issued.
pub struct BufferManager {
    disk: DiskManager,
    pool_size: usize,
    page_table: HashMap<u64, PageFrame>,
    policy: Box<dyn ReplacementPolicy>,

    hit_count: usize,
    miss_count: usize,
    disk_read_count: usize,
    disk_write_count: usize,
}

impl BufferManager {
    pub fn new(
        data_path: impl Into<PathBuf>,
        pool_size: usize,
        mut policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        policy.init();
        Self {
            disk: DiskManager::new(data_path),
            pool_size,
            page_table: HashMap::new(),
            policy,
            hit_count: 0,
            miss_count: 0,
            disk_read_count: 0,
            disk_write_count: 0,
        }
    }

    /// Fetch the page at `offset`, loading it from disk on a miss.
    ///
    /// Returns the frame's page bytes. The borrow ends at the next call into
    /// the buffer manager, which is free to evict the page afterwards;
    /// callers that mutate the bytes must follow up with [`mark_dirty`].
    ///
    /// [`mark_dirty`]: BufferManager::mark_dirty
    pub fn get_page(&mut self, offset: u64) -> FileResult<&mut [u8]> {
        if self.page_table.contains_key(&offset) {
            self.hit_count += 1;
            self.policy.notify_access(offset);
        } else {
            self.miss_count += 1;
            if self.page_table.len() >= self.pool_size {
                self.evict_one()?;
            }
            let data = self.disk.read_page(offset)?;
            self.disk_read_count += 1;
            self.page_table.insert(offset, PageFrame { data, dirty: false });
            self.policy.notify_access(offset);
        }

        let frame = self
            .page_table
            .get_mut(&offset)
            .ok_or(FileError::PageNotResident(offset))?;
        Ok(&mut frame.data)
    }

    /// Flag the resident page at `offset` as modified so eviction and
    /// `flush_all` write it back. Fails if the page is not resident.
    pub fn mark_dirty(&mut self, offset: u64) -> FileResult<()> {
        let frame = self
            .page_table
            .get_mut(&offset)
            .ok_or(FileError::PageNotResident(offset))?;
        frame.dirty = true;
        Ok(())
    }

    /// Write every dirty frame back to disk without evicting anything.
    pub fn flush_all(&mut self) -> FileResult<()> {
        for (&offset, frame) in self.page_table.iter_mut() {
            if frame.dirty {
                self.disk.write_page(offset, &frame.data)?;
                self.disk_write_count += 1;
                frame.dirty = false;
            }
        }
        Ok(())
    }

    /// Evict the policy's victim, writing it back first if dirty.
    fn evict_one(&mut self) -> FileResult<()> {
        let victim = self.policy.choose_victim()?;
        let frame = self
            .page_table
            .remove(&victim)
            .ok_or(FileError::PageNotResident(victim))?;
        if frame.dirty {
            self.disk.write_page(victim, &frame.data)?;
            self.disk_write_count += 1;
        }
        self.policy.notify_evict(victim);
        debug!("evicted page at offset {} (dirty: {})", victim, frame.dirty);
        Ok(())
    }

    /// Number of pages currently resident.
    pub fn current_pool_size(&self) -> usize {
        self.page_table.len()
    }

    pub fn hit_count(&self) -> usize {
        self.hit_count
    }

    pub fn miss_count(&self) -> usize {
        self.miss_count
    }

    /// Fraction of lookups served from the pool; 0.0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total > 0 {
            self.hit_count as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn disk_read_count(&self) -> usize {
        self.disk_read_count
    }

    pub fn disk_write_count(&self) -> usize {
        self.disk_write_count
    }

    pub fn reset_hit_miss_counters(&mut self) {
        self.hit_count = 0;
        self.miss_count = 0;
    }

    pub fn reset_disk_io_counters(&mut self) {
        self.disk_read_count = 0;
        self.disk_write_count = 0;
    }

    pub fn replacement_policy_name(&self) -> &'static str {
        self.policy.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{LruPolicy, PAGE_SIZE};
    use tempfile::TempDir;

    fn setup_test_env(pool_size: usize) -> (TempDir, BufferManager) {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_path = temp_dir.path().join("test.dat");

        // Seed the data file with four pages tagged by their index.
        let disk = DiskManager::new(&data_path);
        for i in 0..4u8 {
            let mut buffer = vec![0u8; PAGE_SIZE];
            buffer[0] = i;
            disk.write_page(i as u64 * PAGE_SIZE as u64, &buffer).unwrap();
        }

        let bm = BufferManager::new(data_path, pool_size, Box::new(LruPolicy::new()));
        (temp_dir, bm)
    }

    fn offset(i: u64) -> u64 {
        i * PAGE_SIZE as u64
    }

    #[test]
    fn test_hit_and_miss_accounting() {
        let (_temp_dir, mut bm) = setup_test_env(2);

        assert_eq!(bm.get_page(offset(0)).unwrap()[0], 0);
        assert_eq!(bm.miss_count(), 1);
        assert_eq!(bm.hit_count(), 0);

        assert_eq!(bm.get_page(offset(0)).unwrap()[0], 0);
        assert_eq!(bm.miss_count(), 1);
        assert_eq!(bm.hit_count(), 1);
        assert_eq!(bm.disk_read_count(), 1);
        assert!((bm.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_ratio_zero_without_accesses() {
        let (_temp_dir, bm) = setup_test_env(2);
        assert_eq!(bm.hit_ratio(), 0.0);
    }

    #[test]
    fn test_pool_never_exceeds_capacity() {
        let (_temp_dir, mut bm) = setup_test_env(2);

        for i in 0..4 {
            bm.get_page(offset(i)).unwrap();
            assert!(bm.current_pool_size() <= 2);
        }
        assert_eq!(bm.current_pool_size(), 2);
    }

    #[test]
    fn test_lru_eviction_order() {
        let (_temp_dir, mut bm) = setup_test_env(2);

        bm.get_page(offset(0)).unwrap();
        bm.get_page(offset(1)).unwrap();
        // Re-access page 0 so page 1 becomes the LRU victim.
        bm.get_page(offset(0)).unwrap();
        bm.get_page(offset(2)).unwrap();

        bm.reset_hit_miss_counters();
        bm.get_page(offset(0)).unwrap();
        assert_eq!(bm.hit_count(), 1);
        bm.get_page(offset(1)).unwrap();
        assert_eq!(bm.miss_count(), 1);
    }

    #[test]
    fn test_dirty_page_written_back_on_eviction() {
        let (temp_dir, mut bm) = setup_test_env(2);

        let page = bm.get_page(offset(0)).unwrap();
        page[1] = 99;
        bm.mark_dirty(offset(0)).unwrap();

        // Fill the pool and force page 0 out.
        bm.get_page(offset(1)).unwrap();
        bm.get_page(offset(2)).unwrap();
        assert_eq!(bm.disk_write_count(), 1);

        let disk = DiskManager::new(temp_dir.path().join("test.dat"));
        assert_eq!(disk.read_page(offset(0)).unwrap()[1], 99);
    }

    #[test]
    fn test_clean_page_not_written_on_eviction() {
        let (_temp_dir, mut bm) = setup_test_env(2);

        bm.get_page(offset(0)).unwrap();
        bm.get_page(offset(1)).unwrap();
        bm.get_page(offset(2)).unwrap();
        assert_eq!(bm.disk_write_count(), 0);
    }

    #[test]
    fn test_flush_all_writes_dirty_frames() {
        let (temp_dir, mut bm) = setup_test_env(2);

        let page = bm.get_page(offset(0)).unwrap();
        page[1] = 7;
        bm.mark_dirty(offset(0)).unwrap();
        bm.get_page(offset(1)).unwrap();

        bm.flush_all().unwrap();
        assert_eq!(bm.disk_write_count(), 1);
        assert_eq!(bm.current_pool_size(), 2);

        let disk = DiskManager::new(temp_dir.path().join("test.dat"));
        assert_eq!(disk.read_page(offset(0)).unwrap()[1], 7);

        // Frames are clean after a flush; a second flush writes nothing.
        bm.flush_all().unwrap();
        assert_eq!(bm.disk_write_count(), 1);
    }

    #[test]
    fn test_mark_dirty_non_resident_fails() {
        let (_temp_dir, mut bm) = setup_test_env(2);
        assert!(matches!(
            bm.mark_dirty(offset(3)),
            Err(FileError::PageNotResident(_))
        ));
    }

    #[test]
    fn test_counter_resets() {
        let (_temp_dir, mut bm) = setup_test_env(2);

        bm.get_page(offset(0)).unwrap();
        bm.get_page(offset(0)).unwrap();
        bm.reset_hit_miss_counters();
        bm.reset_disk_io_counters();

        assert_eq!(bm.hit_count(), 0);
        assert_eq!(bm.miss_count(), 0);
        assert_eq!(bm.disk_read_count(), 0);
        assert_eq!(bm.disk_write_count(), 0);
    }

    #[test]
    fn test_policy_name() {
        let (_temp_dir, bm) = setup_test_env(2);
        assert_eq!(bm.replacement_policy_name(), "LRU");
    }
}
