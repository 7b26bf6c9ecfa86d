use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::directory::{PageDirectory, PageInfo};
use super::error::{RecordError, RecordResult};
use super::page::{Page, SLOT_COUNT};
use super::record::{Record, RecordId};
use crate::file::{BufferManager, DiskManager, PageId, ReplacementPolicy, PAGE_SIZE};

/// Record store over one data file and one directory sidecar file.
///
/// Owns the page directory, the buffer pool, and an in-memory hash index
/// from key to record location. The directory is rewritten to its sidecar on
/// every mutation; the hash index lives only while the instance is open and
/// is rebuilt from disk at construction. Keys are unique: inserting a key
/// that is already present is an error.
pub struct HeapFile {
    directory: PageDirectory,
    directory_path: PathBuf,
    disk: DiskManager,
    buffer: BufferManager,
    hash_index: HashMap<i32, RecordId>,

    // Directory and allocation I/O; buffer-pool I/O is counted by the
    // buffer manager and the accessors below report the sum.
    disk_read_count: usize,
    disk_write_count: usize,
}

impl HeapFile {
    /// Open a heap file, creating it on first use. An absent directory file
    /// means an empty heap.
    pub fn new<P: AsRef<Path>>(
        data_path: P,
        directory_path: P,
        pool_size: usize,
        policy: Box<dyn ReplacementPolicy>,
    ) -> RecordResult<Self> {
        let data_path = data_path.as_ref().to_path_buf();
        let directory_path = directory_path.as_ref().to_path_buf();

        let mut disk_read_count = 0;
        let directory = if directory_path.exists() {
            let bytes = fs::read(&directory_path)?;
            disk_read_count += 1;
            PageDirectory::from_bytes(&bytes)?
        } else {
            PageDirectory::new()
        };

        let mut heap = Self {
            directory,
            directory_path,
            disk: DiskManager::new(&data_path),
            buffer: BufferManager::new(&data_path, pool_size, policy),
            hash_index: HashMap::new(),
            disk_read_count,
            disk_write_count: 0,
        };
        heap.rebuild_hash_index()?;
        Ok(heap)
    }

    /// Scan every page through the buffer pool and index each stored record
    /// by its key.
    fn rebuild_hash_index(&mut self) -> RecordResult<()> {
        let pages = self.directory.pages().to_vec();
        for (page_id, info) in pages.iter().enumerate() {
            let buffer = self.buffer.get_page(info.offset)?;
            let page = Page::from_buffer(buffer)?;
            for slot_id in 0..SLOT_COUNT {
                if page.is_slot_used(slot_id) {
                    let record = page.get_record(slot_id)?;
                    self.hash_index
                        .insert(record.key(), RecordId::new(page_id, slot_id));
                }
            }
        }
        Ok(())
    }

    /// Insert a record, allocating a new page when no existing page has a
    /// free slot. Returns the location the record was placed at.
    pub fn insert_record(&mut self, record: &Record) -> RecordResult<RecordId> {
        if self.hash_index.contains_key(&record.key()) {
            return Err(RecordError::DuplicateKey(record.key()));
        }

        let info = match self
            .directory
            .pages()
            .iter()
            .find(|info| info.free_slots > 0)
            .copied()
        {
            Some(info) => info,
            None => self.allocate_page()?,
        };
        let page_id = (info.offset / PAGE_SIZE as u64) as PageId;

        let buffer = self.buffer.get_page(info.offset)?;
        let mut page = Page::from_buffer(buffer)?;
        let slot_id = page.find_free_slot().ok_or(RecordError::PageFull(page_id))?;
        page.insert_record(slot_id, record)?;
        self.buffer.mark_dirty(info.offset)?;

        let mut updated = info;
        updated.free_slots -= 1;
        self.directory.update_page_info(updated)?;
        self.write_directory()?;

        self.hash_index
            .insert(record.key(), RecordId::new(page_id, slot_id));
        Ok(RecordId::new(page_id, slot_id))
    }

    /// Look up a record by key with a full scan in page-then-slot order.
    pub fn search_record(&mut self, key: i32) -> RecordResult<Option<Record>> {
        let pages = self.directory.pages().to_vec();
        for info in &pages {
            let buffer = self.buffer.get_page(info.offset)?;
            let page = Page::from_buffer(buffer)?;
            for slot_id in 0..SLOT_COUNT {
                if page.is_slot_used(slot_id) {
                    let record = page.get_record(slot_id)?;
                    if record.key() == key {
                        return Ok(Some(record));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Look up a record through the hash index. Touches at most one page and
    /// never falls back to a scan.
    pub fn search_record_with_hash(&mut self, key: i32) -> RecordResult<Option<Record>> {
        let rid = match self.hash_index.get(&key) {
            Some(&rid) => rid,
            None => return Ok(None),
        };

        let offset = (rid.page_id * PAGE_SIZE) as u64;
        let buffer = self.buffer.get_page(offset)?;
        let page = Page::from_buffer(buffer)?;
        if page.is_slot_used(rid.slot_id) {
            Ok(Some(page.get_record(rid.slot_id)?))
        } else {
            Ok(None)
        }
    }

    /// Delete the record with the given key. Returns false if no record has
    /// it.
    pub fn delete_record(&mut self, key: i32) -> RecordResult<bool> {
        let pages = self.directory.pages().to_vec();
        for info in &pages {
            let buffer = self.buffer.get_page(info.offset)?;
            let mut page = Page::from_buffer(buffer)?;
            for slot_id in 0..SLOT_COUNT {
                if page.is_slot_used(slot_id) && page.get_record(slot_id)?.key() == key {
                    page.delete_record(slot_id)?;
                    self.buffer.mark_dirty(info.offset)?;

                    let mut updated = *info;
                    updated.free_slots += 1;
                    self.directory.update_page_info(updated)?;
                    self.write_directory()?;

                    self.hash_index.remove(&key);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Collect every record whose key lies in `[lower, upper]` (inclusive),
    /// in page-then-slot order.
    pub fn range_search(&mut self, lower: i32, upper: i32) -> RecordResult<Vec<Record>> {
        let mut result = Vec::new();
        let pages = self.directory.pages().to_vec();
        for info in &pages {
            let buffer = self.buffer.get_page(info.offset)?;
            let page = Page::from_buffer(buffer)?;
            for slot_id in 0..SLOT_COUNT {
                if page.is_slot_used(slot_id) {
                    let record = page.get_record(slot_id)?;
                    if record.key() >= lower && record.key() <= upper {
                        result.push(record);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Write all dirty buffered pages back to disk.
    pub fn flush_all(&mut self) -> RecordResult<()> {
        self.buffer.flush_all()?;
        Ok(())
    }

    /// Dump every page's records to stdout.
    pub fn print_all_pages(&mut self) -> RecordResult<()> {
        let pages = self.directory.pages().to_vec();
        for (page_id, info) in pages.iter().enumerate() {
            let buffer = self.buffer.get_page(info.offset)?;
            let page = Page::from_buffer(buffer)?;
            print!("Page {}:", page_id);
            for slot_id in 0..SLOT_COUNT {
                if page.is_slot_used(slot_id) {
                    let record = page.get_record(slot_id)?;
                    print!(" [{} -> {}]", record.key(), record.payload());
                }
            }
            println!();
        }
        Ok(())
    }

    /// Extend the heap by one empty page. The page image is written to the
    /// data file before the directory learns about it, so a crash in between
    /// leaves an unreferenced page rather than a dangling directory entry.
    fn allocate_page(&mut self) -> RecordResult<PageInfo> {
        let offset = (self.directory.page_count() * PAGE_SIZE) as u64;

        let mut image = vec![0u8; PAGE_SIZE];
        Page::init(&mut image)?;
        self.disk.write_page(offset, &image)?;
        self.disk_write_count += 1;

        let info = PageInfo::new(offset, SLOT_COUNT);
        self.directory.add_page(info);
        debug!("allocated page at offset {}", offset);
        Ok(info)
    }

    /// Rewrite the directory sidecar file in full.
    fn write_directory(&mut self) -> RecordResult<()> {
        fs::write(&self.directory_path, self.directory.to_bytes())?;
        self.disk_write_count += 1;
        Ok(())
    }

    pub fn current_pool_size(&self) -> usize {
        self.buffer.current_pool_size()
    }

    pub fn hit_count(&self) -> usize {
        self.buffer.hit_count()
    }

    pub fn miss_count(&self) -> usize {
        self.buffer.miss_count()
    }

    pub fn hit_ratio(&self) -> f64 {
        self.buffer.hit_ratio()
    }

    pub fn disk_read_count(&self) -> usize {
        self.disk_read_count + self.buffer.disk_read_count()
    }

    pub fn disk_write_count(&self) -> usize {
        self.disk_write_count + self.buffer.disk_write_count()
    }

    pub fn reset_hit_miss_counters(&mut self) {
        self.buffer.reset_hit_miss_counters();
    }

    pub fn reset_disk_io_counters(&mut self) {
        self.disk_read_count = 0;
        self.disk_write_count = 0;
        self.buffer.reset_disk_io_counters();
    }

    pub fn replacement_policy_name(&self) -> &'static str {
        self.buffer.replacement_policy_name()
    }
}
