//! Bump-pointer arena for compilation-lifetime storage.
//!
//! The Strata compiler interns every name it ever sees (region keywords,
//! scalar type names, record field names) and hands out small integer
//! handles instead of owned strings. The backing bytes for those names are
//! stored here: an append-only arena that allocates with a bump pointer and
//! never frees an individual allocation.
//!
//! # Design
//!
//! - **Bump allocation**: a chunk is a fixed block from the system
//!   allocator; allocating advances a pointer, nothing more
//! - **Stable addresses**: chunks never move or reallocate, so references
//!   into them stay valid as new chunks are added
//! - **Program-lifetime data**: chunks are leaked on creation; the strings
//!   carved out of them are `&'static str` and outlive the arena value
//!   itself. The compiler allocates one arena per process and names are
//!   needed until exit, so nothing is ever reclaimed.
//!
//! # Example
//!
//! ```
//! use strata_mem::arena::StringArena;
//!
//! let mut arena = StringArena::new(4096);
//!
//! let a = arena.alloc_str("global");
//! let b = arena.alloc_str("frame_offset");
//!
//! assert_eq!(a, "global");
//! assert_eq!(b, "frame_offset");
//! ```

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Error type for arena allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaAllocError;

impl std::fmt::Display for ArenaAllocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arena allocation failed: out of memory")
    }
}

impl std::error::Error for ArenaAllocError {}

/// Alignment for all arena allocations.
///
/// String payloads only need byte alignment, but keeping every allocation
/// word-aligned keeps chunk bookkeeping trivial and is cheap at the sizes
/// involved.
const ALIGNMENT: usize = 8;

/// Minimum chunk size (4 KiB, identifier-sized payloads).
const MIN_CHUNK_SIZE: usize = 4096;

/// Maximum chunk size (1 MiB).
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Arena allocation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total number of payload bytes handed out.
    pub bytes_allocated: usize,
    /// Number of chunks backing the arena.
    pub chunk_count: usize,
    /// Total capacity of all chunks in bytes.
    pub total_capacity: usize,
}

/// A fixed-size memory chunk with a non-atomic bump pointer.
///
/// Chunks come from `std::alloc` and are leaked on creation: the interner
/// hands out `&'static str` into them, so a chunk must never be reclaimed
/// while the process runs.
///
/// Not thread-safe. The inference engine is single-threaded end to end, so
/// the bump pointer is a plain `*mut u8` with no atomics.
struct Chunk {
    /// Current bump pointer.
    ptr: *mut u8,
    /// End of the chunk's memory region (exclusive).
    end: NonNull<u8>,
    /// Total capacity of the chunk in bytes.
    capacity: usize,
}

impl Chunk {
    /// Creates a new chunk, leaked to `'static`.
    fn new(size: usize) -> Result<&'static mut Self, ArenaAllocError> {
        if size < MIN_CHUNK_SIZE {
            return Err(ArenaAllocError);
        }

        let layout = unsafe { Layout::from_size_align_unchecked(size, ALIGNMENT) };

        let start = unsafe { alloc::alloc(layout) };
        let start = NonNull::new(start).ok_or(ArenaAllocError)?;

        // SAFETY: start came from alloc::alloc with `size` bytes, so one
        // past the end is a valid address for comparisons.
        let end = unsafe { start.as_ptr().add(size) };
        let end = NonNull::new(end).expect("chunk end pointer should not be null");

        // Leak the header so references into the chunk can be 'static.
        let chunk = Box::leak(Box::new(Chunk {
            ptr: start.as_ptr(),
            end,
            capacity: size,
        }));

        Ok(chunk)
    }

    /// Allocates `size` bytes from this chunk, or `None` if it is full.
    #[must_use]
    #[inline(always)]
    fn alloc(&mut self, size: usize) -> Option<NonNull<u8>> {
        let current = self.ptr.addr();

        // Round the start up to the arena alignment.
        let aligned_start = (current + ALIGNMENT - 1) & !(ALIGNMENT - 1);
        let new_addr = aligned_start.saturating_add(size);

        if new_addr > self.end.addr().get() {
            return None;
        }

        // with_addr keeps the provenance of the original chunk pointer
        // while moving it to the new bump position.
        self.ptr = self.ptr.with_addr(new_addr);

        let result = self.ptr.with_addr(aligned_start);
        // SAFETY: aligned_start lies within the chunk (checked above) and
        // the chunk base is non-null.
        unsafe { Some(NonNull::new_unchecked(result)) }
    }

    /// Bytes still available in this chunk.
    fn remaining(&self) -> usize {
        self.end.addr().get().saturating_sub(self.ptr.addr())
    }
}

/// Append-only arena for interned string storage.
///
/// `StringArena` is the single-threaded storage backend of the string
/// interner. Allocation is a pointer bump; growth doubles the chunk size up
/// to a 1 MiB cap. Nothing is ever freed: the strings handed out are
/// `&'static str` and stay valid for the life of the process.
///
/// # Example
///
/// ```
/// use strata_mem::arena::StringArena;
///
/// let mut arena = StringArena::new(4096);
/// let name = arena.alloc_str("workgroup_ptr");
/// assert_eq!(name, "workgroup_ptr");
///
/// let stats = arena.stats();
/// assert_eq!(stats.chunk_count, 1);
/// ```
pub struct StringArena {
    /// Chunks backing this arena; the last one is the active chunk.
    chunks: Vec<&'static mut Chunk>,
    /// Payload bytes handed out so far.
    bytes_allocated: usize,
}

impl StringArena {
    /// Creates a new arena with the given initial chunk size.
    ///
    /// The size is clamped to at least 4 KiB and rounded up to a power of
    /// two.
    ///
    /// # Panics
    ///
    /// Panics if the initial chunk allocation fails.
    #[must_use]
    pub fn new(initial_size: usize) -> Self {
        let size = initial_size.max(MIN_CHUNK_SIZE).next_power_of_two();

        let first = Chunk::new(size).expect("failed to allocate initial arena chunk");

        StringArena {
            chunks: vec![first],
            bytes_allocated: 0,
        }
    }

    /// Copies `s` into the arena and returns the stable copy.
    ///
    /// The returned reference is `'static`: the chunk holding it is leaked
    /// and never reclaimed.
    pub fn alloc_str(&mut self, s: &str) -> &'static str {
        let len = s.len();
        let ptr = self.alloc_bytes(len);

        // SAFETY: `ptr` is valid for `len` bytes of fresh arena memory,
        // the source is a live &str, and the regions cannot overlap.
        unsafe {
            std::ptr::copy_nonoverlapping(s.as_ptr(), ptr, len);
            let slice = std::slice::from_raw_parts(ptr, len);
            std::str::from_utf8_unchecked(slice)
        }
    }

    /// Returns allocation statistics for this arena.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            bytes_allocated: self.bytes_allocated,
            chunk_count: self.chunks.len(),
            total_capacity: self.chunks.iter().map(|c| c.capacity).sum(),
        }
    }

    /// Allocates raw bytes, growing the arena if the active chunk is full.
    fn alloc_bytes(&mut self, size: usize) -> *mut u8 {
        self.bytes_allocated += size;

        loop {
            if let Some(chunk) = self.chunks.last_mut()
                && let Some(ptr) = chunk.alloc(size)
            {
                return ptr.as_ptr();
            }

            let last_size = self.chunks.last().map_or(MIN_CHUNK_SIZE, |c| c.capacity);
            let new_size = (last_size * 2).min(MAX_CHUNK_SIZE).max(size.next_power_of_two());

            let chunk = Chunk::new(new_size).expect("failed to allocate arena chunk");
            self.chunks.push(chunk);
        }
    }
}
