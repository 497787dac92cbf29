//! Scratch buffers for decoded symbol characters
//!
//! Decoders that collect characters before validating framing borrow a
//! buffer from a shared pool. The buffer goes back to the pool when the
//! guard drops, so every return path releases it.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Buffers kept by the process-wide pool
const MAX_RETAINED: usize = 16;

/// Largest buffer capacity (in characters) the process-wide pool keeps
const MAX_CAPACITY: usize = 4096;

static POOL: ScratchPool = ScratchPool::new(MAX_RETAINED, MAX_CAPACITY);

/// Borrows a cleared buffer from the process-wide pool
pub fn scratch(capacity: usize) -> ScratchGuard<'static> {
    POOL.acquire(capacity)
}

/// A bounded free list of character buffers
#[derive(Debug)]
pub struct ScratchPool {
    free: Mutex<Vec<Vec<char>>>,
    max_retained: usize,
    max_capacity: usize,
}

impl ScratchPool {
    /// Creates an empty pool
    ///
    /// # Arguments
    /// * `max_retained` - Number of released buffers kept for reuse
    /// * `max_capacity` - Released buffers larger than this are freed instead
    pub const fn new(max_retained: usize, max_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_retained,
            max_capacity,
        }
    }

    /// Checks out an empty buffer with room for at least `capacity` characters
    pub fn acquire(&self, capacity: usize) -> ScratchGuard<'_> {
        let reused = self.free.lock().ok().and_then(|mut free| free.pop());
        let mut buf = reused.unwrap_or_default();
        buf.reserve(capacity);
        ScratchGuard { buf, pool: self }
    }

    /// Number of buffers currently held for reuse
    #[cfg(test)]
    fn retained(&self) -> usize {
        self.free.lock().map(|free| free.len()).unwrap_or(0)
    }

    fn release(&self, mut buf: Vec<char>) {
        if buf.capacity() > self.max_capacity {
            return;
        }
        buf.clear();
        // A poisoned lock only costs the reuse of this buffer
        if let Ok(mut free) = self.free.lock()
            && free.len() < self.max_retained
        {
            free.push(buf);
        }
    }
}

/// A checked-out buffer, returned to its pool on drop
#[derive(Debug)]
pub struct ScratchGuard<'a> {
    buf: Vec<char>,
    pool: &'a ScratchPool,
}

impl Deref for ScratchGuard<'_> {
    type Target = Vec<char>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_returns_buffer() {
        let pool = ScratchPool::new(2, 64);
        {
            let mut buf = pool.acquire(8);
            buf.extend("ABC".chars());
            assert_eq!(buf.len(), 3);
            assert_eq!(pool.retained(), 0);
        }
        assert_eq!(pool.retained(), 1);

        let buf = pool.acquire(4);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 8);
    }

    #[test]
    fn test_early_return_releases() {
        fn first_star(pool: &ScratchPool, s: &str) -> Option<usize> {
            let mut buf = pool.acquire(s.len());
            for c in s.chars() {
                if c == '*' {
                    return Some(buf.len());
                }
                buf.push(c);
            }
            None
        }

        let pool = ScratchPool::new(4, 64);
        assert_eq!(first_star(&pool, "AB*C"), Some(2));
        assert_eq!(first_star(&pool, "ABC"), None);
        assert_eq!(pool.retained(), 1);
    }

    #[test]
    fn test_retention_caps() {
        let pool = ScratchPool::new(1, 16);
        let a = pool.acquire(4);
        let b = pool.acquire(4);
        drop(a);
        drop(b);
        assert_eq!(pool.retained(), 1);

        let big = pool.acquire(1000);
        drop(pool.acquire(1));
        drop(big);
        assert_eq!(pool.retained(), 1);
    }
}
