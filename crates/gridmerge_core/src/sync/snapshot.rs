//! Single-writer, multi-reader snapshot cell.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Holds the latest published value of `T`.
///
/// The write lock is held only for the pointer swap, never while a value
/// is being built. Each publish bumps the generation counter.
pub struct SnapshotCell<T> {
    current: RwLock<Arc<T>>,
    generation: AtomicU64,
}

impl<T> SnapshotCell<T> {
    /// Creates a cell holding `initial` at generation 0.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces the published value. Returns the new generation.
    pub fn publish(&self, value: T) -> u64 {
        self.publish_arc(Arc::new(value))
    }

    /// Replaces the published value with an existing `Arc`.
    pub fn publish_arc(&self, value: Arc<T>) -> u64 {
        let previous = {
            let mut current = self.current.write();
            std::mem::replace(&mut *current, value)
        };
        // Drop the old value outside the lock
        drop(previous);
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Latest published value.
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        Arc::clone(&self.current.read())
    }

    /// Number of publishes so far.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Creates a reader that tracks which generation it has seen.
    #[must_use]
    pub fn reader(self: &Arc<Self>) -> SnapshotReader<T> {
        SnapshotReader {
            cell: Arc::clone(self),
            seen: self.generation(),
        }
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Reading side of a shared `SnapshotCell`.
pub struct SnapshotReader<T> {
    cell: Arc<SnapshotCell<T>>,
    seen: u64,
}

impl<T> SnapshotReader<T> {
    /// Latest value, marking it as seen.
    #[must_use]
    pub fn latest(&mut self) -> Arc<T> {
        self.seen = self.cell.generation();
        self.cell.load()
    }

    /// True if something was published since the last `latest`.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.cell.generation() != self.seen
    }
}

impl<T> Clone for SnapshotReader<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            seen: self.seen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_publish_bumps_generation() {
        let cell = SnapshotCell::new(1_u32);
        assert_eq!(cell.generation(), 0);
        assert_eq!(cell.publish(2), 1);
        assert_eq!(cell.publish(3), 2);
        assert_eq!(*cell.load(), 3);
    }

    #[test]
    fn test_old_snapshot_survives_publish() {
        let cell = SnapshotCell::new(vec![1, 2, 3]);
        let held = cell.load();
        cell.publish(vec![4]);
        assert_eq!(*held, vec![1, 2, 3]);
        assert_eq!(*cell.load(), vec![4]);
    }

    #[test]
    fn test_reader_change_tracking() {
        let cell = Arc::new(SnapshotCell::new(0_u64));
        let mut reader = cell.reader();
        assert!(!reader.changed());

        cell.publish(7);
        assert!(reader.changed());
        assert_eq!(*reader.latest(), 7);
        assert!(!reader.changed());
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let cell = Arc::new(SnapshotCell::new([0_u32; 15]));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        let snap = cell.load();
                        assert!(snap.iter().all(|v| *v == snap[0]), "torn snapshot");
                    }
                })
            })
            .collect();

        for i in 1..=500 {
            cell.publish([i; 15]);
        }
        for handle in readers {
            handle.join().unwrap();
        }
        assert_eq!(cell.generation(), 500);
    }
}
