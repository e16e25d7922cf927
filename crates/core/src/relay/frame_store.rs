use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::shared::frame::Frame;

/// A consistent view of the store: the frame and the face count detected in it.
#[derive(Clone, Debug, Default)]
pub struct FrameSnapshot {
    pub frame: Option<Arc<Frame>>,
    pub face_count: usize,
}

/// The single shared slot holding the most recent processed frame.
///
/// The frame and its face count live under one mutex and are replaced
/// together. Readiness is level-triggered: once the first write lands,
/// every current and future [`wait_ready`](Self::wait_ready) passes.
/// It reads as "has ever been written", not "has new data".
pub struct FrameStore {
    current: Mutex<FrameSnapshot>,
    ready: watch::Sender<bool>,
}

impl FrameStore {
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            current: Mutex::new(FrameSnapshot::default()),
            ready,
        }
    }

    /// Replaces the frame and count as one unit, then opens the readiness gate.
    pub fn write(&self, frame: Frame, face_count: usize) {
        self.write_shared(Arc::new(frame), face_count);
    }

    /// Same as [`write`](Self::write) for a frame the caller keeps a handle to.
    pub fn write_shared(&self, frame: Arc<Frame>, face_count: usize) {
        let next = FrameSnapshot {
            frame: Some(frame),
            face_count,
        };
        // Swap under the lock, drop the previous frame after releasing it.
        let previous = std::mem::replace(&mut *self.lock(), next);
        drop(previous);
        self.ready.send_replace(true);
    }

    /// Returns the current pair; the frame is shared, not copied.
    pub fn snapshot(&self) -> FrameSnapshot {
        self.lock().clone()
    }

    pub fn face_count(&self) -> usize {
        self.lock().face_count
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolves once the store has been written at least once.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    // The snapshot is only ever assigned whole, so a poisoned lock still
    // guards a consistent pair.
    fn lock(&self) -> MutexGuard<'_, FrameSnapshot> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn frame_of(value: u8) -> Frame {
        Frame::filled(4, 4, [value, value, value])
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = FrameStore::new();
        let snap = store.snapshot();
        assert!(snap.frame.is_none());
        assert_eq!(snap.face_count, 0);
        assert_eq!(store.face_count(), 0);
        assert!(!store.is_ready());
    }

    #[test]
    fn test_write_replaces_frame_and_count_together() {
        let store = FrameStore::new();
        store.write(frame_of(1), 3);
        store.write(frame_of(2), 1);

        let snap = store.snapshot();
        assert_eq!(snap.frame.unwrap().pixel(0, 0), [2, 2, 2]);
        assert_eq!(snap.face_count, 1);
        assert!(store.is_ready());
    }

    #[test]
    fn test_snapshot_shares_frame_with_store() {
        let store = FrameStore::new();
        store.write(frame_of(7), 0);
        let a = store.snapshot().frame.unwrap();
        let b = store.snapshot().frame.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_held_snapshot_survives_later_write() {
        let store = FrameStore::new();
        store.write(frame_of(1), 1);
        let held = store.snapshot();
        store.write(frame_of(2), 2);
        assert_eq!(held.frame.unwrap().pixel(0, 0), [1, 1, 1]);
        assert_eq!(held.face_count, 1);
    }

    #[tokio::test]
    async fn test_wait_ready_blocks_until_first_write() {
        let store = FrameStore::new();
        let waited = tokio::time::timeout(Duration::from_millis(50), store.wait_ready()).await;
        assert!(waited.is_err(), "wait_ready passed before any write");

        store.write(frame_of(1), 0);
        tokio::time::timeout(Duration::from_millis(500), store.wait_ready())
            .await
            .expect("wait_ready did not pass after write");
    }

    #[tokio::test]
    async fn test_late_waiter_passes_immediately() {
        let store = FrameStore::new();
        store.write(frame_of(1), 0);
        store.write(frame_of(2), 0);
        for _ in 0..3 {
            tokio::time::timeout(Duration::from_millis(50), store.wait_ready())
                .await
                .expect("readiness must stay set");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_one_write_wakes_every_waiter() {
        let store = Arc::new(FrameStore::new());
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.wait_ready().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        store.write(frame_of(1), 0);

        for waiter in waiters {
            tokio::time::timeout(Duration::from_millis(500), waiter)
                .await
                .expect("waiter not woken")
                .unwrap();
        }
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_pair() {
        // Each write pairs a frame filled with `n` with count `n`.
        let store = Arc::new(FrameStore::new());
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for i in 0..200u32 {
                        let n = ((w * 50 + i) % 250) as u8;
                        store.write(frame_of(n), n as usize);
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = store.snapshot();
                        if let Some(frame) = snap.frame {
                            assert_eq!(frame.pixel(3, 3)[0] as usize, snap.face_count);
                        }
                    }
                })
            })
            .collect();
        for handle in writers.into_iter().chain(readers) {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let store = Arc::new(FrameStore::new());
        store.write(frame_of(5), 5);
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.current.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert_eq!(store.face_count(), 5);
        store.write(frame_of(6), 6);
        assert_eq!(store.snapshot().face_count, 6);
    }
}
