use std::sync::atomic::{AtomicUsize, Ordering};

// Single static counter shared by pages and drawables
static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::SeqCst)
}
