use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Allows assigning a unique id to every node. Ids are never reused within a process.
pub fn next_id() -> u32 {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    assert!(id != u32::MAX, "Ran out of unique ids!");
    id
}

/// An out stream allows us to push values to it, but not pull. Basically a safer way of passing around a mut& Vec while
/// maintaining that we only ever push to it.
///
/// The transformation engine hands one of these (wrapping the caller's issue list) to every constructor.
pub struct OutStream<'a, T> {
    buffer: &'a mut Vec<T>,
}

impl<'a, T> OutStream<'a, T> {
    pub fn new(buffer: &'a mut Vec<T>) -> OutStream<'a, T> {
        OutStream { buffer }
    }

    pub fn push(&mut self, t: T) {
        self.buffer.push(t);
    }

    /// How many values have been pushed so far, including any that were in the buffer to begin with.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }
}
