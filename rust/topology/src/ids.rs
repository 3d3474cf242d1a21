// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element id allocation.
//!
//! Every entity receives a negative integer id at construction time. Negative
//! ids mark elements that have not yet been assigned a permanent identity by
//! a downstream editor or import pipeline, and the strictly decreasing stream
//! makes creation order recoverable from the ids alone.

/// Issues unique element ids, starting at −1 and counting down.
///
/// Ids are assigned exactly once per entity and never reused within a
/// conversion run. Exhausting the i64 range is an unchecked precondition:
/// practical graphs stay many orders of magnitude away from it.
#[derive(Debug)]
pub struct IdAllocator {
    next: i64,
}

impl IdAllocator {
    /// Creates an allocator whose first issued id is −1.
    pub fn new() -> Self {
        Self { next: -1 }
    }

    /// Returns the next id in the strictly decreasing stream.
    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
