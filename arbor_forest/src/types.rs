// Copyright 2025 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Identity types for the document forest.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Persistent node identity: a decimal-integer-valued string.
///
/// Uids name nodes in the persisted document and in overlay edges, and they
/// survive save/load. They are allocated from a monotonically increasing
/// counter that is always kept above every numeric uid currently in use.
/// In-memory identity is the generational [`NodeId`] handle instead; uids are
/// never compared to decide ownership questions.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Create a uid from a counter value.
    pub fn from_counter(n: u64) -> Self {
        Self(n.to_string())
    }

    /// The uid as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The decimal value of this uid, if it has one.
    ///
    /// Hand-edited documents may carry non-numeric ids; those are preserved
    /// verbatim and simply do not advance the allocation counter.
    pub fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl From<&str> for Uid {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Uid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for a node in the forest (generational).
///
/// Handles are cheap to copy and detectably stale: once a node is removed,
/// every accessor taking its old handle returns `None` (or a no-op), even if
/// the slot is later reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_numeric_parses_decimal_strings() {
        assert_eq!(Uid::from("17").numeric(), Some(17));
        assert_eq!(Uid::from_counter(3).numeric(), Some(3));
        assert_eq!(Uid::from("banana").numeric(), None);
    }

    #[test]
    fn uid_display_is_verbatim() {
        assert_eq!(Uid::from("42").to_string(), "42");
    }
}
