//! Call-site identification.
//!
//! Every stateful operation needs a key that is the same in every round that
//! reaches the same program position, and the same on every device running
//! the same program. Keys are derived from the static call path: each scope
//! hashes its parent key with a label and the source location of the call
//! (propagated through `#[track_caller]`). Which branches ran earlier in the
//! round has no effect on a key.
//!
//! Repeated visits of one location within one scope, as in a loop, are told
//! apart by their visit order.

use std::collections::HashMap;
use std::panic::Location;

/// Stable identifier of a program position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteKey(pub u64);

impl SiteKey {
    /// Key of the program root.
    pub const ROOT: Self = Self(0);

    /// Key of the `occurrence`-th visit of `label` at `location` under this key.
    pub fn child(self, label: &str, discriminant: u64, location: &Location<'_>, occurrence: u32) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.0.to_le_bytes());
        hasher.update(label.as_bytes());
        hasher.update(b":");
        hasher.update(&discriminant.to_le_bytes());
        hasher.update(location.file().as_bytes());
        hasher.update(&location.line().to_le_bytes());
        hasher.update(&location.column().to_le_bytes());
        hasher.update(&occurrence.to_le_bytes());
        let hash = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_be_bytes(prefix))
    }

    /// Hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_be_bytes())
    }
}

impl std::fmt::Display for SiteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

type Visit = (&'static str, u64, &'static Location<'static>);

#[derive(Debug)]
struct Frame {
    key: SiteKey,
    seen: HashMap<Visit, u32>,
}

impl Frame {
    fn new(key: SiteKey) -> Self {
        Self {
            key,
            seen: HashMap::new(),
        }
    }

    fn site(&mut self, label: &'static str, discriminant: u64, location: &'static Location<'static>) -> SiteKey {
        let count = self.seen.entry((label, discriminant, location)).or_insert(0);
        let occurrence = *count;
        *count += 1;
        self.key.child(label, discriminant, location, occurrence)
    }
}

/// The call stack of the current round.
#[derive(Debug)]
pub struct Trace {
    root: Frame,
    stack: Vec<Frame>,
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

impl Trace {
    /// Fresh trace positioned at the program root.
    pub fn new() -> Self {
        Self {
            root: Frame::new(SiteKey::ROOT),
            stack: Vec::new(),
        }
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    /// Key for a primitive called with `label` at `location` in the current scope.
    pub fn site(&mut self, label: &'static str, location: &'static Location<'static>) -> SiteKey {
        self.top_mut().site(label, 0, location)
    }

    /// Open a nested scope for `label` entered from `location`.
    pub fn enter(&mut self, label: &'static str, location: &'static Location<'static>) -> SiteKey {
        self.enter_keyed(label, 0, location)
    }

    /// Open a nested scope for `label` distinguished by `discriminant`.
    ///
    /// Scopes with different discriminants never share state, which is how a
    /// computation restarts from scratch when its discriminant changes.
    pub fn enter_keyed(
        &mut self,
        label: &'static str,
        discriminant: u64,
        location: &'static Location<'static>,
    ) -> SiteKey {
        let key = self.top_mut().site(label, discriminant, location);
        self.stack.push(Frame::new(key));
        key
    }

    /// Close the innermost scope. The root scope is never closed.
    pub fn exit(&mut self) {
        self.stack.pop();
    }

    /// Number of open nested scopes.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn here() -> &'static Location<'static> {
        Location::caller()
    }

    #[test]
    fn same_path_same_key() {
        let at = here();
        let mut a = Trace::new();
        let mut b = Trace::new();
        a.enter("dist", at);
        b.enter("dist", at);
        assert_eq!(a.site("share", at), b.site("share", at));
    }

    #[test]
    fn repeated_visit_gets_new_key() {
        let at = here();
        let mut trace = Trace::new();
        let first = trace.site("integrate", at);
        let second = trace.site("integrate", at);
        assert_ne!(first, second);
    }

    #[test]
    fn location_separates_same_label() {
        let mut trace = Trace::new();
        let first = trace.site("integrate", here());
        let second = trace.site("integrate", here());
        assert_ne!(first, second);
    }

    #[test]
    fn skipped_site_does_not_shift_later_ones() {
        let (skipped, kept) = (here(), here());

        let mut all = Trace::new();
        all.site("accumulate", skipped);
        let after_both = all.site("accumulate", kept);

        let mut only = Trace::new();
        assert_eq!(only.site("accumulate", kept), after_both);
    }

    #[test]
    fn nesting_changes_key() {
        let at = here();
        let mut trace = Trace::new();
        let top = trace.site("x", at);

        let mut nested = Trace::new();
        nested.enter("scope", at);
        assert_ne!(nested.site("x", at), top);
    }

    #[test]
    fn exit_restores_parent_counters() {
        let at = here();
        let mut a = Trace::new();
        a.enter("f", at);
        a.site("x", at);
        a.exit();
        let after = a.site("y", at);

        let mut b = Trace::new();
        b.enter("f", at);
        b.exit();
        assert_eq!(b.site("y", at), after);
    }

    #[test]
    fn discriminant_separates_scopes() {
        let at = here();
        let mut a = Trace::new();
        let mut b = Trace::new();
        assert_ne!(a.enter_keyed("leader", 1, at), b.enter_keyed("leader", 2, at));
    }

    #[test]
    fn root_never_popped() {
        let mut trace = Trace::new();
        trace.exit();
        trace.exit();
        assert_eq!(trace.depth(), 0);
        let _ = trace.site("still-works", here());
    }

    #[test]
    fn hex_is_sixteen_chars() {
        assert_eq!(SiteKey::ROOT.to_hex(), "0000000000000000");
        assert_eq!(SiteKey::ROOT.child("a", 0, here(), 0).to_string().len(), 16);
    }
}
