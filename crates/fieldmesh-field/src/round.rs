//! One round of one device: the execution context algorithms run in.
//!
//! A round reads the device's previous state and one inbox snapshot,
//! computes, and produces the device's new state and export. Nothing it does
//! is visible to other devices until the export is handed back to the
//! delivery layer, so a round is atomic from the network's point of view.

use std::panic::Location;

use fieldmesh_topology::DeviceId;

use crate::{Export, Inbox, NeighborField, Real, RoundClock, RoundState, SiteKey, Time, Trace, Value};

/// Execution context of a single round.
pub struct Round<'a> {
    device: DeviceId,
    clock: RoundClock,
    state: &'a mut RoundState,
    inbox: &'a Inbox,
    export: Export,
    trace: Trace,
}

impl<'a> Round<'a> {
    /// Start a round of `device` over its persistent state and inbox.
    pub fn new(device: DeviceId, clock: RoundClock, state: &'a mut RoundState, inbox: &'a Inbox) -> Self {
        Self {
            device,
            clock,
            state,
            inbox,
            export: Export::new(),
            trace: Trace::new(),
        }
    }

    /// Identity of the executing device.
    pub fn uid(&self) -> DeviceId {
        self.device
    }

    /// Time of this round.
    pub fn current_time(&self) -> Time {
        self.clock.current()
    }

    /// Time of the previous round, `None` on the first one.
    pub fn previous_time(&self) -> Option<Time> {
        self.clock.previous()
    }

    /// Time elapsed since the previous round (1 on the first round).
    pub fn delta_time(&self) -> Time {
        self.clock.delta()
    }

    /// Run `f` in a nested scope named `label`.
    ///
    /// The scope is keyed by the caller's source location, so functions
    /// holding state should carry `#[track_caller]` to get one scope per
    /// call site of theirs rather than one shared by every caller.
    #[track_caller]
    pub fn call<R>(&mut self, label: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.trace.enter(label, Location::caller());
        let out = f(self);
        self.trace.exit();
        out
    }

    /// Like [`call`](Self::call), but state is separate per `discriminant`.
    ///
    /// Devices only see each other's exports when they ran the scope with
    /// the same discriminant, and switching to a new discriminant starts
    /// from default values.
    #[track_caller]
    pub fn call_keyed<R>(&mut self, label: &'static str, discriminant: u64, f: impl FnOnce(&mut Self) -> R) -> R {
        self.trace.enter_keyed(label, discriminant, Location::caller());
        let out = f(self);
        self.trace.exit();
        out
    }

    /// Carry a value from this device's previous round.
    ///
    /// Reads the slot for this site (`default` on the first visit), applies
    /// `update`, stores and returns the result.
    #[track_caller]
    pub fn retain<T: Value>(&mut self, label: &'static str, default: T, update: impl FnOnce(T) -> T) -> T {
        let site = self.trace.site(label, Location::caller());
        let previous = self.state.read(site).unwrap_or(default);
        let next = update(previous);
        self.state.write(site, next.clone());
        next
    }

    /// Export `value` for this site and observe what neighbors exported there.
    ///
    /// The self-entry of the returned field is `value`. Other entries come
    /// from the inbox and may be from older rounds of their senders; senders
    /// without a value for this site are absent.
    #[track_caller]
    pub fn neighbor<T: Value>(&mut self, label: &'static str, value: T) -> NeighborField<T> {
        let site = self.trace.site(label, Location::caller());
        self.export.insert(site, value.clone());
        self.gather(site, value)
    }

    /// Retain-and-exchange: the stabilizing update pattern in one step.
    ///
    /// The field passed to `f` holds this device's value from its previous
    /// round (`init` on the first) and every neighbor's latest export for
    /// this site. The result is stored, exported and returned.
    #[track_caller]
    pub fn share<T: Value>(&mut self, label: &'static str, init: T, f: impl FnOnce(NeighborField<T>) -> T) -> T {
        let site = self.trace.site(label, Location::caller());
        let previous = self.state.read(site).unwrap_or(init);
        let field = self.gather(site, previous);
        let next = f(field);
        self.state.write(site, next.clone());
        self.export.insert(site, next.clone());
        next
    }

    /// Physical distance to every neighbor in the inbox (0 for self).
    ///
    /// Neighbors whose distance the delivery layer did not report are absent.
    pub fn nbr_dist(&self) -> NeighborField<Real> {
        let mut field = NeighborField::new(self.device, 0.0);
        for id in self.inbox.senders() {
            if let Some(d) = self.inbox.distance(id) {
                field.insert(id, d);
            }
        }
        field
    }

    fn gather<T: Value>(&self, site: SiteKey, local: T) -> NeighborField<T> {
        let mut field = NeighborField::new(self.device, local);
        for (id, message) in self.inbox.messages() {
            if id == self.device {
                continue;
            }
            if let Some(value) = message.export.get::<T>(site) {
                field.insert(id, value.clone());
            }
        }
        field
    }

    /// Commit the round, returning the export to deliver.
    pub fn finish(self) -> Export {
        self.export
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;
    use std::sync::Arc;

    fn run<R>(
        id: u64,
        clock: RoundClock,
        state: &mut RoundState,
        inbox: &Inbox,
        f: impl FnOnce(&mut Round<'_>) -> R,
    ) -> (R, Export) {
        let mut round = Round::new(DeviceId(id), clock, state, inbox);
        let out = f(&mut round);
        (out, round.finish())
    }

    fn count(r: &mut Round<'_>) -> i32 {
        r.retain("n", 0, |x| x + 1)
    }

    #[test]
    fn retain_reads_previous_round() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();

        let (a, _) = run(1, RoundClock::first(0.0), &mut state, &inbox, count);
        let (b, _) = run(1, RoundClock::first(0.0).advance(1.0), &mut state, &inbox, count);
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn skipped_branch_keeps_later_slots_in_place() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();
        let mut clock = RoundClock::first(0.0);

        let mut out = Vec::new();
        for step in 0..4 {
            let (n, _) = run(1, clock, &mut state, &inbox, |r| {
                if step % 2 == 0 {
                    r.retain("n", 0, |x| x + 100);
                }
                r.retain("n", 0, |x| x + 1)
            });
            out.push(n);
            clock = clock.advance(step as f64 + 1.0);
        }
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn retain_sites_are_independent() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();
        fn program(r: &mut Round<'_>) -> (i32, i32) {
            let a = r.retain("n", 0, |x| x + 1);
            let b = r.retain("n", 100, |x| x + 10);
            (a, b)
        }

        run(1, RoundClock::first(0.0), &mut state, &inbox, program);
        let ((a, b), _) = run(1, RoundClock::first(0.0).advance(1.0), &mut state, &inbox, program);
        assert_eq!((a, b), (2, 120));
    }

    fn exchange(r: &mut Round<'_>) -> NeighborField<f64> {
        let own = if r.uid() == DeviceId(2) { 7.0 } else { 3.0 };
        r.neighbor("x", own)
    }

    #[test]
    fn neighbor_sees_exports_of_same_site() {
        // Device 2 exports at the site device 1 will query.
        let mut state2 = RoundState::new();
        let empty = Inbox::new();
        let (_, export) = run(2, RoundClock::first(0.0), &mut state2, &empty, exchange);

        let mut inbox = Inbox::new();
        inbox.deliver(DeviceId(2), Message::new(0.0, Arc::new(export)));

        let mut state1 = RoundState::new();
        let (field, export1) = run(1, RoundClock::first(0.5), &mut state1, &inbox, exchange);

        assert_eq!(*field.local(), 3.0);
        assert_eq!(field.get(DeviceId(2)), Some(&7.0));
        assert_eq!(export1.len(), 1);
    }

    #[test]
    fn neighbor_ignores_other_sites() {
        let mut state2 = RoundState::new();
        let empty = Inbox::new();
        let (_, export) = run(2, RoundClock::first(0.0), &mut state2, &empty, |r| r.neighbor("y", 7.0));

        let mut inbox = Inbox::new();
        inbox.deliver(DeviceId(2), Message::new(0.0, Arc::new(export)));

        let mut state1 = RoundState::new();
        let (field, _) = run(1, RoundClock::first(0.5), &mut state1, &inbox, |r| r.neighbor("x", 3.0));
        assert!(field.is_alone());
    }

    #[test]
    fn share_self_entry_is_previous_value() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();
        fn program(r: &mut Round<'_>) -> i32 {
            r.share("s", 10, |f| *f.local() + 1)
        }

        let (a, export) = run(1, RoundClock::first(0.0), &mut state, &inbox, program);
        let (b, _) = run(1, RoundClock::first(0.0).advance(1.0), &mut state, &inbox, program);
        assert_eq!((a, b), (11, 12));
        assert_eq!(export.len(), 1);
    }

    #[test]
    fn nested_scopes_do_not_collide() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();
        fn program(r: &mut Round<'_>) -> (i32, i32) {
            let a = r.call("f", |r| r.retain("n", 0, |x| x + 1));
            let b = r.call("g", |r| r.retain("n", 0, |x| x + 2));
            (a, b)
        }

        run(1, RoundClock::first(0.0), &mut state, &inbox, program);
        let ((a, b), _) = run(1, RoundClock::first(0.0).advance(1.0), &mut state, &inbox, program);
        assert_eq!((a, b), (2, 4));
    }

    #[test]
    fn keyed_scope_restarts_on_new_key() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();

        let mut counts = Vec::new();
        for (t, key) in [1, 1, 1, 2, 1].into_iter().enumerate() {
            let (n, _) = run(1, RoundClock::first(t as f64), &mut state, &inbox, |r| {
                r.call_keyed("k", key, count)
            });
            counts.push(n);
        }
        assert_eq!(counts, vec![1, 2, 3, 1, 4]);
    }

    #[test]
    fn branches_never_see_each_others_exports() {
        // Device 2 only runs the second site; device 1 runs both.
        fn program(r: &mut Round<'_>) -> Option<NeighborField<u64>> {
            let extra = (r.uid() == DeviceId(1)).then(|| r.neighbor("v", 10));
            let common = r.neighbor("v", 20);
            extra.map(|_| common)
        }

        let mut state2 = RoundState::new();
        let empty = Inbox::new();
        let (_, export) = run(2, RoundClock::first(0.0), &mut state2, &empty, program);

        let mut inbox = Inbox::new();
        inbox.deliver(DeviceId(2), Message::new(0.0, Arc::new(export)));
        let mut state1 = RoundState::new();
        let (common, _) = run(1, RoundClock::first(0.5), &mut state1, &inbox, program);
        assert_eq!(common.and_then(|f| f.get(DeviceId(2)).copied()), Some(20));
    }

    #[test]
    fn nbr_dist_reports_known_distances() {
        let mut inbox = Inbox::new();
        inbox.deliver(DeviceId(2), Message::new(0.0, Arc::new(Export::new())));
        inbox.deliver(DeviceId(3), Message::new(0.0, Arc::new(Export::new())));
        inbox.set_distance(DeviceId(2), 4.5);

        let mut state = RoundState::new();
        let (dist, _) = run(1, RoundClock::first(0.0), &mut state, &inbox, |r| r.nbr_dist());
        assert_eq!(*dist.local(), 0.0);
        assert_eq!(dist.get(DeviceId(2)), Some(&4.5));
        assert_eq!(dist.get(DeviceId(3)), None);
    }

    #[test]
    fn clock_accessors() {
        let mut state = RoundState::new();
        let inbox = Inbox::new();
        let clock = RoundClock::first(2.0).advance(2.5);
        let ((now, prev, dt), _) = run(1, clock, &mut state, &inbox, |r| {
            (r.current_time(), r.previous_time(), r.delta_time())
        });
        assert_eq!((now, prev, dt), (2.5, Some(2.0), 0.5));
    }
}
