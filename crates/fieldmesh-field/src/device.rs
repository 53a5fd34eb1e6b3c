//! A device: identity, persistent round state and its round sequence.

use fieldmesh_topology::DeviceId;
use tracing::trace;

use crate::{Export, Inbox, Round, RoundClock, RoundState, Time};

/// One participant running the aggregate program round after round.
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    state: RoundState,
    clock: Option<RoundClock>,
    rounds: u64,
}

impl Device {
    /// A device that has not run any round yet.
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            state: RoundState::new(),
            clock: None,
            rounds: 0,
        }
    }

    /// Identity.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Number of completed rounds.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// Time of the last completed round.
    pub fn last_round_time(&self) -> Option<Time> {
        self.clock.map(|c| c.current())
    }

    /// Persistent state.
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Execute one round at `time` against `inbox`.
    ///
    /// Returns the program output and the export to deliver to neighbors.
    pub fn run<R>(&mut self, time: Time, inbox: &Inbox, program: impl FnOnce(&mut Round<'_>) -> R) -> (R, Export) {
        let clock = match self.clock {
            Some(clock) => clock.advance(time),
            None => RoundClock::first(time),
        };

        let mut round = Round::new(self.id, clock, &mut self.state, inbox);
        let output = program(&mut round);
        let export = round.finish();

        self.clock = Some(clock);
        self.rounds += 1;
        trace!(device = %self.id, time = clock.current(), neighbors = inbox.len(), sites = export.len(), "round committed");

        (output, export)
    }
}
