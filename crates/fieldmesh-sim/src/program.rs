//! Programs the simulator runs on every device.

use fieldmesh_field::Round;

use crate::Storage;

/// The aggregate program run by every device, one round at a time.
///
/// Results meant for observation go into the device's display [`Storage`].
pub trait Program {
    fn round(&mut self, round: &mut Round<'_>, storage: &mut Storage);
}

impl<F> Program for F
where
    F: FnMut(&mut Round<'_>, &mut Storage),
{
    fn round(&mut self, round: &mut Round<'_>, storage: &mut Storage) {
        self(round, storage)
    }
}
