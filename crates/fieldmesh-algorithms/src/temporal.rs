//! State-dependent building blocks: filtering, integration, accumulation.
//!
//! None of these look at neighbors. Each keeps O(1) state in one retained
//! slot.

use fieldmesh_field::{Real, Round};

/// Low-pass filter: `next = (previous + v) / 2`.
///
/// The first round starts from `v` itself, so a constant input is passed
/// through unchanged.
#[track_caller]
pub fn lowpass(round: &mut Round<'_>, v: Real) -> Real {
    round.call("lowpass", |r| r.retain("filtered", v, |x| (x + v) / 2.0))
}

/// Time integral of `v`: `next = previous + v * dt`.
///
/// `dt` is the time since the previous round, 1 on the first round.
#[track_caller]
pub fn integrate(round: &mut Round<'_>, v: Real) -> Real {
    round.call("integrate", |r| {
        let dt = r.delta_time();
        r.retain("integral", 0.0, |x| x + v * dt)
    })
}

/// Running sum of `v` over rounds.
#[track_caller]
pub fn accumulate(round: &mut Round<'_>, v: Real) -> Real {
    round.call("accumulate", |r| r.retain("sum", 0.0, |x| x + v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmesh_field::{DeviceId, Lockstep};
    use fieldmesh_topology::LinkGraph;
    use proptest::prelude::*;

    fn single() -> Lockstep {
        let mut graph = LinkGraph::new();
        graph.add_device(DeviceId(1));
        Lockstep::new(graph)
    }

    fn trace(net: &mut Lockstep, steps: usize, mut f: impl FnMut(&mut Round<'_>) -> Real) -> Vec<Real> {
        (0..steps)
            .map(|_| net.step(&mut f)[&DeviceId(1)])
            .collect()
    }

    #[test]
    fn lowpass_passes_constant_through() {
        let mut net = single();
        let out = trace(&mut net, 4, |r| lowpass(r, 3.0));
        assert_eq!(out, vec![3.0; 4]);
    }

    #[test]
    fn lowpass_converges_monotonically() {
        let mut net = single();
        let out = trace(&mut net, 12, |r| {
            let input = if r.current_time() < 1.0 { 0.0 } else { 8.0 };
            lowpass(r, input)
        });

        assert_eq!(&out[..4], &[0.0, 4.0, 6.0, 7.0]);
        for pair in out.windows(2) {
            assert!(pair[1] >= pair[0]);
            assert!(pair[1] <= 8.0);
        }
        assert!((8.0 - out[11]).abs() < 0.01);
    }

    #[test]
    fn integrate_uses_elapsed_time() {
        let mut net = single().with_period(0.5);
        let out = trace(&mut net, 3, |r| integrate(r, 2.0));
        // First round counts as one unit of time.
        assert_eq!(out, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn accumulate_ignores_time() {
        let mut net = single().with_period(0.5);
        let out = trace(&mut net, 3, |r| accumulate(r, 2.0));
        assert_eq!(out, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn repeated_calls_keep_separate_state() {
        let mut net = single();
        let out = trace(&mut net, 3, |r| {
            let a = integrate(r, 1.0);
            let b = integrate(r, 10.0);
            b - a
        });
        assert_eq!(out, vec![9.0, 18.0, 27.0]);
    }

    #[test]
    fn skipped_call_leaves_later_state_alone() {
        let mut net = single();
        let out = trace(&mut net, 4, |r| {
            if r.current_time() % 2.0 == 0.0 {
                accumulate(r, 100.0);
            }
            accumulate(r, 1.0)
        });
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);
    }

    proptest! {
        #[test]
        fn lowpass_approaches_any_constant(start in -1e3f64..1e3, target in -1e3f64..1e3) {
            let mut net = single();
            let out = trace(&mut net, 30, |r| {
                let input = if r.current_time() < 1.0 { start } else { target };
                lowpass(r, input)
            });

            for pair in out.windows(2) {
                prop_assert!((target - pair[1]).abs() <= (target - pair[0]).abs());
            }
            prop_assert!((target - out[29]).abs() < 1e-3);
        }
    }
}
