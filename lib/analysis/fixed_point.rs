//! A generic worklist driver for forward fixed-point analyses.
//!
//! Locations are dense indices (`0..locations`). An analysis describes how
//! the state at one location flows to its successors, and how two states
//! arriving at the same location are joined. The driver keeps one state per
//! location and revisits a location whenever its state grows, until no state
//! changes.

use crate::Error;
use std::collections::VecDeque;
use std::fmt::Debug;

pub trait FixedPointAnalysis<State: Clone + Debug + PartialEq> {
    /// Given the input state for a location, create the states which flow to
    /// its successors, tagged with the successor location.
    ///
    /// `states` holds the current input state of every location.
    fn trans(
        &self,
        location: usize,
        state: &State,
        states: &[Option<State>],
    ) -> Result<Vec<(usize, State)>, Error>;

    /// Given two states arriving at `location`, join them into one state.
    fn join(&self, location: usize, state0: State, state1: &State) -> Result<State, Error>;
}

/// Run `analysis` forward from `entry` until every state is stable.
///
/// Returns the input state of every location, `None` for locations which
/// were never reached.
pub fn fixed_point_forward<Analysis, State>(
    analysis: &Analysis,
    locations: usize,
    entry: usize,
    initial: State,
) -> Result<Vec<Option<State>>, Error>
where
    Analysis: FixedPointAnalysis<State>,
    State: Clone + Debug + PartialEq,
{
    if entry >= locations {
        return Err(Error::InvalidJumpTarget(entry));
    }

    let mut states: Vec<Option<State>> = vec![None; locations];
    let mut queued = vec![false; locations];
    let mut queue: VecDeque<usize> = VecDeque::new();

    states[entry] = Some(initial);
    queued[entry] = true;
    queue.push_back(entry);

    let mut iterations = 0;
    while let Some(location) = queue.pop_front() {
        queued[location] = false;
        iterations += 1;
        trace!("visiting location {}", location);

        let state = match states[location] {
            Some(ref state) => state.clone(),
            None => {
                return Err(Error::Analysis(format!(
                    "location {} was queued without a state",
                    location
                )))
            }
        };

        for (successor, out_state) in analysis.trans(location, &state, &states)? {
            if successor >= locations {
                return Err(Error::InvalidJumpTarget(successor));
            }

            let changed = match states[successor] {
                Some(ref in_state) => {
                    let joined = analysis.join(successor, in_state.clone(), &out_state)?;
                    if joined == *in_state {
                        None
                    } else {
                        Some(joined)
                    }
                }
                None => Some(out_state),
            };

            if let Some(new_state) = changed {
                states[successor] = Some(new_state);
                if !queued[successor] {
                    queued[successor] = true;
                    queue.push_back(successor);
                }
            }
        }
    }

    debug!(
        "fixed point reached after {} iterations over {} locations",
        iterations, locations
    );

    Ok(states)
}
