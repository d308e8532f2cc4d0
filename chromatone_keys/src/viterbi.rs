// Log-domain Viterbi decoder over the 24 key states.
//
// omega[0][j]   = ln init[j] + ln b(j, obs[0])
// omega[t][j]   = max_i (omega[t-1][i] + ln a(i, j)) + ln b(j, obs[t])
// back[t][j]    = argmax_i of the same
//
// The path is recovered by backtracking from the best final state. Ties in
// any argmax resolve to the lowest state index, so decoding is deterministic.
// Working in logs keeps long sequences (hundreds of bars) far away from
// underflow: each step adds bounded negative terms.

use chromatone_theory::PitchClassSet;

use crate::key::NUM_STATES;
use crate::model::{EmissionModel, TransitionModel};

/// Uniform log initial distribution.
pub fn uniform_log_initial() -> [f64; NUM_STATES] {
    [-(NUM_STATES as f64).ln(); NUM_STATES]
}

/// Index and value of the maximum, first index on ties.
fn argmax(values: &[f64; NUM_STATES]) -> (usize, f64) {
    let mut best = 0;
    let mut best_value = values[0];
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    (best, best_value)
}

/// Most likely state sequence for `observations`. Empty input yields an
/// empty path.
pub fn viterbi(
    observations: &[PitchClassSet],
    log_initial: &[f64; NUM_STATES],
    transition: &TransitionModel,
    emission: &EmissionModel,
) -> Vec<usize> {
    let Some((&first, rest)) = observations.split_first() else {
        return Vec::new();
    };

    let first_emission = emission.log_emission_column(first);
    let mut omega: [f64; NUM_STATES] = std::array::from_fn(|j| log_initial[j] + first_emission[j]);
    let mut back: Vec<[usize; NUM_STATES]> = Vec::with_capacity(rest.len());

    for &obs in rest {
        let log_b = emission.log_emission_column(obs);
        let mut next = [0.0; NUM_STATES];
        let mut pointers = [0; NUM_STATES];
        for (j, (slot, pointer)) in next.iter_mut().zip(pointers.iter_mut()).enumerate() {
            let log_a = transition.log_transition_column(j);
            let scores: [f64; NUM_STATES] = std::array::from_fn(|i| omega[i] + log_a[i]);
            let (best, value) = argmax(&scores);
            *pointer = best;
            *slot = value + log_b[j];
        }
        omega = next;
        back.push(pointers);
    }

    let (mut state, best_log) = argmax(&omega);
    log::debug!(
        "viterbi: {} bars, best final log-probability {best_log:.3}",
        observations.len()
    );

    let mut path = vec![0; observations.len()];
    path[observations.len() - 1] = state;
    for (t, pointers) in back.iter().enumerate().rev() {
        state = pointers[state];
        path[t] = state;
    }
    path
}

/// Log-probability of `path` emitting `observations`, for checking decodes.
pub fn path_log_probability(
    path: &[usize],
    observations: &[PitchClassSet],
    log_initial: &[f64; NUM_STATES],
    transition: &TransitionModel,
    emission: &EmissionModel,
) -> f64 {
    let mut total = 0.0;
    for (t, (&state, &obs)) in path.iter().zip(observations).enumerate() {
        total += if t == 0 {
            log_initial[state]
        } else {
            transition.log_transition(path[t - 1], state)
        };
        total += emission.log_emission(state, obs);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> (TransitionModel, EmissionModel) {
        (TransitionModel::new(0.8), EmissionModel::default())
    }

    /// Exhaustive search over all paths, for tiny inputs.
    fn brute_force(obs: &[PitchClassSet], t: &TransitionModel, e: &EmissionModel) -> f64 {
        let init = uniform_log_initial();
        let mut best = f64::NEG_INFINITY;
        let mut path = vec![0; obs.len()];
        let total = NUM_STATES.pow(obs.len() as u32);
        for mut code in 0..total {
            for slot in path.iter_mut() {
                *slot = code % NUM_STATES;
                code /= NUM_STATES;
            }
            best = best.max(path_log_probability(&path, obs, &init, t, e));
        }
        best
    }

    #[test]
    fn test_empty_input() {
        let (t, e) = models();
        assert!(viterbi(&[], &uniform_log_initial(), &t, &e).is_empty());
    }

    #[test]
    fn test_matches_brute_force_on_short_sequences() {
        let (t, e) = models();
        let init = uniform_log_initial();
        let cases: [&[PitchClassSet]; 3] = [
            &[0b0000_1001_0001, 0b0010_0001_0001],
            &[0b0000_1001_0001, 0, 0b1000_1010_0100],
            &[0b0100_1001_0010, 0b0000_1001_0001, 0b1010_1011_0101],
        ];
        for obs in cases {
            let path = viterbi(obs, &init, &t, &e);
            let decoded = path_log_probability(&path, obs, &init, &t, &e);
            let optimum = brute_force(obs, &t, &e);
            assert!((decoded - optimum).abs() < 1e-9, "{decoded} vs {optimum}");
        }
    }

    #[test]
    fn test_argmax_first_on_ties() {
        let mut values = [0.0; NUM_STATES];
        values[3] = 1.0;
        values[9] = 1.0;
        assert_eq!(argmax(&values), (3, 1.0));
    }
}
