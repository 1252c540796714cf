//! One-rep-max estimation (linear Epley-style model)

/// Load gained per additional rep relative to the set weight
pub const LOAD_PER_REP: f64 = 0.0333;

const TARGET_REPS_E10RM: u32 = 10;

/// Estimated one-rep max. `None` unless weight > 0 and reps >= 1.
pub fn estimate_e1rm(weight: f64, reps: u32) -> Option<f64> {
    if !(weight > 0.0) || reps < 1 {
        return None;
    }
    Some(weight * (1.0 + LOAD_PER_REP * f64::from(reps)))
}

/// Estimated ten-rep max: the E1RM projected back down to a 10-rep set
/// with the same per-rep coefficient.
pub fn estimate_e10rm(weight: f64, reps: u32) -> Option<f64> {
    let e1rm = estimate_e1rm(weight, reps)?;
    Some(e1rm / (1.0 + LOAD_PER_REP * f64::from(TARGET_REPS_E10RM)))
}
