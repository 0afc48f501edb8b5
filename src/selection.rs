//! Random cue selection.
//!
//! The random source is always passed in by the caller. [`Renderer`]
//! owns one per instance, seeded from the clock unless a seed is supplied,
//! and tests can substitute any [`rand::RngCore`] implementation.
//!
//! [`Renderer`]: crate::Renderer

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::StillframeError;
use crate::subtitle::Cue;

/// Pick one cue uniformly at random from `cues`.
///
/// # Errors
///
/// Returns [`StillframeError::InvalidInput`] if `cues` is empty.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use stillframe::{Cue, select_cue};
///
/// let cues = vec![Cue {
///     start_time: Duration::from_secs(1),
///     end_time: Duration::from_secs(2),
///     text: "Hello".to_string(),
///     index: 0,
/// }];
/// let mut rng = StdRng::seed_from_u64(7);
/// assert_eq!(select_cue(&cues, &mut rng)?.text, "Hello");
/// # Ok::<(), stillframe::StillframeError>(())
/// ```
pub fn select_cue<'a, R>(cues: &'a [Cue], rng: &mut R) -> Result<&'a Cue, StillframeError>
where
    R: Rng + ?Sized,
{
    if cues.is_empty() {
        return Err(StillframeError::InvalidInput(
            "subtitle track contains no cues".to_string(),
        ));
    }

    let index = rng.random_range(0..cues.len());
    log::debug!("Selected cue {} of {}", index + 1, cues.len());
    Ok(&cues[index])
}

/// A [`StdRng`] seeded from the current time in nanoseconds.
pub fn clock_seeded_rng() -> StdRng {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default();
    StdRng::seed_from_u64(nanos)
}
