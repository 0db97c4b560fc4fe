use crate::engine::Engine;
use crate::enumerate::blocking::{Enumerator, StopReason};
use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedCount {
    pub count: usize,
    pub hit_cap: bool,
    /// Set when the enumeration ended before the cap.
    pub stop: Option<StopReason>,
}

impl BoundedCount {
    /// True when `count` is the exact number of models.
    pub fn is_exact(&self) -> bool {
        !self.hit_cap && self.stop == Some(StopReason::Unsatisfiable)
    }
}

/// Counts models, stopping once more than `cap` have been seen.
pub fn count_models_bounded<E: Engine>(
    enumerator: &mut Enumerator<E>,
    cap: usize,
) -> Result<BoundedCount, SessionError> {
    let mut count = 0usize;

    loop {
        match enumerator.next() {
            None => {
                return Ok(BoundedCount {
                    count,
                    hit_cap: false,
                    stop: enumerator.stop_reason(),
                });
            }
            Some(Err(err)) => return Err(err),
            Some(Ok(_)) => {}
        }

        count += 1;
        if count > cap {
            return Ok(BoundedCount {
                count,
                hit_cap: true,
                stop: None,
            });
        }
    }
}
