use crate::rate_history::RateEpoch;
use crate::ContractError;

/// Basis-point denominator: a rate of 10 000 pays 100 % of principal per
/// full lock window.
pub const BPS_DENOMINATOR: i128 = 10_000;

// ── Inputs ──────────────────────────────────────────────────────────────────

/// Read access to the rate history by ordinal.
pub trait EpochSource {
    fn epoch(&self, ordinal: u32) -> Option<RateEpoch>;
}

impl EpochSource for [RateEpoch] {
    fn epoch(&self, ordinal: u32) -> Option<RateEpoch> {
        self.get(ordinal as usize).copied()
    }
}

/// The part of a deposit the engine needs: what is locked, the lock window,
/// and the epoch that was current when the window opened.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AccrualWindow {
    pub principal: i128,
    pub started_at: u64,
    pub matures_at: u64,
    pub rate_epoch_at_start: u32,
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// Reward earned by `principal` over `elapsed` seconds at `rate_bps`, where
/// the rate is quoted per `span` seconds (the deposit's full lock window):
///
/// ```text
/// reward = principal × rate_bps × elapsed / (span × 10 000)
/// ```
///
/// Division truncates, so fractional reward is always left in the pool.
pub fn segment_reward(
    principal: i128,
    rate_bps: u32,
    elapsed: u64,
    span: u64,
) -> Result<i128, ContractError> {
    let numerator = principal
        .checked_mul(i128::from(rate_bps))
        .and_then(|x| x.checked_mul(i128::from(elapsed)))
        .ok_or(ContractError::ArithmeticOverflow)?;
    let denominator = i128::from(span)
        .checked_mul(BPS_DENOMINATOR)
        .ok_or(ContractError::ArithmeticOverflow)?;

    numerator
        .checked_div(denominator)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Total reward accrued by `window` from `started_at` up to `up_to`.
///
/// Walks the history from `rate_epoch_at_start`. Every epoch boundary that
/// falls inside the interval closes a segment whose reward is compounded
/// into the principal carried into the next segment; whatever remains after
/// the last boundary is paid at the rate of the last epoch reached.
///
/// Returns the cumulative reward across all segments, excluding principal.
/// `up_to` is clamped to `matures_at`; an empty interval yields 0.
pub fn compute<S: EpochSource + ?Sized>(
    history: &S,
    window: &AccrualWindow,
    up_to: u64,
) -> Result<i128, ContractError> {
    let up_to = up_to.min(window.matures_at);
    if up_to <= window.started_at {
        return Ok(0);
    }
    let span = window.matures_at - window.started_at;

    let mut at = window.started_at;
    let mut principal_acc = window.principal;
    let mut current = history
        .epoch(window.rate_epoch_at_start)
        .ok_or(ContractError::EpochNotFound)?;

    while let Some(next) = current
        .ordinal
        .checked_add(1)
        .and_then(|ordinal| history.epoch(ordinal))
    {
        if next.effective_at > up_to {
            break;
        }
        let elapsed = next.effective_at.saturating_sub(at);
        let reward = segment_reward(principal_acc, current.rate_bps, elapsed, span)?;
        principal_acc = principal_acc
            .checked_add(reward)
            .ok_or(ContractError::ArithmeticOverflow)?;
        at = at.max(next.effective_at);
        current = next;
    }

    let tail = if at < up_to {
        segment_reward(principal_acc, current.rate_bps, up_to - at, span)?
    } else {
        0
    };

    principal_acc
        .checked_add(tail)
        .and_then(|total| total.checked_sub(window.principal))
        .ok_or(ContractError::ArithmeticOverflow)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure-math tests with no Soroban environment dependency.
