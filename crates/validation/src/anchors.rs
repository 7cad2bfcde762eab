//! Anchor search for interpolation.
//!
//! Anchors are looked up across up to three sources in a fixed priority
//! order. Both directions share one search routine; only their source lists
//! and date predicates differ.

use std::cmp::Ordering;

use pricewatch_core::PriceBar;

use crate::pipeline::RepairFailure;

/// Side of the rejected bar an anchor must lie on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Dated strictly earlier.
    Before,
    /// Dated strictly later.
    After,
}

/// Where an anchor can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorSource {
    /// Bars already accepted or repaired in this batch.
    CleanOutput,
    /// Raw batch bars not yet processed (or, looking backward, already passed).
    PendingBatch,
    /// Previously persisted bars.
    Context,
}

impl Direction {
    /// Sources to consult, highest priority first.
    pub fn sources(self) -> &'static [AnchorSource] {
        match self {
            Direction::Before => &[
                AnchorSource::CleanOutput,
                AnchorSource::PendingBatch,
                AnchorSource::Context,
            ],
            Direction::After => &[AnchorSource::PendingBatch, AnchorSource::Context],
        }
    }

    /// Is `candidate` on this side of `target`?
    #[inline]
    fn admits(self, candidate: &PriceBar, target: &PriceBar) -> bool {
        let ordering = chronological(candidate, target);
        match self {
            Direction::Before => ordering.is_lt(),
            Direction::After => ordering.is_gt(),
        }
    }
}

/// Order two bars by calendar day.
///
/// Falls back to comparing the raw strings when either date does not parse.
fn chronological(a: &PriceBar, b: &PriceBar) -> Ordering {
    match (a.day(), b.day()) {
        (Ok(a_day), Ok(b_day)) => a_day.cmp(&b_day),
        _ => a.date.cmp(&b.date),
    }
}

/// Everything an anchor search can look at for batch position `index`.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpace<'a> {
    /// Bars accepted so far, in batch order.
    pub clean: &'a [PriceBar],
    /// The original batch.
    pub batch: &'a [PriceBar],
    /// Position of the rejected bar in `batch`.
    pub index: usize,
    /// Rejected bars kept as received; their entries in `clean` are skipped.
    pub unrepaired: &'a [RepairFailure],
    /// Persisted bars, most recent first.
    pub context: &'a [PriceBar],
}

impl<'a> SearchSpace<'a> {
    /// Find the nearest anchor for the bar at `index`.
    ///
    /// `is_valid` decides whether a raw batch bar can stand on its own; bars
    /// from the clean output and the context are trusted as-is.
    pub fn find<F>(&self, direction: Direction, is_valid: F) -> Option<&'a PriceBar>
    where
        F: Fn(&PriceBar) -> bool,
    {
        let target = self.batch.get(self.index)?;

        direction
            .sources()
            .iter()
            .find_map(|&source| self.search_source(source, direction, target, &is_valid))
    }

    fn search_source<F>(
        &self,
        source: AnchorSource,
        direction: Direction,
        target: &PriceBar,
        is_valid: &F,
    ) -> Option<&'a PriceBar>
    where
        F: Fn(&PriceBar) -> bool,
    {
        let admits = |b: &&'a PriceBar| direction.admits(b, target);

        match (source, direction) {
            (AnchorSource::CleanOutput, _) => self
                .clean
                .iter()
                .rev()
                .filter(|b| !self.is_unrepaired(b))
                .find(admits),
            (AnchorSource::PendingBatch, Direction::Before) => self.batch[..self.index]
                .iter()
                .rev()
                .filter(admits)
                .find(|&b| is_valid(b)),
            (AnchorSource::PendingBatch, Direction::After) => self.batch[self.index + 1..]
                .iter()
                .filter(admits)
                .find(|&b| is_valid(b)),
            // Context order is not relied upon; pick the closest date.
            (AnchorSource::Context, Direction::Before) => self
                .context
                .iter()
                .filter(admits)
                .max_by(|a, b| chronological(a, b)),
            (AnchorSource::Context, Direction::After) => self
                .context
                .iter()
                .filter(admits)
                .min_by(|a, b| chronological(a, b)),
        }
    }

    fn is_unrepaired(&self, bar: &PriceBar) -> bool {
        self.unrepaired.iter().any(|f| f.date == bar.date)
    }
}
