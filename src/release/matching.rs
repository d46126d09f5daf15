//! release::matching
//!
//! Attribution of fetched commit batches back to release candidates.
//!
//! # Rules
//!
//! A batch belongs to the candidate whose head commit id equals the batch's
//! first (newest) commit id. Attribution has to be unambiguous:
//!
//! - exactly one candidate matches: a release is emitted
//! - no candidate matches, or the batch is empty: the batch is dropped
//! - several candidates match: the batch is dropped
//!
//! Every dropped batch is logged at warn level with the ref it was fetched
//! for, so missing releases can be explained from the log.

use tracing::warn;

use super::CommitBatch;
use crate::core::types::{Commit, Release};

/// Outcome of matching one batch against the candidates.
#[derive(Debug, PartialEq, Eq)]
pub enum BatchMatch<'a, C> {
    /// Exactly one candidate owns the batch.
    Matched(&'a C),
    /// The batch has no commits.
    Empty,
    /// No candidate's head is the batch's first commit.
    Unmatched,
    /// This many candidates share the batch's first commit.
    Ambiguous(usize),
}

/// Classify `batch` against `candidates`.
pub fn classify<'a, C, F>(candidates: &'a [C], batch: &[Commit], head_id: F) -> BatchMatch<'a, C>
where
    F: Fn(&C) -> &str,
{
    let Some(first) = batch.first() else {
        return BatchMatch::Empty;
    };

    let mut matches = candidates.iter().filter(|c| head_id(*c) == first.id);
    match (matches.next(), matches.count()) {
        (None, _) => BatchMatch::Unmatched,
        (Some(candidate), 0) => BatchMatch::Matched(candidate),
        (Some(_), rest) => BatchMatch::Ambiguous(rest + 1),
    }
}

/// Turn batches into releases, dropping any that cannot be attributed.
pub fn attribute<C, F, B>(
    candidates: &[C],
    batches: Vec<CommitBatch>,
    head_id: F,
    build: B,
) -> Vec<Release>
where
    F: Fn(&C) -> &str,
    B: Fn(&C, Vec<Commit>) -> Release,
{
    let mut releases = Vec::with_capacity(batches.len());

    for batch in batches {
        match classify(candidates, &batch.commits, &head_id) {
            BatchMatch::Matched(candidate) => releases.push(build(candidate, batch.commits)),
            BatchMatch::Empty => {
                warn!(ref_name = %batch.ref_name, "no commits returned for ref; skipping release");
            }
            BatchMatch::Unmatched => {
                warn!(
                    ref_name = %batch.ref_name,
                    first_commit = %batch.commits[0].id,
                    "newest commit does not match any release head; skipping release"
                );
            }
            BatchMatch::Ambiguous(count) => {
                warn!(
                    ref_name = %batch.ref_name,
                    first_commit = %batch.commits[0].id,
                    candidates = count,
                    "newest commit matches several release heads; skipping release"
                );
            }
        }
    }

    releases
}
