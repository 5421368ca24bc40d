//! Minimum cost purchase plans over a time ordered request sequence.
//!
//! Every move covers a prefix of the residual sequence: a fixed package
//! covers as many leading requests as its budgets allow, a pay-per-use run
//! covers any number of leading requests billed one by one. Residuals are
//! always suffixes of the input, so a plan is determined by the best first
//! move from every start index.

use log::{debug, warn};

use crate::{
    error::{Error, Result},
    model::{Catalog, FixedPackage, Purchase, PurchaseLine, Request},
};

/// Number of leading requests that `package` fully covers.
///
/// A request fits while its volume is at most the remaining volume budget
/// and its duration is strictly below the remaining duration budget.
pub fn coverage(requests: &[Request], package: &FixedPackage) -> usize {
    let mut volume = package.volume_budget;
    let mut duration = package.duration_budget;
    requests
        .iter()
        .take_while(|request| {
            if request.volume <= volume && request.duration < duration {
                volume -= request.volume;
                duration -= request.duration;
                true
            } else {
                false
            }
        })
        .count()
}

/// Summed duration, saturating at `u64::MAX`.
pub fn total_duration(requests: &[Request]) -> u64 {
    requests
        .iter()
        .fold(0u64, |total, request| total.saturating_add(request.duration))
}

/// Best first move found for one residual sequence.
struct Move {
    line: PurchaseLine,
    /// Price of this line alone.
    cost: u64,
    /// Price of this line plus the best plan for what it leaves.
    total: u64,
}

/// Picks the cheapest first move for `requests`.
///
/// `tail_cost(k)` yields the cost of the best plan for `requests[k..]`, or
/// `None` when that residual cannot be covered. Fixed packages are tried in
/// catalog order before pay-per-use runs of increasing length, and only a
/// strictly cheaper candidate replaces the current best. A candidate whose
/// cost does not fit in `u64` is not a candidate.
fn best_move<F>(requests: &[Request], catalog: &Catalog, mut tail_cost: F) -> Result<Option<Move>>
where
    F: FnMut(usize) -> Result<Option<u64>>,
{
    let mut best: Option<Move> = None;
    let consider = |best: &mut Option<Move>, line: PurchaseLine, cost: u64, tail: u64| {
        let Some(total) = cost.checked_add(tail) else {
            return;
        };
        if best.as_ref().map_or(true, |current| total < current.total) {
            *best = Some(Move { line, cost, total });
        }
    };

    for package in catalog.fixed() {
        let covered = coverage(requests, package);
        if covered == 0 {
            continue;
        }
        let Some(tail) = tail_cost(covered)? else {
            continue;
        };
        let line = PurchaseLine {
            package_id: package.id,
            // Strictly below the duration budget, cannot saturate.
            effective_duration: total_duration(&requests[..covered]),
            requests: covered,
        };
        consider(&mut best, line, package.price, tail)
    }

    if let Some(pay_per_use) = catalog.pay_per_use() {
        let mut run_cost = 0u64;
        let mut run_duration = 0u64;
        for (index, request) in requests.iter().enumerate() {
            // Longer runs only cost more.
            let Some(cost) = pay_per_use
                .cost_of(request)
                .ok()
                .and_then(|cost| run_cost.checked_add(cost))
            else {
                break;
            };
            let Some(duration) = run_duration.checked_add(request.duration) else {
                break;
            };
            run_cost = cost;
            run_duration = duration;
            let Some(tail) = tail_cost(index + 1)? else {
                continue;
            };
            let line = PurchaseLine {
                package_id: pay_per_use.id,
                effective_duration: run_duration,
                requests: index + 1,
            };
            consider(&mut best, line, run_cost, tail)
        }
    }

    Ok(best)
}

/// Fails unless every request can be covered by at least one move.
///
/// A request no package covers on its own cannot be covered as part of a
/// longer prefix either, and a sequence of individually coverable requests
/// always has a plan.
fn check_coverable(requests: &[Request], catalog: &Catalog) -> Result<()> {
    if requests.is_empty() || catalog.pay_per_use().is_some() {
        return Ok(());
    }
    if catalog.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    match requests.iter().position(|request| {
        catalog
            .fixed()
            .iter()
            .all(|package| coverage(std::slice::from_ref(request), package) == 0)
    }) {
        Some(index) => Err(Error::Uncoverable { index }),
        None => Ok(()),
    }
}

/// Minimum cost purchase covering all of `requests` exactly once.
///
/// Solves suffixes from the end backward, keeping only the best first move
/// per start index, then follows the moves from the front. Suffixes whose
/// every plan costs more than `u64::MAX` have no entry; if that includes the
/// whole sequence the result is [`Error::CostOverflow`].
pub fn optimal_purchase(requests: &[Request], catalog: &Catalog) -> Result<Purchase> {
    check_coverable(requests, catalog)?;
    let len = requests.len();
    let mut costs: Vec<Option<u64>> = vec![None; len + 1];
    costs[len] = Some(0);
    let mut moves: Vec<Option<Move>> = (0..len).map(|_| None).collect();
    for start in (0..len).rev() {
        let best = best_move(&requests[start..], catalog, |consumed| {
            Ok(costs[start + consumed])
        })?;
        costs[start] = best.as_ref().map(|best| best.total);
        moves[start] = best;
    }
    debug!("solved {len} suffixes, best cost {:?}", costs[0]);
    if costs[0].is_none() {
        return Err(Error::CostOverflow);
    }

    let mut purchase = Purchase::default();
    let mut start = 0;
    while start < len {
        let Some(best) = moves[start].take() else {
            return Err(Error::Uncoverable { index: start });
        };
        start += best.line.requests;
        purchase = purchase.combine(Purchase::single(best.line, best.cost))?;
    }
    Ok(purchase)
}

/// Same result as [`optimal_purchase`] by plain recursion over residuals.
///
/// Takes time exponential in the number of requests; useful for checking the
/// suffix table on short inputs.
pub fn exhaustive_purchase(requests: &[Request], catalog: &Catalog) -> Result<Purchase> {
    check_coverable(requests, catalog)?;
    if requests.len() > 24 {
        warn!(
            "exhaustive search over {} requests may not finish",
            requests.len()
        );
    }
    exhaustive(requests, catalog)?.ok_or(Error::CostOverflow)
}

fn exhaustive(requests: &[Request], catalog: &Catalog) -> Result<Option<Purchase>> {
    if requests.is_empty() {
        return Ok(Some(Purchase::default()));
    }
    let mut tails: Vec<Option<Purchase>> = vec![None; requests.len() + 1];
    let best = best_move(requests, catalog, |consumed| {
        let tail = exhaustive(&requests[consumed..], catalog)?;
        let cost = tail.as_ref().map(|tail| tail.total_cost);
        tails[consumed] = tail;
        Ok(cost)
    })?;
    let Some(best) = best else {
        return Ok(None);
    };
    let tail = tails[best.line.requests].take().unwrap_or_default();
    Purchase::single(best.line, best.cost).combine(tail).map(Some)
}
