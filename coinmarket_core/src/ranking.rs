//! Ranking and budget allocation over price-sorted entities.
//!
//! Both operate on a sequence that is already sorted by current price,
//! highest first. Neither re-sorts.

/// How the consumer fills the standing column of its table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankingMode {
    /// Dense ranks 1..N by sorted position
    Dense,
    /// Greedy allocation of wishlist costs against a budget
    Budget { total_budget: f64 },
}

impl RankingMode {
    /// Returns the budget, if any.
    pub fn total_budget(&self) -> Option<f64> {
        match self {
            RankingMode::Dense => None,
            RankingMode::Budget { total_budget } => Some(*total_budget),
        }
    }
}

/// Assigns dense ranks `1..=len` by position.
pub fn dense_rank(len: usize) -> Vec<usize> {
    (1..=len).collect()
}

/// Outcome of one greedy allocation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    /// Per-entity grant flag, in input order
    pub granted: Vec<bool>,
    /// Sum of granted costs
    pub total_expense: f64,
}

/// Walks `costs` in order, granting while the cumulative sum stays within
/// `total_budget` (inclusive).
///
/// The cumulative sum includes every cost seen so far, granted or not, so
/// once it exceeds the budget that entity and every later one is denied.
/// This is order-dependent and deliberately not a knapsack solution.
pub fn greedy_allocation<I>(costs: I, total_budget: f64) -> Allocation
where
    I: IntoIterator<Item = f64>,
{
    // Tick-local: never carried over between ticks
    let mut cumulated_won = 0.0;
    let mut total_expense = 0.0;

    let granted = costs
        .into_iter()
        .map(|cost| {
            cumulated_won += cost;
            let ok = cumulated_won <= total_budget;
            if ok {
                total_expense += cost;
            }
            ok
        })
        .collect();

    Allocation {
        granted,
        total_expense,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_rank() {
        assert_eq!(dense_rank(3), vec![1, 2, 3]);
        assert!(dense_rank(0).is_empty());
    }

    #[test]
    fn test_allocation_stops_at_first_overflow() {
        let alloc = greedy_allocation([400.0, 300.0, 500.0], 650.0);
        assert_eq!(alloc.granted, vec![true, false, false]);
        assert_eq!(alloc.total_expense, 400.0);
    }

    #[test]
    fn test_later_cheap_entry_is_still_denied() {
        // 100 would fit after 600 on its own, but the running sum is past the budget
        let alloc = greedy_allocation([500.0, 600.0, 100.0], 1000.0);
        assert_eq!(alloc.granted, vec![true, false, false]);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let alloc = greedy_allocation([400.0, 250.0], 650.0);
        assert_eq!(alloc.granted, vec![true, true]);
        assert_eq!(alloc.total_expense, 650.0);
    }

    #[test]
    fn test_zero_budget_grants_free_entries_only_until_first_cost() {
        let alloc = greedy_allocation([0.0, 0.0, 1.0, 0.0], 0.0);
        assert_eq!(alloc.granted, vec![true, true, false, false]);
    }

    #[test]
    fn test_total_budget_accessor() {
        assert_eq!(RankingMode::Dense.total_budget(), None);
        assert_eq!(
            RankingMode::Budget { total_budget: 1e6 }.total_budget(),
            Some(1e6)
        );
    }
}
