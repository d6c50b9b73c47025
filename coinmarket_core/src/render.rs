//! Render State and the Per-Tick View
//! ==================================
//!
//! Everything the live view needs from one snapshot, computed as a pure
//! function of the previous state:
//!
//! ```text
//! (RenderState, SnapshotState, tick) --render_tick--> (RenderState', RenderPayload)
//! ```
//!
//! - **Bounds**: `max_y` only grows, `min_y` only shrinks, both start at 100
//! - **Table**: re-sorted every tick by current price, stable against the
//!   previous tick's order, then ranked or allocated
//! - **Series**: one line per snapshot entry, cut to `min(tick + 1, len)`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use coinmarket_env::SnapshotState;

use crate::ranking::{dense_rank, greedy_allocation, RankingMode};
use crate::roster::Roster;

/// Starting value for both chart bounds and every table price.
pub const BASELINE_PRICE: f64 = 100.0;

/// Right-hand column of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    /// Dense rank, 1 = highest price
    Rank(usize),
    /// Budget grant flag, 1 = granted
    Prize(u8),
}

/// One row of the ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub coin: String,
    pub wishlist_won: f64,
    pub coin_price: f64,
    pub standing: Standing,
}

/// Consumer-owned view state that lives for the whole process.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// Highest current price ever observed
    pub max_y: f64,
    /// Lowest current price ever observed
    pub min_y: f64,
    /// Table rows in the order left by the last tick
    pub table: Vec<TableRow>,
}

impl RenderState {
    /// Creates the initial state: baseline bounds and the roster in file
    /// order at the baseline price.
    pub fn new(roster: &Roster, mode: &RankingMode) -> Self {
        let table = roster
            .entities()
            .iter()
            .enumerate()
            .map(|(i, e)| TableRow {
                coin: e.name.clone(),
                wishlist_won: e.wishlist_cost,
                coin_price: BASELINE_PRICE,
                standing: match mode {
                    RankingMode::Dense => Standing::Rank(i + 1),
                    RankingMode::Budget { .. } => Standing::Prize(1),
                },
            })
            .collect();

        Self {
            max_y: BASELINE_PRICE,
            min_y: BASELINE_PRICE,
            table,
        }
    }

    /// Widens the bounds for one observed price. At most one side moves.
    fn observe(&mut self, price: f64) {
        if price > self.max_y {
            self.max_y = price;
        } else if price < self.min_y {
            self.min_y = price;
        }
    }
}

/// One chart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<u64>,
    pub y: Vec<f64>,
}

/// Everything handed to the visualization sink for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPayload {
    /// Tick counter this payload was built for
    pub tick: u64,
    pub series: Vec<Series>,
    /// `[0, tick + 1]`
    pub x_domain: [u64; 2],
    /// `[min_y, max_y]`
    pub y_domain: [f64; 2],
    pub table: Vec<TableRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_expense: Option<f64>,
}

impl RenderPayload {
    /// The row currently on top of the table.
    pub fn leader(&self) -> Option<&TableRow> {
        self.table.first()
    }
}

/// Builds the view for `tick` from the previous state and a snapshot.
///
/// Roster coins absent from the snapshot keep their previous table price.
/// Snapshot entries absent from the roster are charted but not tabled.
pub fn render_tick(
    state: &RenderState,
    snapshot: &SnapshotState,
    tick: u64,
    mode: &RankingMode,
) -> (RenderState, RenderPayload) {
    let mut next = state.clone();
    let mut current_price: HashMap<&str, f64> = HashMap::with_capacity(snapshot.len());
    let mut series = Vec::with_capacity(snapshot.len());

    for (name, path) in snapshot {
        let visible = path.len().min(tick as usize + 1);
        let y = &path[..visible];
        let Some(&last_y) = y.last() else {
            continue;
        };

        next.observe(last_y);
        current_price.insert(name.as_str(), last_y);
        series.push(Series {
            name: name.clone(),
            x: (0..visible as u64).collect(),
            y: y.to_vec(),
        });
    }

    for row in &mut next.table {
        if let Some(price) = current_price.get(row.coin.as_str()) {
            row.coin_price = *price;
        }
    }
    // sort_by is stable: ties keep the previous tick's order
    next.table.sort_by(|a, b| b.coin_price.total_cmp(&a.coin_price));

    let total_expense = match mode {
        RankingMode::Dense => {
            let ranks = dense_rank(next.table.len());
            for (row, rank) in next.table.iter_mut().zip(ranks) {
                row.standing = Standing::Rank(rank);
            }
            None
        }
        RankingMode::Budget { total_budget } => {
            let alloc = greedy_allocation(next.table.iter().map(|r| r.wishlist_won), *total_budget);
            for (row, granted) in next.table.iter_mut().zip(alloc.granted) {
                row.standing = Standing::Prize(granted as u8);
            }
            Some(alloc.total_expense)
        }
    };

    let payload = RenderPayload {
        tick,
        series,
        x_domain: [0, tick + 1],
        y_domain: [next.min_y, next.max_y],
        table: next.table.clone(),
        total_budget: mode.total_budget(),
        total_expense,
    };

    (next, payload)
}
