//! Coin Market Core - Seeded Price Paths, Ranking and Allocation
//!
//! This library holds every piece of the simulator that is pure computation:
//! 1. **Seeding**: entity name -> reproducible integer seed
//! 2. **Paths**: discrete Wiener process and its GBM price transform
//! 3. **Views**: running chart bounds, dense ranking and greedy budget allocation
//!
//! Nothing in here touches the clock or the filesystem; see `coinmarket_env`.

pub mod error;
pub mod seed;
pub mod brownian;
pub mod roster;
pub mod snapshot;
pub mod ranking;
pub mod render;

// Re-export key types for convenience
pub use error::{PathError, RosterError, SeedInputError, SimulationParamError};
pub use seed::derive_seed;
pub use brownian::{wiener_process, GbmParams};
pub use roster::{Entity, Roster};
pub use snapshot::{compute_round, RoundOutput};
pub use ranking::{dense_rank, greedy_allocation, Allocation, RankingMode};
pub use render::{render_tick, RenderPayload, RenderState, Series, Standing, TableRow};
