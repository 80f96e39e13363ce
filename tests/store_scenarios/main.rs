//! Store Scenario Suite
//!
//! End-to-end behavior of the public `shelfdb` API.
//!
//! ## Test Groups
//!
//! - **Insert / find**: identifiers, constraints, copies, relevance markers
//! - **Update**: modifiers, upsert, multi, constraint aborts
//! - **Remove**: index positions after removal
//! - **Sort / paging**: natural order, limit, skip
//! - **Full-text**: fractional relevance
//! - **Snapshots**: save, reopen, type preservation
//! - **Credentials**: unique + required indexes used for lookups
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test store_scenarios
//! cargo test --test store_scenarios remove
//! ```

mod test_utils;

mod credentials;
mod fulltext;
mod insert_find;
mod remove_positions;
mod snapshots;
mod sorting_paging;
mod update_modifiers;
