//! Query - ordering and equality/membership filters over records.
//!
//! ## Example
//!
//! ```ignore
//! use entity_store::{Filters, OrderBy};
//!
//! let filters = Filters::new()
//!     .eq("project_status", "in_progress")
//!     .is_in("project_type", ["residential", "commercial"]);
//!
//! let order = OrderBy::parse("-created_date");
//! ```

mod filter;
mod order;

pub use filter::{Filter, Filters, Predicate, IN_SUFFIX};
pub use order::{compare_values, OrderBy, DEFAULT_LIST_ORDER};
