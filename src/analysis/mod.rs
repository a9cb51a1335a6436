//! Analysis modules.
//!
//! Pure functions over attributed posts: category summaries, seasonality
//! tables and top/outlier selection. Nothing here performs I/O.

pub mod aggregator;
pub mod seasonality;
pub mod selection;

pub use aggregator::*;
pub use seasonality::seasonality;
pub use selection::{outliers, top_posts};
