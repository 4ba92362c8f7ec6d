//! Dashboard module
//!
//! Provides the landing page for signed-in users with the buttons for
//! recording transactions, a summary of the selected date range and the
//! history of a month or year.

mod history;
mod overview;
mod page;

pub use history::get_history_section;
pub use overview::get_overview;
pub use page::get_dashboard_page;
