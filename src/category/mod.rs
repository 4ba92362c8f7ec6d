//! Categories group a user's transactions by what the money was for, e.g.
//! "🍕 Food" for expenses or "💼 Salary" for income.

mod create;
mod db;
mod delete;
mod domain;
mod picker;

pub use create::create_category_endpoint;
pub use db::{
    create_category, create_category_table, delete_category, find_category, get_categories,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryIcon, CategoryId, CategoryName, NewCategory};
pub use picker::{category_picker, get_categories_json, get_category_picker};
