//! Categories that users group their transactions into.

mod db;
mod domain;
mod endpoints;

pub use db::{
    create_category, create_category_table, delete_category, get_categories, get_category,
    update_category,
};
pub(crate) use db::map_category_columns;
pub use domain::{Category, CategoryData, CategoryId, CategoryName, CategoryType};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_category_endpoint,
    list_categories_endpoint, update_category_endpoint,
};
