// Core types - static taxonomy shared by uploads, search and suggestions

pub mod categories;

pub use categories::{MainCategory, SPORTS_CATEGORIES};
