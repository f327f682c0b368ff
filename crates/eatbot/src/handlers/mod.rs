//! Feature handlers and dialog committers

mod committers;
mod products;
mod recipes;

pub use committers::{ProductCommitter, RecipeCommitter};
pub use products::ProductsHandler;
pub use recipes::RecipesHandler;
