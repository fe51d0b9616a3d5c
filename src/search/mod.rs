pub mod edit_distance;
pub mod title;

pub use edit_distance::edit_distance_at_most_one;
pub use title::search_by_title;
