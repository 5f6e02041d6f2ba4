//! Algorithm catalog: records loaded from the site's JSON data file.

mod difficulty;
mod model;
mod render;

pub use difficulty::DifficultyInfo;
pub use model::{Algorithm, Catalog, Language, Problem, RelatedTopic, Resource, ResourceType};
pub use render::{format_text, render_summary};
