pub mod color;
pub mod convert;
pub mod editor;
pub mod group;
pub mod history;
pub mod ops;
pub mod search;
pub mod session;
pub mod text;
pub mod yaml;

pub use group::{
  GroupId,
  TagGroup,
  TagTree,
};
pub use history::History;
