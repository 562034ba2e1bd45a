//! Import and export of the nested group/tag document.
//!
//! The on-disk shape is the tree itself: a YAML sequence of groups, each with
//! `name`, `color`, `tags` and optional `groups`. Import never commits a
//! partial tree: a parse error leaves the caller's snapshot untouched, and a
//! parsed document is normalized so the wildcard group exists and sits last.

use std::sync::Arc;

use thiserror::Error;

use crate::group::{
  TagGroup,
  TagTree,
  WILDCARD_NAME,
  wildcard_group,
};

#[derive(Debug, Error)]
pub enum YamlError {
  #[error("failed to parse tag document: {0}")]
  Parse(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, YamlError>;

/// Serializes the tree. Tag order is preserved and empty `groups` lists are
/// omitted.
pub fn export_yaml(tree: &TagTree) -> Result<String> {
  Ok(serde_yaml::to_string(tree)?)
}

/// Parses a tag document and normalizes the wildcard invariant: the first
/// wildcard group found is moved to the end (any further ones are dropped),
/// and a default wildcard is synthesized when the document has none.
pub fn import_yaml(doc: &str) -> Result<TagTree> {
  let parsed: Vec<Arc<TagGroup>> = serde_yaml::from_str(doc)?;

  let mut wildcard = None;
  let mut groups = Vec::with_capacity(parsed.len() + 1);
  for group in parsed {
    if group.name == WILDCARD_NAME {
      wildcard.get_or_insert(group);
    } else {
      groups.push(group);
    }
  }
  groups.push(wildcard.unwrap_or_else(|| Arc::new(wildcard_group())));

  Ok(TagTree { groups })
}
