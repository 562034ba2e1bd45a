//! Path-directed mutations over the tag tree.
//!
//! Every operation takes the current snapshot and returns a brand-new tree;
//! the input is never touched. Rebuilding clones only the spine from the root
//! to the edited node, so untouched subtrees are shared between the old and
//! new snapshots. Operations are all-or-nothing: an `Err` means the input
//! snapshot is still the only valid one.
//!
//! These functions are pure; recording the result in the undo history (and
//! deciding which failures are silent no-ops) is the job of
//! [`crate::editor::Editor`].

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
  color::random_color,
  group::{
    TagGroup,
    TagTree,
    WILDCARD_NAME,
    unique_name,
  },
};

/// Base name for generated top-level groups.
pub const NEW_GROUP_BASE: &str = "新しいグループ";
/// Prefix of the numbered subgroup pattern.
pub const SUBGROUP_PREFIX: &str = "サブグループ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
  #[error("group name must not be empty")]
  EmptyName,
  #[error("group not found: {0}")]
  NotFound(String),
  #[error("move target equals the source")]
  SamePosition,
}

pub type Result<T> = std::result::Result<T, TreeError>;

/// Rebuilds the sibling list so that the node at `path` is replaced by
/// `f(node)`, cloning only the ancestors along the way.
fn rebuild<F>(groups: &[Arc<TagGroup>], path: &[&str], f: F) -> Result<Vec<Arc<TagGroup>>>
where
  F: FnOnce(&TagGroup) -> Result<TagGroup>,
{
  let (first, rest) = path
    .split_first()
    .ok_or_else(|| TreeError::NotFound(String::new()))?;
  let index = groups
    .iter()
    .position(|g| g.name == *first)
    .ok_or_else(|| TreeError::NotFound(path.join("/")))?;

  let node = &groups[index];
  let replacement = if rest.is_empty() {
    f(node)?
  } else {
    let mut clone = (**node).clone();
    clone.groups = rebuild(&node.groups, rest, f)?;
    clone
  };

  let mut out = groups.to_vec();
  out[index] = Arc::new(replacement);
  Ok(out)
}

fn update_group<F>(tree: &TagTree, path: &[&str], f: F) -> Result<TagTree>
where
  F: FnOnce(&TagGroup) -> Result<TagGroup>,
{
  Ok(TagTree {
    groups: rebuild(&tree.groups, path, f)?,
  })
}

/// Applies `f` to the children list at `path`; the empty path addresses the
/// top-level list.
fn update_children<F>(tree: &TagTree, path: &[&str], f: F) -> Result<TagTree>
where
  F: FnOnce(&[Arc<TagGroup>]) -> Result<Vec<Arc<TagGroup>>>,
{
  if path.is_empty() {
    Ok(TagTree {
      groups: f(&tree.groups)?,
    })
  } else {
    update_group(tree, path, |node| {
      let mut clone = node.clone();
      clone.groups = f(&node.groups)?;
      Ok(clone)
    })
  }
}

/// Creates a new top-level group with a generated unique name and a random
/// display color, inserted immediately before the wildcard group so the
/// wildcard stays last. Appends when the tree has no wildcard (or no groups
/// at all).
pub fn add_top_level_group(tree: &TagTree) -> TagTree {
  let group = Arc::new(TagGroup::new(
    unique_name(NEW_GROUP_BASE, &tree.groups),
    random_color(),
  ));
  let mut groups = tree.groups.clone();
  let index = groups
    .iter()
    .position(|g| g.name == WILDCARD_NAME)
    .unwrap_or(groups.len());
  groups.insert(index, group);
  TagTree { groups }
}

/// Adds a numbered subgroup under `parent_path`. The number is one above the
/// highest existing `サブグループN` suffix among the direct children,
/// recomputed from the current siblings each time.
pub fn add_subgroup(tree: &TagTree, parent_path: &[&str]) -> Result<TagTree> {
  update_group(tree, parent_path, |parent| {
    let next = parent
      .groups
      .iter()
      .filter_map(|g| g.name.strip_prefix(SUBGROUP_PREFIX)?.parse::<u64>().ok())
      .max()
      .map_or(1, |n| n + 1);
    let mut clone = parent.clone();
    clone
      .groups
      .push(Arc::new(TagGroup::new(format!("{SUBGROUP_PREFIX}{next}"), random_color())));
    Ok(clone)
  })
}

/// Renames the node at `path`. Rejects empty or whitespace-only names. A name
/// already taken by another sibling is suffixed through [`unique_name`] so
/// sibling names stay unique. Any cached path into the renamed subtree is
/// stale afterwards; callers should re-resolve by [`crate::GroupId`].
pub fn rename_group(tree: &TagTree, path: &[&str], new_name: &str) -> Result<TagTree> {
  let new_name = new_name.trim();
  if new_name.is_empty() {
    return Err(TreeError::EmptyName);
  }
  let (name, parent_path) = path
    .split_last()
    .ok_or_else(|| TreeError::NotFound(String::new()))?;
  update_children(tree, parent_path, |children| {
    let index = children
      .iter()
      .position(|g| g.name == *name)
      .ok_or_else(|| TreeError::NotFound(path.join("/")))?;
    let others: Vec<_> = children
      .iter()
      .enumerate()
      .filter(|&(i, _)| i != index)
      .map(|(_, g)| Arc::clone(g))
      .collect();
    let mut clone = (*children[index]).clone();
    clone.name = unique_name(new_name, &others);
    let mut out = children.to_vec();
    out[index] = Arc::new(clone);
    Ok(out)
  })
}

/// Replaces the display color of the node at `path`.
pub fn set_color(tree: &TagTree, path: &[&str], color: &str) -> Result<TagTree> {
  update_group(tree, path, |node| {
    let mut clone = node.clone();
    clone.color = color.to_string();
    Ok(clone)
  })
}

/// Removes the node at `path` together with its entire subtree.
pub fn delete_group(tree: &TagTree, path: &[&str]) -> Result<TagTree> {
  let (name, parent_path) = path
    .split_last()
    .ok_or_else(|| TreeError::NotFound(String::new()))?;
  update_children(tree, parent_path, |children| {
    let index = children
      .iter()
      .position(|g| g.name == *name)
      .ok_or_else(|| TreeError::NotFound(path.join("/")))?;
    let mut out = children.to_vec();
    out.remove(index);
    Ok(out)
  })
}

/// Replaces the full tag mapping of the node at `path`.
pub fn update_tags(
  tree: &TagTree,
  path: &[&str],
  new_tags: IndexMap<String, String>,
) -> Result<TagTree> {
  update_group(tree, path, |node| {
    let mut clone = node.clone();
    clone.tags = new_tags;
    Ok(clone)
  })
}

/// Adds every entry of `tags` into the target group, overwriting on key
/// collision.
pub fn merge_tags(
  tree: &TagTree,
  target_path: &[&str],
  tags: &IndexMap<String, String>,
) -> Result<TagTree> {
  update_group(tree, target_path, |node| {
    let mut clone = node.clone();
    for (key, value) in tags {
      clone.tags.insert(key.clone(), value.clone());
    }
    Ok(clone)
  })
}

/// Moves tags from one group to another as a single structural edit: the keys
/// are removed from the source and merged into the target, and the caller
/// commits the combined result once so a single undo reverts the whole move.
pub fn move_tag(
  tree: &TagTree,
  source_path: &[&str],
  target_path: &[&str],
  tags: &IndexMap<String, String>,
) -> Result<TagTree> {
  // Resolve the target up front so a stale target leaves the source intact.
  if tree.find_by_path(target_path).is_none() {
    return Err(TreeError::NotFound(target_path.join("/")));
  }
  let removed = update_group(tree, source_path, |node| {
    let mut clone = node.clone();
    for key in tags.keys() {
      clone.tags.shift_remove(key);
    }
    Ok(clone)
  })?;
  merge_tags(&removed, target_path, tags)
}

/// Detaches the child at `source_index` under `source_parent` and appends it
/// under `target_parent`. The empty path addresses the top level.
pub fn move_subgroup(
  tree: &TagTree,
  source_parent: &[&str],
  source_index: usize,
  target_parent: &[&str],
) -> Result<TagTree> {
  let same_parent = match (source_parent.is_empty(), target_parent.is_empty()) {
    (true, true) => true,
    (false, false) => {
      let source = tree
        .find_by_path(source_parent)
        .ok_or_else(|| TreeError::NotFound(source_parent.join("/")))?;
      let target = tree
        .find_by_path(target_parent)
        .ok_or_else(|| TreeError::NotFound(target_parent.join("/")))?;
      source.id == target.id
    },
    _ => false,
  };
  if same_parent {
    return Err(TreeError::SamePosition);
  }

  let mut moved: Option<Arc<TagGroup>> = None;
  let detached = update_children(tree, source_parent, |children| {
    if source_index >= children.len() {
      return Err(TreeError::NotFound(format!(
        "{}[{source_index}]",
        source_parent.join("/")
      )));
    }
    let mut out = children.to_vec();
    moved = Some(out.remove(source_index));
    Ok(out)
  })?;
  let moved = moved.ok_or(TreeError::SamePosition)?;

  // Resolving the target against the detached tree also rejects moving a
  // group underneath its own subtree.
  update_children(&detached, target_parent, |children| {
    let mut out = children.to_vec();
    // At the top level the wildcard group stays last.
    let index = if target_parent.is_empty() {
      out
        .iter()
        .position(|g| g.name == WILDCARD_NAME)
        .unwrap_or(out.len())
    } else {
      out.len()
    };
    out.insert(index, moved);
    Ok(out)
  })
}

/// Reorders the children of `parent_path`, removing the sibling at `from` and
/// reinserting it at `to`. A pure list reorder, no renaming.
pub fn reorder_siblings(
  tree: &TagTree,
  parent_path: &[&str],
  from: usize,
  to: usize,
) -> Result<TagTree> {
  if from == to {
    return Err(TreeError::SamePosition);
  }
  update_children(tree, parent_path, |children| {
    if from >= children.len() || to >= children.len() {
      return Err(TreeError::NotFound(format!("{}[{from}]", parent_path.join("/"))));
    }
    let mut out = children.to_vec();
    let node = out.remove(from);
    out.insert(to, node);
    Ok(out)
  })
}
