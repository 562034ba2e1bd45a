//! Read-only traversals over the current snapshot: duplicate-tag detection
//! and substring search.
//!
//! The tree stays small, so each query walks it from scratch instead of
//! maintaining an incremental index. Traversal order is fixed: a group's own
//! tags are inspected before its children, children in list order.

use std::sync::Arc;

use crate::group::{
  TagGroup,
  TagTree,
};

/// One search hit, with the full ancestor-name chain of the owning group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHit {
  pub key:   String,
  pub value: String,
  pub path:  Vec<String>,
}

/// Name of the first group (in traversal order) whose tags contain `key`, or
/// `None` if the key is absent everywhere. This defines the resolution order
/// for the advisory one-owner-per-key rule.
pub fn find_duplicate_tag<'a>(tree: &'a TagTree, key: &str) -> Option<&'a str> {
  fn walk<'a>(groups: &'a [Arc<TagGroup>], key: &str) -> Option<&'a str> {
    for group in groups {
      if group.tags.contains_key(key) {
        return Some(&group.name);
      }
      if let Some(found) = walk(&group.groups, key) {
        return Some(found);
      }
    }
    None
  }
  walk(&tree.groups, key)
}

/// Every path owning `key`, in traversal order. Callers that need a single
/// owner take the first entry.
pub fn find_tag_paths(tree: &TagTree, key: &str) -> Vec<Vec<String>> {
  fn walk(groups: &[Arc<TagGroup>], key: &str, prefix: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    for group in groups {
      prefix.push(group.name.clone());
      if group.tags.contains_key(key) {
        out.push(prefix.clone());
      }
      walk(&group.groups, key, prefix, out);
      prefix.pop();
    }
  }
  let mut out = Vec::new();
  walk(&tree.groups, key, &mut Vec::new(), &mut out);
  out
}

/// Case-insensitive substring search over both tag keys and labels.
///
/// An empty query yields no results, and tags with an empty label are
/// excluded even when their key matches.
pub fn search_tags(tree: &TagTree, query: &str) -> Vec<TagHit> {
  if query.is_empty() {
    return Vec::new();
  }
  let needle = query.to_lowercase();

  fn walk(
    groups: &[Arc<TagGroup>],
    needle: &str,
    prefix: &mut Vec<String>,
    out: &mut Vec<TagHit>,
  ) {
    for group in groups {
      prefix.push(group.name.clone());
      for (key, value) in &group.tags {
        if value.is_empty() {
          continue;
        }
        if key.to_lowercase().contains(needle) || value.to_lowercase().contains(needle) {
          out.push(TagHit {
            key:   key.clone(),
            value: value.clone(),
            path:  prefix.clone(),
          });
        }
      }
      walk(&group.groups, needle, prefix, out);
      prefix.pop();
    }
  }

  let mut out = Vec::new();
  walk(&tree.groups, &needle, &mut Vec::new(), &mut out);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample_tree() -> TagTree {
    let mut character = TagGroup::new("Character", "");
    character.tags.insert("solo".into(), "ソロ".into());
    character.tags.insert("smile_wide".into(), "大きな笑顔".into());
    character.tags.insert("no_label".into(), "".into());

    let mut face = TagGroup::new("Face", "");
    face.tags.insert("open_mouth".into(), "笑顔で開いた口".into());

    let mut person = TagGroup::new("Person", "");
    person.groups.push(Arc::new(character));
    person.groups.push(Arc::new(face));

    TagTree {
      groups: vec![Arc::new(person)],
    }
  }

  #[test]
  fn duplicate_scan_returns_first_owner_in_traversal_order() {
    let tree = sample_tree();
    assert_eq!(find_duplicate_tag(&tree, "solo"), Some("Character"));
    assert_eq!(find_duplicate_tag(&tree, "open_mouth"), Some("Face"));
    assert_eq!(find_duplicate_tag(&tree, "nowhere"), None);
  }

  #[test]
  fn own_tags_are_checked_before_children() {
    let mut parent = TagGroup::new("Parent", "");
    parent.tags.insert("shared".into(), "親".into());
    let mut child = TagGroup::new("Child", "");
    child.tags.insert("shared".into(), "子".into());
    parent.groups.push(Arc::new(child));
    let tree = TagTree {
      groups: vec![Arc::new(parent)],
    };
    assert_eq!(find_duplicate_tag(&tree, "shared"), Some("Parent"));
    assert_eq!(
      find_tag_paths(&tree, "shared"),
      vec![
        vec!["Parent".to_string()],
        vec!["Parent".to_string(), "Child".to_string()],
      ]
    );
  }

  #[test]
  fn empty_query_yields_nothing() {
    assert!(search_tags(&sample_tree(), "").is_empty());
  }

  #[test]
  fn search_matches_keys_and_labels_case_insensitively() {
    let tree = sample_tree();
    let hits = search_tags(&tree, "SMILE");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].key, "smile_wide");
    assert_eq!(hits[0].path, vec!["Person".to_string(), "Character".to_string()]);

    // "笑顔" appears in two labels, in two different groups.
    let hits = search_tags(&tree, "笑顔");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[1].path, vec!["Person".to_string(), "Face".to_string()]);
  }

  #[test]
  fn empty_labels_are_excluded_even_on_key_match() {
    let hits = search_tags(&sample_tree(), "no_label");
    assert!(hits.is_empty());
  }
}
