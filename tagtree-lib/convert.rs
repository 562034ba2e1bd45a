//! Free-form text to tag-pair conversion.
//!
//! The converter takes a prompt-style blob (comma/newline separated, `BREAK`
//! keywords, attention weights), normalizes it line by line and produces
//! `{ja, en}` pairs, calling out to the translation collaborator for lines
//! the tree does not already know.
//!
//! Failure handling is deliberately forgiving: any translation failure for a
//! line degrades to passing the original text through unchanged, never
//! aborting the batch. Cancellation is cooperative, checked between lines;
//! results produced so far are kept and no half-translated line is emitted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{
  Deserialize,
  Serialize,
};
use tokio_util::sync::CancellationToken;

use crate::{
  group::TagTree,
  search::find_tag_paths,
  text::{
    contains_japanese,
    format_english_tag,
    sanitize_input,
    validate_input,
  },
};

/// Languages the converter routes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
  En,
  Ja,
}

impl Lang {
  /// Wire code understood by the translation API.
  pub fn code(self) -> &'static str {
    match self {
      Self::En => "EN",
      Self::Ja => "JA",
    }
  }
}

/// The core's view of the translation collaborator. Retry and transport
/// concerns live behind this seam.
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
  async fn translate(
    &self,
    text: &str,
    source: Lang,
    target: Lang,
  ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// One converted line: Japanese label and canonical English key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
  pub ja: String,
  pub en: String,
}

impl TagPair {
  fn passthrough(text: &str) -> Self {
    Self {
      ja: text.to_string(),
      en: text.to_string(),
    }
  }
}

// Attention weight suffixes like ":1.2" or ": -0.5".
static WEIGHT: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s*[+-]?\d+(\.\d+)?").unwrap());

/// Splits the input into candidate lines: `BREAK` keywords count as commas,
/// blanks are dropped.
fn split_lines(input: &str) -> Vec<String> {
  input
    .replace("BREAK", ",")
    .split(['\n', ','])
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .map(str::to_string)
    .collect()
}

/// Strips prompt syntax from one line: grouping brackets and weights.
fn normalize_line(line: &str) -> String {
  let stripped: String = line
    .chars()
    .filter(|c| !matches!(c, '(' | ')' | '<' | '>'))
    .collect();
  WEIGHT.replace(&stripped, "").trim().to_string()
}

/// Converts `input` into tag pairs, translating unknown lines through
/// `translator`. `progress` is called with `(done, total)` after each line.
pub async fn convert_text(
  input: &str,
  tree: &TagTree,
  translator: &dyn Translator,
  cancel: &CancellationToken,
  mut progress: impl FnMut(usize, usize),
) -> Vec<TagPair> {
  let lines = split_lines(input);
  let total = lines.len();
  let mut results = Vec::with_capacity(total);

  for (done, line) in lines.into_iter().enumerate() {
    if cancel.is_cancelled() {
      break;
    }

    let item = normalize_line(&line);
    if item.is_empty() {
      progress(done + 1, total);
      continue;
    }

    // Tags the tree already knows pass through without a network call.
    let known = find_tag_paths(tree, &item);
    if !known.is_empty() {
      tracing::info!(tag = %item, group = %known[0].join(" > "), "tag already present");
      results.push(TagPair::passthrough(&item));
      progress(done + 1, total);
      continue;
    }

    // LoRA references are syntax, not language.
    if item.contains("lora:") {
      results.push(TagPair::passthrough(&item));
      progress(done + 1, total);
      continue;
    }

    match convert_line(&item, translator, cancel).await {
      Some(pair) => {
        results.push(pair);
        progress(done + 1, total);
      },
      // Cancelled mid-translation: the half-done line is dropped entirely,
      // everything produced so far is kept.
      None => break,
    }
  }

  results
}

/// Translates a single normalized line, degrading to passthrough on failure.
/// Returns `None` only when cancelled mid-translation.
async fn convert_line(
  item: &str,
  translator: &dyn Translator,
  cancel: &CancellationToken,
) -> Option<TagPair> {
  let sanitized = sanitize_input(item);
  if !validate_input(&sanitized) {
    return Some(TagPair::passthrough(item));
  }

  let (source, target) = if contains_japanese(&sanitized) {
    (Lang::Ja, Lang::En)
  } else {
    (Lang::En, Lang::Ja)
  };

  let translated = tokio::select! {
    _ = cancel.cancelled() => return None,
    result = translator.translate(&sanitized, source, target) => {
      match result {
        Ok(text) => text,
        Err(err) => {
          tracing::warn!(input = %item, error = %err, "translation failed, passing through");
          return Some(TagPair::passthrough(item));
        },
      }
    },
  };

  Some(match source {
    Lang::Ja => {
      TagPair {
        ja: item.to_string(),
        en: format_english_tag(&translated),
      }
    },
    Lang::En => {
      TagPair {
        ja: translated,
        en: format_english_tag(&sanitized),
      }
    },
  })
}
