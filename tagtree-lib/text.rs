//! Text normalization for tag input and translation routing.

/// True if the text contains any Japanese script (kana, kanji, fullwidth
/// forms or CJK punctuation).
pub fn contains_japanese(text: &str) -> bool {
  text.chars().any(|c| {
    matches!(c,
      '\u{3000}'..='\u{303f}'   // CJK punctuation
      | '\u{3040}'..='\u{309f}' // hiragana
      | '\u{30a0}'..='\u{30ff}' // katakana
      | '\u{ff00}'..='\u{ff9f}' // fullwidth / halfwidth forms
      | '\u{4e00}'..='\u{9faf}' // CJK unified ideographs
    )
  })
}

/// Normalizes a translated phrase into canonical tag-key form: lowercased,
/// punctuation stripped, whitespace and hyphen runs collapsed to single
/// underscores, leading/trailing underscores trimmed.
pub fn format_english_tag(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut pending_separator = false;
  for c in text.chars() {
    let c = if c.is_whitespace() || c == '-' { '_' } else { c };
    if c == '_' {
      pending_separator = !out.is_empty();
      continue;
    }
    if !c.is_alphanumeric() {
      continue;
    }
    if pending_separator {
      out.push('_');
      pending_separator = false;
    }
    out.extend(c.to_lowercase());
  }
  out
}

/// Trims, drops angle brackets and collapses whitespace runs.
pub fn sanitize_input(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut last_was_space = false;
  for c in text.trim().chars() {
    if c == '<' || c == '>' {
      continue;
    }
    if c.is_whitespace() {
      if !last_was_space && !out.is_empty() {
        out.push(' ');
      }
      last_was_space = true;
    } else {
      out.push(c);
      last_was_space = false;
    }
  }
  // A run of trailing whitespace may have left one separator behind.
  out.trim_end().to_string()
}

/// Whether the text is worth sending to the translator at all: non-empty,
/// within the API size limit and not made of digits/symbols alone.
pub fn validate_input(text: &str) -> bool {
  let trimmed = text.trim();
  if trimmed.is_empty() || text.len() > 5000 {
    return false;
  }
  trimmed.chars().any(|c| c.is_alphabetic())
}
