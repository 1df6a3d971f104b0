//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Remove every `<think>...</think>` block (case-insensitive tags).
/// An unterminated block swallows the rest of the text.
pub fn strip_think_blocks(s: &str) -> String {
  const OPEN: &str = "<think>";
  const CLOSE: &str = "</think>";
  let lower = s.to_ascii_lowercase();
  let mut out = String::with_capacity(s.len());
  let mut pos = 0;
  while let Some(start) = lower[pos..].find(OPEN).map(|i| i + pos) {
    out.push_str(&s[pos..start]);
    match lower[start..].find(CLOSE) {
      Some(end) => pos = start + end + CLOSE.len(),
      None => return out,
    }
  }
  out.push_str(&s[pos..]);
  out
}

/// Slice from the first `{` to the last `}` inclusive, if both exist in that order.
pub fn json_object_span(s: &str) -> Option<&str> {
  let start = s.find('{')?;
  let end = s.rfind('}')?;
  if end < start {
    return None;
  }
  Some(&s[start..=end])
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    format!("{}… ({} bytes total)", s.chars().take(max).collect::<String>(), s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn template_replaces_all_keys() {
    assert_eq!(fill_template("Quiz me on {topic}, {topic}!", &[("topic", "rust")]), "Quiz me on rust, rust!");
  }

  #[test]
  fn think_blocks_are_removed() {
    assert_eq!(strip_think_blocks("<think>hmm</think>{\"a\":1}"), "{\"a\":1}");
    assert_eq!(strip_think_blocks("a<THINK>x\ny</Think>b<think>z</think>c"), "abc");
    assert_eq!(strip_think_blocks("keep<think>never closed"), "keep");
  }

  #[test]
  fn object_span_trims_surrounding_chatter() {
    assert_eq!(json_object_span("Sure! {\"a\":{\"b\":1}} hope it helps"), Some("{\"a\":{\"b\":1}}"));
    assert_eq!(json_object_span("null"), None);
    assert_eq!(json_object_span("} {"), None);
  }

  #[test]
  fn truncation_is_char_safe() {
    assert_eq!(trunc_for_log("short", 10), "short");
    assert!(trunc_for_log("ééééé", 2).starts_with("éé…"));
  }
}
