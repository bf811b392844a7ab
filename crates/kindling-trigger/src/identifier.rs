//! Deployment identifier normalization.
//!
//! Turns a trigger's final name (e.g. `onMessagePublished_orderscreated`)
//! into a lowercase, hyphen-separated identifier that starts with a letter
//! and fits the service name limit (`on-message-published-orderscreated`).
//!
//! The manifest keys endpoints by this identifier and the runtime registry
//! stores registrations under it, so the two must call the same function.

use sha2::{Digest, Sha256};

use crate::error::IdentifierError;

/// Longest identifier the platform accepts.
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Hex digits of the name hash appended to truncated identifiers.
const HASH_LEN: usize = 6;

/// Normalize a raw trigger name into a deployment identifier.
///
/// Identifiers longer than [`MAX_IDENTIFIER_LEN`] are truncated and
/// suffixed with a hash of the raw name, so two long names sharing a prefix
/// still map to distinct identifiers.
pub fn normalize(raw: &str) -> Result<String, IdentifierError> {
  let split = split_case_boundaries(raw).to_ascii_lowercase();

  let mut collapsed = String::with_capacity(split.len());
  for c in split.chars() {
    if c.is_ascii_lowercase() || c.is_ascii_digit() {
      collapsed.push(c);
    } else if !collapsed.ends_with('-') {
      collapsed.push('-');
    }
  }

  let trimmed = collapsed
    .trim_start_matches(|c: char| !c.is_ascii_lowercase())
    .trim_end_matches('-');

  if trimmed.is_empty() {
    return Err(IdentifierError::Empty {
      raw: raw.to_string(),
    });
  }

  if trimmed.len() <= MAX_IDENTIFIER_LEN {
    return Ok(trimmed.to_string());
  }

  let keep = MAX_IDENTIFIER_LEN - HASH_LEN - 1;
  let prefix = trimmed[..keep].trim_end_matches('-');
  Ok(format!("{}-{}", prefix, name_hash(raw)))
}

/// Insert a hyphen wherever camelCase starts a new word.
///
/// `fooBar` splits before `B`, `HTTPServer` splits before `S`, and a digit
/// followed by an uppercase letter splits too.
fn split_case_boundaries(raw: &str) -> String {
  let chars: Vec<char> = raw.chars().collect();
  let mut out = String::with_capacity(raw.len() + 8);

  for (i, &c) in chars.iter().enumerate() {
    if i > 0 && c.is_ascii_uppercase() {
      let prev = chars[i - 1];
      let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
      if prev.is_ascii_lowercase()
        || prev.is_ascii_digit()
        || (prev.is_ascii_uppercase() && next_is_lower)
      {
        out.push('-');
      }
    }
    out.push(c);
  }

  out
}

fn name_hash(raw: &str) -> String {
  let digest = Sha256::digest(raw.as_bytes());
  let mut encoded = hex::encode(digest);
  encoded.truncate(HASH_LEN);
  encoded
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pubsub_example() {
    assert_eq!(
      normalize("onMessagePublished_orderscreated").unwrap(),
      "on-message-published-orderscreated"
    );
  }

  #[test]
  fn test_acronyms_split_before_next_word() {
    assert_eq!(normalize("HTTPServer").unwrap(), "http-server");
    assert_eq!(normalize("getURL").unwrap(), "get-url");
    assert_eq!(normalize("v2Handler").unwrap(), "v2-handler");
  }

  #[test]
  fn test_collapses_separator_runs() {
    assert_eq!(normalize("hello__world--again").unwrap(), "hello-world-again");
    assert_eq!(normalize("a.b/c{d}").unwrap(), "a-b-c-d");
  }

  #[test]
  fn test_strips_non_letter_prefix_and_trailing_hyphen() {
    assert_eq!(normalize("123_abc_").unwrap(), "abc");
    assert_eq!(normalize("-_-start").unwrap(), "start");
  }

  #[test]
  fn test_idempotent() {
    for raw in [
      "onMessagePublished_orderscreated",
      "onDocumentUpdated_usersuserIdpostspostId",
      "beforeCreate",
      "helloWorld",
    ] {
      let once = normalize(raw).unwrap();
      assert_eq!(normalize(&once).unwrap(), once);
    }
  }

  #[test]
  fn test_long_names_are_truncated_with_hash() {
    let raw = format!("onDocumentWritten_{}", "collection".repeat(10));
    let id = normalize(&raw).unwrap();

    assert_eq!(id.len(), MAX_IDENTIFIER_LEN);
    assert!(id.starts_with("on-document-written-collection"));
    assert_eq!(&id[id.len() - HASH_LEN..], &name_hash(&raw));
    assert_eq!(normalize(&id).unwrap(), id);
  }

  #[test]
  fn test_ceiling_length_is_kept() {
    let at_limit = "a".repeat(MAX_IDENTIFIER_LEN);
    assert_eq!(normalize(&at_limit).unwrap(), at_limit);

    let over = "a".repeat(MAX_IDENTIFIER_LEN + 1);
    let id = normalize(&over).unwrap();
    assert_eq!(id.len(), MAX_IDENTIFIER_LEN);
    assert_eq!(id, format!("{}-{}", "a".repeat(56), name_hash(&over)));
  }

  #[test]
  fn test_long_names_with_shared_prefix_stay_distinct() {
    let base = "a".repeat(80);
    let first = normalize(&format!("{}First", base)).unwrap();
    let second = normalize(&format!("{}Second", base)).unwrap();

    assert_ne!(first, second);
    assert!(first.len() <= MAX_IDENTIFIER_LEN);
    assert!(second.len() <= MAX_IDENTIFIER_LEN);
  }

  #[test]
  fn test_length_bound_and_letter_start() {
    let inputs = [
      "x".to_string(),
      "9lives".to_string(),
      "Z".repeat(200),
      format!("_{}", "ab-".repeat(40)),
    ];
    for raw in inputs {
      let id = normalize(&raw).unwrap();
      assert!(id.len() <= MAX_IDENTIFIER_LEN, "{id}");
      assert!(id.chars().next().unwrap().is_ascii_lowercase(), "{id}");
      assert!(!id.ends_with('-'), "{id}");
    }
  }

  #[test]
  fn test_no_letters_is_an_error() {
    assert_eq!(
      normalize("1234"),
      Err(IdentifierError::Empty {
        raw: "1234".to_string()
      })
    );
    assert!(normalize("").is_err());
  }
}
