//! Answer grader — approximate string matching for free-text trivia
//! answers.
//!
//! Exact equality is too brittle for trivia (articles, punctuation,
//! partial phrasing), so grading takes the best of two 0–100 similarity
//! scores: a whole-string Levenshtein ratio and a partial ratio that
//! rewards the submitted text being contained within the canonical text
//! (or vice versa). Pure and deterministic; no side effects.

/// Default acceptance threshold on the 0–100 similarity scale.
pub const DEFAULT_THRESHOLD: u8 = 80;

/// Returns `true` iff `submitted` matches `canonical` closely enough.
///
/// Both strings are trimmed and lowercased before scoring. The answer is
/// accepted iff `max(ratio, partial_ratio) >= threshold`.
pub fn grade(submitted: &str, canonical: &str, threshold: u8) -> bool {
  let a = normalize(submitted);
  let b = normalize(canonical);
  ratio(&a, &b).max(partial_ratio(&a, &b)) >= u32::from(threshold)
}

fn normalize(s: &str) -> Vec<char> {
  s.trim().to_lowercase().chars().collect()
}

/// Whole-string similarity: `100 * (max_len - distance) / max_len`.
/// Two empty strings score 100.
fn ratio(a: &[char], b: &[char]) -> u32 {
  let max_len = a.len().max(b.len());
  if max_len == 0 {
    return 100;
  }
  let dist = levenshtein(a, b);
  (100 * (max_len - dist) / max_len) as u32
}

/// Best [`ratio`] of the shorter string against every window of the same
/// length in the longer string. A submission that is an exact substring of
/// the canonical answer scores 100.
fn partial_ratio(a: &[char], b: &[char]) -> u32 {
  let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
  if short.is_empty() {
    return if long.is_empty() { 100 } else { 0 };
  }
  long
    .windows(short.len())
    .map(|window| ratio(short, window))
    .max()
    .unwrap_or(0)
}

/// Character-level Levenshtein edit distance, two-row DP.
fn levenshtein(a: &[char], b: &[char]) -> usize {
  if a.is_empty() {
    return b.len();
  }
  if b.is_empty() {
    return a.len();
  }

  let mut prev: Vec<usize> = (0..=b.len()).collect();
  let mut curr = vec![0usize; b.len() + 1];

  for (i, ca) in a.iter().enumerate() {
    curr[0] = i + 1;
    for (j, cb) in b.iter().enumerate() {
      let cost = usize::from(ca != cb);
      curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
    }
    std::mem::swap(&mut prev, &mut curr);
  }

  prev[b.len()]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn levenshtein_basics() {
    assert_eq!(levenshtein(&['c', 'a', 't'], &['c', 'a', 't']), 0);
    assert_eq!(levenshtein(&['c', 'a', 't'], &['b', 'a', 't']), 1);
    assert_eq!(levenshtein(&['c', 'a', 't'], &['c', 'a', 'r', 's']), 2);
    assert_eq!(levenshtein(&[], &['a', 'b', 'c']), 3);
  }

  #[test]
  fn exact_match_passes() {
    assert!(grade("Albert Einstein", "Albert Einstein", DEFAULT_THRESHOLD));
  }

  #[test]
  fn case_and_whitespace_are_ignored() {
    assert!(grade("  albert einstein ", "Albert Einstein", DEFAULT_THRESHOLD));
  }

  #[test]
  fn key_term_of_longer_answer_passes_via_partial_ratio() {
    // The submitted text is an exact substring of the canonical answer.
    assert!(grade("einstein", "Albert Einstein", DEFAULT_THRESHOLD));
  }

  #[test]
  fn minor_typo_passes() {
    assert!(grade("Paris.", "Paris", DEFAULT_THRESHOLD));
    assert!(grade("Missisippi", "Mississippi", DEFAULT_THRESHOLD));
  }

  #[test]
  fn unrelated_answer_fails() {
    assert!(!grade("Isaac Newton", "Albert Einstein", DEFAULT_THRESHOLD));
    assert!(!grade("blue", "photosynthesis", DEFAULT_THRESHOLD));
  }

  #[test]
  fn empty_submission_never_passes_against_nonempty_canonical() {
    assert!(!grade("", "Albert Einstein", DEFAULT_THRESHOLD));
    assert!(!grade("   ", "x", 1));
  }

  #[test]
  fn empty_vs_empty_scores_full() {
    assert!(grade("", "", DEFAULT_THRESHOLD));
  }

  #[test]
  fn grading_is_deterministic() {
    for _ in 0..3 {
      assert!(grade("einstein", "Albert Einstein", DEFAULT_THRESHOLD));
      assert!(!grade("bohr", "Albert Einstein", DEFAULT_THRESHOLD));
    }
  }

  #[test]
  fn threshold_is_respected() {
    // "cat" vs "bat": ratio 66, partial 66.
    assert!(grade("cat", "bat", 60));
    assert!(!grade("cat", "bat", 80));
  }
}
