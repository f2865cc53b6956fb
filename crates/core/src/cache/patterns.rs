//! Redis-style glob matching for key listings.
//!
//! Supports the same syntax as the `KEYS` command:
//!
//! - `*` matches any sequence of bytes (including none)
//! - `?` matches exactly one byte
//! - `[abc]`, `[a-z]` and `[^a]` match one byte from (or outside) a set
//! - `\x` matches `x` literally
//!
//! A `[` that is never closed is taken literally.

/// Checks if a key matches a Redis glob pattern.
///
/// # Examples
///
/// ```
/// use coolredis_core::cache::pattern_matches;
///
/// assert!(pattern_matches("session:*", "session:42"));
/// assert!(pattern_matches("h?llo", "hallo"));
/// assert!(pattern_matches("h[ae]llo", "hello"));
/// assert!(!pattern_matches("h[^e]llo", "hello"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    glob(pattern.as_bytes(), key.as_bytes())
}

/// Iterative matcher that only remembers the most recent `*`.
///
/// Every other token consumes exactly one byte, so resuming after the last
/// star is enough and the cost stays at `O(pattern * key)`.
fn glob(p: &[u8], s: &[u8]) -> bool {
    let (mut pi, mut si) = (0, 0);
    let mut resume: Option<(usize, usize)> = None;

    while pi < p.len() || si < s.len() {
        if pi < p.len() {
            if p[pi] == b'*' {
                pi += 1;
                resume = Some((pi, si));
                continue;
            }
            if let Some(&ch) = s.get(si) {
                if let Some(width) = step(&p[pi..], ch) {
                    pi += width;
                    si += 1;
                    continue;
                }
            }
        }

        match resume {
            Some((star_p, star_s)) if star_s < s.len() => {
                resume = Some((star_p, star_s + 1));
                pi = star_p;
                si = star_s + 1;
            }
            _ => return false,
        }
    }

    true
}

/// Matches the token at the start of `p` (never `*`) against `ch`.
///
/// Returns how many pattern bytes the token spans.
fn step(p: &[u8], ch: u8) -> Option<usize> {
    match p {
        [b'?', ..] => Some(1),
        [b'[', body @ ..] => match match_class(body, ch) {
            Some((true, after)) => Some(p.len() - after.len()),
            Some((false, _)) => None,
            None => (ch == b'[').then_some(1),
        },
        [b'\\', escaped, ..] => (*escaped == ch).then_some(2),
        [c, ..] => (*c == ch).then_some(1),
        [] => None,
    }
}

/// Matches `ch` against a class body (the bytes following `[`).
///
/// Returns whether it matched and the pattern left after the closing `]`,
/// or `None` when the class is unterminated.
fn match_class(mut p: &[u8], ch: u8) -> Option<(bool, &[u8])> {
    let negate = p.first() == Some(&b'^');
    if negate {
        p = &p[1..];
    }

    let mut matched = false;
    loop {
        match p {
            [] => return None,
            [b']', rest @ ..] => {
                p = rest;
                break;
            }
            [b'\\', escaped, rest @ ..] => {
                matched |= *escaped == ch;
                p = rest;
            }
            [lo, b'-', hi, rest @ ..] if *hi != b']' => {
                let (lo, hi) = if lo <= hi { (*lo, *hi) } else { (*hi, *lo) };
                matched |= (lo..=hi).contains(&ch);
                p = rest;
            }
            [c, rest @ ..] => {
                matched |= *c == ch;
                p = rest;
            }
        }
    }

    Some((matched != negate, p))
}
