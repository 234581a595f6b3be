//! Text-to-slug conversion with hash-suffixed truncation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

static NON_ALPHANUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));
static DASH_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Which slug stages run, and how long the result may be.
///
/// `max-length = 0` disables truncation. When truncating, `hash-length`
/// characters of a base-36 hash are appended after a dash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SlugifyOptions {
    pub lowercase: bool,
    pub replace_non_alphanumeric: bool,
    pub collapse_dashes: bool,
    pub trim_dashes: bool,
    pub max_length: usize,
    pub hash_length: usize,
}

impl Default for SlugifyOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            replace_non_alphanumeric: true,
            collapse_dashes: true,
            trim_dashes: true,
            max_length: 0,
            hash_length: 6,
        }
    }
}

/// Turn arbitrary text into a slug.
///
/// Stages run in a fixed order, each only when enabled: lowercase, replace
/// non-alphanumeric runs with `-`, collapse dash runs, trim outer dashes.
/// An empty return means the input had nothing representable; callers must
/// check for it.
///
/// Results longer than `max_length` characters are cut and suffixed with a
/// hash of the *original* input, so inputs that only differ in what the
/// stages discard (case, punctuation) stay distinct.
///
/// # Examples
/// ```
/// use treeline::naming::{SlugifyOptions, slugify};
///
/// let opts = SlugifyOptions::default();
/// assert_eq!(slugify("Fix: the  Login bug!", &opts), "fix-the-login-bug");
/// assert_eq!(slugify("!!!", &opts), "");
/// ```
pub fn slugify(input: &str, opts: &SlugifyOptions) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut slug = input.to_string();
    if opts.lowercase {
        slug = slug.to_lowercase();
    }
    if opts.replace_non_alphanumeric {
        slug = NON_ALPHANUMERIC_RE.replace_all(&slug, "-").into_owned();
    }
    if opts.collapse_dashes {
        slug = DASH_RUN_RE.replace_all(&slug, "-").into_owned();
    }
    if opts.trim_dashes {
        slug = slug.trim_matches('-').to_string();
    }

    if opts.max_length == 0 || slug.chars().count() <= opts.max_length {
        return slug;
    }

    truncate_with_hash(&slug, input, opts.max_length, opts.hash_length)
}

fn truncate_with_hash(slug: &str, original: &str, max_length: usize, hash_length: usize) -> String {
    if hash_length == 0 {
        let kept: String = slug.chars().take(max_length).collect();
        return kept.trim_end_matches('-').to_string();
    }

    let hash = short_hash(original, hash_length);
    let reserved = hash_length + 1;
    if reserved >= max_length {
        return hash.chars().take(max_length).collect();
    }

    let kept: String = slug.chars().take(max_length - reserved).collect();
    let kept = kept.trim_end_matches('-');
    if kept.is_empty() {
        return hash;
    }
    format!("{kept}-{hash}")
}

/// First `len` base-36 characters of the SHA-256 of `input`.
fn short_hash(input: &str, len: usize) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let encoded = base36(&digest);
    let padded = format!("{encoded:0>len$}");
    padded.chars().take(len).collect()
}

/// Big-endian bytes to lowercase base 36.
fn base36(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut number: Vec<u8> = bytes.iter().copied().skip_while(|b| *b == 0).collect();
    let mut out = Vec::new();

    while !number.is_empty() {
        let mut quotient = Vec::with_capacity(number.len());
        let mut remainder: u32 = 0;
        for byte in &number {
            let acc = (remainder << 8) | u32::from(*byte);
            let q = acc / 36;
            remainder = acc % 36;
            if !(quotient.is_empty() && q == 0) {
                quotient.push(q as u8);
            }
        }
        out.push(DIGITS[remainder as usize]);
        number = quotient;
    }

    if out.is_empty() {
        out.push(b'0');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
