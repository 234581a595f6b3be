//! Message emojis and gutter formatting for user-facing error text.
//!
//! Messages are built with `color-print` tags, using the same semantic mapping
//! everywhere:
//!
//! | Semantic | color-print tag |
//! |----------|-----------------|
//! | Error    | `<red>`         |
//! | Hint     | `<dim>`         |
//! | Quoted   | `<bright-black>` gutter |

use color_print::cformat;

/// Error emoji: `cwrite!(f, "{ERROR_EMOJI} <red>message</>")`
pub const ERROR_EMOJI: &str = "❌";

/// Hint emoji: `cwrite!(f, "{HINT_EMOJI} <dim>message</>")`
pub const HINT_EMOJI: &str = "💡";

/// Info emoji for neutral context lines such as "Ran command:"
pub const INFO_EMOJI: &str = "⚪";

/// Gutter character prefixed to every line of quoted content
const GUTTER: &str = "│";

/// Quote multi-line content (stderr, commands, templates) behind a gutter.
///
/// Blank lines keep their gutter so the quoted block stays visually joined.
/// Each output line ends with a newline.
pub fn format_with_gutter(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.is_empty() {
                cformat!("<bright-black>{}</>\n", GUTTER)
            } else {
                cformat!("<bright-black>{}</> {}\n", GUTTER, line)
            }
        })
        .collect()
}
