use std::path::{Path, PathBuf};

/// Format a worktree path for messages.
///
/// Paths under the user's home directory get a leading `~`
/// (`/home/alex/ws/wt-x` -> `~/ws/wt-x`); anything else is shown as-is.
pub fn format_path_for_display(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => shorten_under(path, &home),
        None => path.display().to_string(),
    }
}

fn shorten_under(path: &Path, home: &Path) -> String {
    let Ok(stripped) = path.strip_prefix(home) else {
        return path.display().to_string();
    };

    if stripped.as_os_str().is_empty() {
        return "~".to_string();
    }

    let mut display_path = PathBuf::from("~");
    display_path.push(stripped);
    display_path.display().to_string()
}
