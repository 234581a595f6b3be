use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A throwaway git repository with a pinned identity and clock.
pub struct TestRepo {
    temp_dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    /// Fresh repository on `main` with no commits.
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let temp_dir = TempDir::new().unwrap();
        // Canonicalize so paths match what `git worktree list` reports (macOS /private/var)
        let root = temp_dir.path().join("repo");
        std::fs::create_dir(&root).unwrap();
        let root = root.canonicalize().unwrap();

        let repo = Self { temp_dir, root };
        repo.run_git(&["init", "-q", "-b", "main"]);
        repo
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Directory next to the repository, for worktrees and remotes.
    pub fn sibling_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().canonicalize().unwrap().join(name)
    }

    pub fn git_command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(dir)
            .env("GIT_CONFIG_GLOBAL", "/dev/null")
            .env("GIT_CONFIG_SYSTEM", "/dev/null")
            .env("GIT_AUTHOR_NAME", "Test User")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_AUTHOR_DATE", "2025-01-01T00:00:00Z")
            .env("GIT_COMMITTER_NAME", "Test User")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_DATE", "2025-01-01T00:00:00Z");
        cmd
    }

    /// Run git in `dir` and return trimmed stdout, panicking on failure.
    pub fn run_git_in(&self, dir: &Path, args: &[&str]) -> String {
        let output = self.git_command(dir).args(args).output().unwrap();
        assert!(
            output.status.success(),
            "git {} failed:\n{}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    pub fn run_git(&self, args: &[&str]) -> String {
        self.run_git_in(&self.root, args)
    }

    /// Empty commit on the current branch; returns its sha.
    pub fn commit(&self, message: &str) -> String {
        self.run_git(&["commit", "-q", "--allow-empty", "-m", message]);
        self.run_git(&["rev-parse", "HEAD"])
    }

    pub fn commit_in(&self, dir: &Path, message: &str) -> String {
        self.run_git_in(dir, &["commit", "-q", "--allow-empty", "-m", message]);
        self.run_git_in(dir, &["rev-parse", "HEAD"])
    }

    pub fn create_branch(&self, name: &str) {
        self.run_git(&["branch", name]);
    }

    /// Worktree at a sibling directory with a new branch `branch`.
    pub fn add_worktree(&self, dir_name: &str, branch: &str) -> PathBuf {
        let path = self.sibling_path(dir_name);
        self.run_git(&["worktree", "add", "-q", "-b", branch, path.to_str().unwrap()]);
        path
    }

    /// Worktree at a sibling directory with HEAD detached at `target`.
    pub fn add_detached_worktree(&self, dir_name: &str, target: &str) -> PathBuf {
        let path = self.sibling_path(dir_name);
        self.run_git(&["worktree", "add", "-q", "--detach", path.to_str().unwrap(), target]);
        path
    }

    pub fn lightweight_tag(&self, name: &str, target: &str) {
        self.run_git(&["tag", name, target]);
    }

    pub fn annotated_tag(&self, name: &str, target: &str, message: &str) {
        self.run_git(&["tag", "-a", name, "-m", message, target]);
    }

    /// Bare clone of this repository registered as `origin`, with `main` fetched
    /// and `origin/HEAD` set.
    pub fn setup_remote(&self) -> PathBuf {
        let remote = self.sibling_path("origin.git");
        self.run_git(&["clone", "-q", "--bare", ".", remote.to_str().unwrap()]);
        self.run_git(&["remote", "add", "origin", remote.to_str().unwrap()]);
        self.run_git(&["fetch", "-q", "origin"]);
        self.run_git(&["remote", "set-head", "origin", "main"]);
        remote
    }
}
