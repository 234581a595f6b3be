mod tags;
mod worktrees;
