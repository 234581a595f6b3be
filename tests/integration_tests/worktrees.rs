use crate::common::TestRepo;
use treeline::git::{GitError, RefType, Repository, sort_by_path};
use treeline::naming::{DEFAULT_BRANCH_TEMPLATE, PrNameGenerator, SlugifyOptions};
use treeline::pr::{Matcher, parse_pr_list};

#[test]
fn test_main_and_branch_worktrees() {
    let repo = TestRepo::new();
    let sha = repo.commit("Initial commit");
    let wt_path = repo.add_worktree("wt-x", "feature/x");
    let wt_sha = repo.commit_in(&wt_path, "Work on x");

    let worktrees = Repository::at(repo.root_path()).list_worktrees().unwrap();
    assert_eq!(worktrees.len(), 2);

    let main = &worktrees[0];
    assert_eq!(main.path, repo.root_path());
    assert_eq!(main.branch_name(), Some("main"));
    let main_ref = main.reference.as_ref().unwrap();
    assert_eq!(main_ref.ref_type(), RefType::Branch);
    assert_eq!(main_ref.commit().sha, sha);

    let wt = &worktrees[1];
    assert_eq!(wt.path, wt_path);
    assert_eq!(wt.branch_name(), Some("feature/x"));
    assert_eq!(wt.reference.as_ref().unwrap().commit().sha, wt_sha);
    assert_eq!(
        wt.reference.as_ref().unwrap().commit().subject,
        "Work on x"
    );
}

#[test]
fn test_detached_at_tag_and_at_commit() {
    let repo = TestRepo::new();
    let tagged = repo.commit("Tagged");
    let untagged = repo.commit("Untagged");
    repo.annotated_tag("v1.0", &tagged, "Version 1.0");

    let at_tag = repo.add_detached_worktree("wt-tag", &tagged);
    let at_commit = repo.add_detached_worktree("wt-commit", &untagged);

    let worktrees = Repository::at(repo.root_path()).list_worktrees().unwrap();
    let find = |path: &std::path::Path| worktrees.iter().find(|wt| wt.path == path).unwrap();

    let tag_ref = find(&at_tag).reference.as_ref().unwrap();
    assert_eq!(tag_ref.ref_type(), RefType::Tag);
    let tag = tag_ref.tag().unwrap();
    assert_eq!(tag.name, "v1.0");
    assert_eq!(tag.commit.sha, tagged);

    let commit_ref = find(&at_commit).reference.as_ref().unwrap();
    assert_eq!(commit_ref.ref_type(), RefType::Commit);
    assert_eq!(commit_ref.commit().sha, untagged);
    assert_eq!(commit_ref.commit().subject, "Untagged");
    assert!(find(&at_commit).branch_name().is_none());
}

#[test]
fn test_bare_repository_entry() {
    let repo = TestRepo::new();
    repo.commit("Initial commit");
    let bare = repo.setup_remote();
    let wt_path = repo.sibling_path("from-bare");
    repo.run_git_in(&bare, &["worktree", "add", "-q", "-b", "side", wt_path.to_str().unwrap()]);

    let worktrees = Repository::at(&bare).list_worktrees().unwrap();
    assert_eq!(worktrees.len(), 2);
    assert!(worktrees[0].is_bare());
    assert_eq!(worktrees[0].path, bare);
    assert_eq!(worktrees[1].branch_name(), Some("side"));
}

#[test]
fn test_worktree_for_branch() {
    let repo = TestRepo::new();
    repo.commit("Initial commit");
    let wt_path = repo.add_worktree("wt-y", "feature/y");
    repo.create_branch("unused");

    let repository = Repository::at(repo.root_path());
    assert_eq!(
        repository.worktree_for_branch("feature/y").unwrap(),
        Some(wt_path)
    );
    assert_eq!(repository.worktree_for_branch("unused").unwrap(), None);
    assert_eq!(repository.worktree_for_branch("missing").unwrap(), None);
}

#[test]
fn test_listing_from_linked_worktree_matches_main() {
    let repo = TestRepo::new();
    repo.commit("Initial commit");
    let wt_path = repo.add_worktree("wt-z", "z");

    let mut from_main = Repository::at(repo.root_path()).list_worktrees().unwrap();
    let mut from_linked = Repository::at(&wt_path).list_worktrees().unwrap();
    sort_by_path(&mut from_main);
    sort_by_path(&mut from_linked);
    assert_eq!(from_main, from_linked);
}

#[test]
fn test_match_prs_against_real_worktrees() {
    let repo = TestRepo::new();
    repo.commit("Initial commit");
    let by_branch = repo.add_worktree("pr-feature-add-auth", "feature/add-auth");
    let by_template = repo.add_worktree("pr-7", "pr/7");

    let prs = parse_pr_list(
        br#"[
            {"number": 3, "headRefName": "feature/add-auth", "author": {"login": "a"}, "state": "OPEN"},
            {"number": 7, "headRefName": "fix/elsewhere", "author": {"login": "b"}, "state": "OPEN"},
            {"number": 9, "headRefName": "docs/readme", "author": {"login": "c"}, "state": "OPEN"}
        ]"#,
    )
    .unwrap();
    let worktrees = Repository::at(repo.root_path()).list_worktrees().unwrap();

    let raw = PrNameGenerator::new(DEFAULT_BRANCH_TEMPLATE, "pr-", SlugifyOptions::default()).unwrap();
    let matches = Matcher::new(&raw).match_prs(&prs, &worktrees);
    assert_eq!(matches[0].worktree_path, by_branch);
    assert!(!matches[1].has_worktree);
    assert!(!matches[2].has_worktree);

    let numbered = PrNameGenerator::new("pr/{{.Number}}", "pr-", SlugifyOptions::default()).unwrap();
    let matches = Matcher::new(&numbered).match_prs(&prs, &worktrees);
    assert_eq!(matches[0].worktree_path, by_branch);
    assert_eq!(matches[1].worktree_path, by_template);
    assert!(!matches[2].has_worktree);
}

#[test]
fn test_unborn_branch_is_reported_with_hint() {
    let repo = TestRepo::new();

    let err = Repository::at(repo.root_path()).list_worktrees().unwrap_err();
    match &err {
        GitError::WorktreeBranchNotFound { branch, path } => {
            assert_eq!(branch, "main");
            assert_eq!(path, repo.root_path());
        }
        other => panic!("expected WorktreeBranchNotFound, got {other:?}"),
    }
    assert!(err.to_string().contains("has no commits yet"));
}
