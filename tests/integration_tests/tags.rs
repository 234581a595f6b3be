use crate::common::TestRepo;
use treeline::git::Repository;

#[test]
fn test_lightweight_and_annotated_tags() {
    let repo = TestRepo::new();
    let first = repo.commit("First release");
    let second = repo.commit("Second release");
    repo.lightweight_tag("v0.1", &first);
    repo.annotated_tag("v0.2", &second, "Release 0.2");

    let tags = Repository::at(repo.root_path()).list_tags().unwrap();
    assert_eq!(tags.len(), 2);

    let light = &tags[0];
    assert_eq!(light.name, "v0.1");
    assert!(!light.is_annotated());
    assert_eq!(light.commit.sha, first);
    assert_eq!(light.commit.subject, "First release");
    assert_eq!(light.commit.committed_by, "Test User");
    assert_eq!(light.tagged_on, None);
    // Lightweight tags date from their commit
    assert_eq!(light.date(), light.commit.committed_on);

    let annotated = &tags[1];
    assert_eq!(annotated.name, "v0.2");
    assert!(annotated.is_annotated());
    // The commit is the dereferenced target, not the tag object
    assert_eq!(annotated.commit.sha, second);
    assert_eq!(annotated.commit.subject, "Second release");
    assert_eq!(annotated.commit.committed_by, "Test User");
    assert_eq!(annotated.message, "Release 0.2");
    assert_eq!(annotated.tagger_name, "Test User");
    assert!(annotated.tagger_email.contains("test@example.com"));
    assert!(annotated.tagged_on.is_some());
}

#[test]
fn test_no_tags() {
    let repo = TestRepo::new();
    repo.commit("Initial commit");

    let tags = Repository::at(repo.root_path()).list_tags().unwrap();
    assert!(tags.is_empty());
}

#[test]
fn test_tag_of_a_tag_resolves_to_commit() {
    let repo = TestRepo::new();
    let base = repo.commit("Base commit");
    repo.annotated_tag("inner", &base, "inner msg");
    repo.annotated_tag("outer", "inner", "outer msg");

    let tags = Repository::at(repo.root_path()).list_tags().unwrap();
    let outer = tags.iter().find(|t| t.name == "outer").unwrap();

    assert!(outer.is_annotated());
    assert_eq!(outer.message, "outer msg");
    assert_eq!(outer.commit.sha, base);
    assert_eq!(outer.commit.subject, "Base commit");
    assert_eq!(outer.commit.committed_by, "Test User");
    assert!(outer.commit.committed_on.is_some());
}

#[test]
fn test_detached_worktree_at_nested_tag_target() {
    let repo = TestRepo::new();
    let base = repo.commit("Base commit");
    repo.commit("Later");
    repo.annotated_tag("z-inner", &base, "inner msg");
    // Sorts first, so it wins the commit once peeled
    repo.annotated_tag("a-outer", "z-inner", "outer msg");
    let wt_path = repo.add_detached_worktree("wt-nested", &base);

    let worktrees = Repository::at(repo.root_path()).list_worktrees().unwrap();
    let wt = worktrees.iter().find(|wt| wt.path == wt_path).unwrap();
    let tag = wt.reference.as_ref().unwrap().tag().unwrap();
    assert_eq!(tag.name, "a-outer");
    assert_eq!(tag.commit.sha, base);
}
