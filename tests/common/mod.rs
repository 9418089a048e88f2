//! Builds throwaway git repositories with deterministic timestamps.

#![allow(dead_code)]

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const BRANCH: &str = "main";

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
    clock: i64,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Could not create temp dir");

        let mut options = RepositoryInitOptions::new();
        options.initial_head(BRANCH);
        let repo = Repository::init_opts(dir.path(), &options).expect("Could not init git repo");

        TestRepo {
            dir,
            repo,
            clock: 1_700_000_000,
        }
    }

    pub fn url(&self) -> String {
        self.dir.path().to_str().expect("Temp path is not utf-8").to_string()
    }

    fn signature(&mut self) -> Signature<'static> {
        self.clock += 60;
        Signature::new("Test User", "test@example.com", &Time::new(self.clock, 0))
            .expect("Could not create signature")
    }

    /// Writes `files` and commits them on top of HEAD.
    pub fn commit(&mut self, files: &[&str], message: &str) -> Oid {
        let signature = self.signature();
        let mut index = self.repo.index().expect("Could not get index");

        for file in files {
            let full_path = self.dir.path().join(file);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).expect("Could not create directories");
            }
            fs::write(&full_path, format!("{}\n{}\n", file, message))
                .expect("Could not write file");
            index.add_path(Path::new(file)).expect("Could not add file");
        }
        index.write().expect("Could not write index");

        let tree_id = index.write_tree().expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).expect("Could not find tree");

        let parents: Vec<Commit<'_>> = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().expect("HEAD is not a commit")],
            Err(_) => vec![],
        };
        let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

        self.repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .expect("Could not create commit")
    }

    /// Commits a tree built from the first parent's tree plus `files` at the top level.
    ///
    /// Bypasses the index, so any parents (merges, side branches) and any byte
    /// string file names can be used. `update_ref` must name a ref whose tip is
    /// the first parent, or be `None` to leave refs untouched.
    pub fn commit_tree<N: AsRef<[u8]>>(
        &mut self,
        parents: &[Oid],
        files: &[N],
        update_ref: Option<&str>,
        message: &str,
    ) -> Oid {
        let signature = self.signature();

        let parents: Vec<Commit<'_>> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("Missing parent"))
            .collect();
        let base = parents
            .first()
            .map(|parent| parent.tree().expect("Parent has no tree"));

        let mut builder = self
            .repo
            .treebuilder(base.as_ref())
            .expect("Could not create tree builder");
        for name in files {
            let blob = self.repo.blob(message.as_bytes()).expect("Could not write blob");
            builder
                .insert(name.as_ref().to_vec(), blob, 0o100644)
                .expect("Could not insert tree entry");
        }
        let tree_id = builder.write().expect("Could not write tree");
        let tree = self.repo.find_tree(tree_id).expect("Could not find tree");

        let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();
        self.repo
            .commit(
                update_ref,
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .expect("Could not create commit")
    }

    pub fn delete_tag(&self, name: &str) {
        self.repo.tag_delete(name).expect("Could not delete tag");
    }

    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).expect("Missing object");
        self.repo
            .tag_lightweight(name, &object, false)
            .expect("Could not create tag");
    }

    pub fn annotated_tag(&mut self, name: &str, target: Oid) {
        let tagger = self.signature();
        let object = self.repo.find_object(target, None).expect("Missing object");
        self.repo
            .tag(name, &object, &tagger, name, false)
            .expect("Could not create tag");
    }
}
