use crate::areas::history::CommitGraph;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, CommitId};
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;

impl Repository {
    /// Head's history following first parents only, newest first
    pub fn log(&self) -> anyhow::Result<()> {
        let state = self.state();
        let decorations = branch_decorations(&state.history);

        for commit in state.history.first_parent_history() {
            self.display_commit(commit, &decorations)?;
            writeln!(self.writer())?;
        }

        Ok(())
    }

    /// Every commit in the repository, newest first
    pub fn global_log(&self) -> anyhow::Result<()> {
        let state = self.state();
        let decorations = branch_decorations(&state.history);

        let mut commits = state.history.commits().collect::<Vec<_>>();
        commits.sort_by(|a, b| {
            b.timestamp()
                .cmp(&a.timestamp())
                .then_with(|| a.id().cmp(b.id()))
        });

        for commit in commits {
            self.display_commit(commit, &decorations)?;
            writeln!(self.writer())?;
        }

        Ok(())
    }

    pub(crate) fn display_commit(
        &self,
        commit: &Commit,
        decorations: &HashMap<CommitId, String>,
    ) -> anyhow::Result<()> {
        let decoration = decorations
            .get(commit.id())
            .map(|names| format!(" ({names})"))
            .unwrap_or_default();

        writeln!(
            self.writer(),
            "{}{}",
            format!("commit {}", commit.id()).yellow(),
            decoration
        )?;
        if let (Some(parent), Some(second_parent)) = (commit.parent(), commit.second_parent()) {
            writeln!(
                self.writer(),
                "Merge: {} {}",
                parent.to_short(),
                second_parent.to_short()
            )?;
        }
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(self.writer(), "Date:   {}", commit.readable_timestamp())?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {}", message_line)?;
        }

        Ok(())
    }
}

/// Branch names per commit, head's branch first as `HEAD -> name`
fn branch_decorations(history: &CommitGraph) -> HashMap<CommitId, String> {
    let current = history.current_branch();
    let mut names = HashMap::<CommitId, Vec<String>>::new();

    for (branch_name, commit_id) in history.branches() {
        let entry = names.entry(commit_id.clone()).or_default();
        if branch_name == current {
            entry.insert(0, format!("{} -> {}", "HEAD".cyan(), branch_name.as_str().green()));
        } else {
            entry.push(branch_name.as_str().green().to_string());
        }
    }

    names
        .into_iter()
        .map(|(commit_id, names)| (commit_id, names.join(", ")))
        .collect()
}
