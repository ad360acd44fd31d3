use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

// Terminology:
// - tracking files: every name in the staging area
// - staged but modified: staged, but the working-tree copy hashes differently now
// - staged but removed: staged, but missing from the working tree
// - untracked files: neither staged nor part of the head commit
impl Repository {
    pub fn status(&self) -> anyhow::Result<()> {
        let state = self.state();

        let mut tracking = Vec::new();
        let mut modified = Vec::new();
        let mut removed = Vec::new();

        for (file_name, digest) in state.staging.entries() {
            tracking.push(file_name.clone());

            let file_path = Path::new(file_name);
            if !self.workspace().exists(file_path) {
                removed.push(file_name.clone());
            } else if self.hasher().hash(&self.workspace().read_file(file_path)?) != *digest {
                modified.push(file_name.clone());
            }
        }

        let head_files = state.history.head_commit()?.files();
        let untracked = self
            .workspace()
            .list_files(None)?
            .iter()
            .map(|file_path| Workspace::file_name(file_path))
            .filter(|file_name| {
                state.staging.get(file_name).is_none() && !head_files.contains_key(file_name)
            })
            .collect::<BTreeSet<_>>();

        writeln!(self.writer(), "On branch {}", state.history.current_branch())?;
        writeln!(self.writer())?;

        self.status_section("Tracking files:", tracking.iter(), |name| name.green().to_string())?;
        self.status_section("Staged but modified files:", modified.iter(), |name| {
            format!("{} {}", "modified:".red(), name)
        })?;
        self.status_section("Staged but removed files:", removed.iter(), |name| {
            format!("{} {}", "deleted:".red(), name)
        })?;
        self.status_section("Untracked files:", untracked.iter(), |name| {
            name.red().to_string()
        })?;

        Ok(())
    }

    fn status_section<'n, I, F>(&self, title: &str, names: I, render: F) -> anyhow::Result<()>
    where
        I: Iterator<Item = &'n String>,
        F: Fn(&str) -> String,
    {
        writeln!(self.writer(), "{title}")?;
        for name in names {
            writeln!(self.writer(), "  {}", render(name))?;
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
