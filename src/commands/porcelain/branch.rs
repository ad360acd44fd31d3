use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub fn create_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        self.state_mut().history.add_branch(branch_name)?;

        Ok(())
    }

    pub fn delete_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        let commit_id = self.state_mut().history.delete_branch(branch_name)?;

        writeln!(
            self.writer(),
            "Deleted branch {} (was {}).",
            branch_name,
            commit_id.to_short()
        )?;

        Ok(())
    }

    pub fn list_branches(&self) -> anyhow::Result<()> {
        let state = self.state();
        let current = state.history.current_branch();

        for (branch_name, commit_id) in state.history.branches() {
            if branch_name == current {
                writeln!(
                    self.writer(),
                    "* {} {}",
                    branch_name.as_str().green(),
                    commit_id.to_short()
                )?;
            } else {
                writeln!(self.writer(), "  {} {}", branch_name, commit_id.to_short())?;
            }
        }

        Ok(())
    }
}
