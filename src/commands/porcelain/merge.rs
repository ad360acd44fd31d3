use crate::areas::history::MergeOutcome;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn merge(&self, branch_name: &str) -> anyhow::Result<()> {
        let signature = self.config().signature();
        let mut state = self.state_mut();

        if state.history.current_branch().as_str() == branch_name {
            anyhow::bail!("Cannot merge a branch with itself.");
        }

        let outcome = state
            .history
            .merge_branch(self.hasher(), signature, branch_name)?;

        match outcome {
            MergeOutcome::AlreadyUpToDate => {
                writeln!(self.writer(), "Already up to date.")?;
                return Ok(());
            }
            MergeOutcome::FastForward { from, to } => {
                writeln!(self.writer(), "Updating {}..{}", from.to_short(), to.to_short())?;
                writeln!(self.writer(), "Fast-forward")?;
            }
            MergeOutcome::Merged { commit, base } => {
                writeln!(
                    self.writer(),
                    "Merge made by the 'three-way' strategy: {} (base {})",
                    commit,
                    base.to_short()
                )?;
            }
        }

        self.sync_working_tree(&state)?;
        state.staging.clear();

        Ok(())
    }
}
