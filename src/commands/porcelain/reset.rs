use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Point the current branch at `revision` (a commit id or unique prefix of one)
    pub fn reset(&self, revision: &str) -> anyhow::Result<()> {
        let mut state = self.state_mut();

        let commit_id = state.history.resolve_commit(revision)?;
        state.history.reset_current_branch_to(&commit_id)?;
        self.sync_working_tree(&state)?;
        state.staging.clear();

        let head = state.history.head_commit()?;
        writeln!(
            self.writer(),
            "HEAD is now at {} {}",
            head.id().to_short(),
            head.short_message()
        )?;

        Ok(())
    }
}
