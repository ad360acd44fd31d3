use crate::areas::persistence::EngineState;
use crate::areas::repository::Repository;
use crate::areas::workspace::WorkingTreeSync;
use std::io::Write;

impl Repository {
    pub fn checkout(&self, branch_name: &str) -> anyhow::Result<()> {
        let mut state = self.state_mut();

        state.history.switch_branch_to(branch_name)?;
        self.sync_working_tree(&state)?;
        state.staging.clear();

        writeln!(self.writer(), "Switched to branch '{branch_name}'")?;

        Ok(())
    }

    /// Overwrite working-tree files with the head commit's snapshot
    pub(crate) fn sync_working_tree(&self, state: &EngineState) -> anyhow::Result<()> {
        let head = state.history.head_commit()?;
        self.workspace().sync_to(head.files(), &state.objects)?;

        Ok(())
    }
}
