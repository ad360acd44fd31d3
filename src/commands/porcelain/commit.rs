use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Record head's snapshot overlaid with the staged entries, minus staged removals
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let message = message.trim();
        if message.is_empty() {
            anyhow::bail!("Please enter a commit message.");
        }

        let signature = self.config().signature();
        let mut state = self.state_mut();

        let snapshot = {
            let head_files = state.history.head_commit()?.files();
            let mut snapshot = head_files.clone();
            snapshot.extend(
                state
                    .staging
                    .entries()
                    .map(|(name, digest)| (name.clone(), digest.clone())),
            );
            for name in state.staging.removals() {
                snapshot.remove(name);
            }

            if state.staging.is_empty() || &snapshot == head_files {
                anyhow::bail!("No changes added to the commit.");
            }
            snapshot
        };

        let commit = state
            .history
            .commit(self.hasher(), signature, message, snapshot)?
            .clone();
        let branch = state.history.current_branch().clone();
        state.staging.clear();

        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch,
            commit.id(),
            commit.short_message()
        )?;

        Ok(())
    }
}
