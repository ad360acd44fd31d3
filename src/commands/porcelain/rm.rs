use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use std::path::Path;
use tracing::{debug, info};

impl Repository {
    /// Unstage a file and drop its stored copy once nothing else refers to it
    ///
    /// A file that is part of head's snapshot is also marked for removal, so
    /// the next commit leaves it out. The working-tree file itself is left alone.
    pub fn rm(&self, file: &str) -> anyhow::Result<()> {
        let file_name = Workspace::file_name(Path::new(file));

        let mut state = self.state_mut();
        let committed = state.history.head_commit()?.files().contains_key(&file_name);

        let unstaged = if committed {
            info!(file = %file_name, "staged removal");
            state.staging.stage_removal(&file_name)
        } else {
            Some(state.staging.untrack(&file_name)?)
        };
        let Some(digest) = unstaged else {
            return Ok(());
        };

        let still_staged = state.staging.entries().any(|(_, staged)| *staged == digest);
        if still_staged || state.history.references_digest(&digest) {
            debug!(file = %file_name, digest = %digest.to_short(), "stored copy still referenced");
            return Ok(());
        }

        if state.objects.contains(&digest) {
            state.objects.remove(&digest)?;
        }

        Ok(())
    }
}
