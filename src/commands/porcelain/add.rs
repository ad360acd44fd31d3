use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use tracing::info;

impl Repository {
    pub fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        // expand every argument into the regular files below it
        let file_paths = paths
            .iter()
            .map(|path| {
                let relative_path = self.relative_path(path)?;
                Ok(self.workspace().list_files(Some(&relative_path))?)
            })
            .collect::<anyhow::Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        let contents = file_paths
            .iter()
            .map(|file_path| Ok((self.workspace().read_file(file_path)?, file_path.clone())))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut state = self.state_mut();
        let digests = state.objects.ingest(self.hasher(), contents)?;
        let names = file_paths.iter().map(|file_path| Workspace::file_name(file_path));
        state.staging.track(names.zip(digests));

        info!(files = file_paths.len(), staged = state.staging.count(), "added files");

        Ok(())
    }
}
