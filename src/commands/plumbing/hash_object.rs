use crate::areas::repository::Repository;
use anyhow::Context;
use std::io::Write;

impl Repository {
    pub fn hash_object(&self, file: &str, write: bool) -> anyhow::Result<()> {
        let file_path = self.relative_path(file)?;
        let content = self.workspace().read_file(&file_path)?;

        // hash only, nothing is stored
        if !write {
            let digest = self.hasher().hash(&content);
            writeln!(self.writer(), "{digest}")?;
            return Ok(());
        }

        let digest = self
            .state_mut()
            .objects
            .ingest(self.hasher(), [(content, file_path)])?
            .into_iter()
            .next()
            .context("ingest returned no digest")?;

        writeln!(self.writer(), "{digest}")?;

        Ok(())
    }
}
