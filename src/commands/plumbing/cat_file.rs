use crate::areas::repository::Repository;
use crate::artifacts::objects::digest::Digest;
use std::io::Write;

impl Repository {
    pub fn cat_file(&self, digest: &str) -> anyhow::Result<()> {
        let digest = Digest::try_parse(digest)?;
        let content = self.state().objects.read(&digest)?;

        self.writer().write_all(&content)?;

        Ok(())
    }
}
