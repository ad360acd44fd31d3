use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the id of every commit whose message is exactly `message`
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let state = self.state();
        let mut matches = state
            .history
            .commits()
            .filter(|commit| commit.message() == message)
            .collect::<Vec<_>>();
        matches.sort_by_key(|commit| commit.timestamp());

        if matches.is_empty() {
            writeln!(self.writer(), "Found no commit with that message.")?;
            return Ok(());
        }

        for commit in matches {
            writeln!(self.writer(), "{}", commit.id())?;
        }

        Ok(())
    }
}
