//! Porcelain commands
//!
//! - `init`: create the metadata directory and the root commit
//! - `add` / `rm`: stage and unstage files
//! - `commit`: record staged changes on the current branch
//! - `branch`: create, delete or list branches
//! - `checkout` / `reset`: move head and resync the working tree
//! - `merge`: fast-forward or three-way merge another branch
//! - `log` / `global-log` / `find`: inspect history
//! - `status`: staged, modified, removed and untracked files

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
