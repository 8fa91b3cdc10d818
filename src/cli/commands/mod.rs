mod cache;
mod init;
mod lookup;
mod stats;

pub use cache::cmd_cache_purge;
pub use init::cmd_init;
pub use lookup::cmd_lookup;
pub use stats::cmd_stats;
