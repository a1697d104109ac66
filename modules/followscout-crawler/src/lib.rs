pub mod cache;
pub mod crawler;
pub mod directory;
pub mod frontier;
pub mod limiter;
pub mod sink;

pub use cache::{MemoryCache, NullCache, ResponseCache};
pub use crawler::{CrawlOptions, CrawlStats, Crawler};
pub use directory::{Directory, DirectoryService};
pub use frontier::{Frontier, FrontierEntry};
pub use limiter::RateLimiter;
pub use sink::ResultSink;
