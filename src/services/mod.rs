pub mod scanner;
pub mod spy_analyzer;

pub use scanner::{ScanReport, Scanner, TickerOutcome};
pub use spy_analyzer::SpyAnalyzer;
