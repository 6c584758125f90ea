//! Final report printing

use crate::crawler::{CrawlOutcome, CrawlReport};

/// Prints the end-of-run summary to stdout
pub fn print_report(report: &CrawlReport) {
    match report.outcome {
        CrawlOutcome::TargetReached => {
            println!(
                "Found {} flags in {:.3} seconds",
                report.flags.len(),
                report.elapsed.as_secs_f64()
            );
        }
        CrawlOutcome::FrontierExhausted => {
            println!(
                "Frontier exhausted after {:.3} seconds with {} flags found",
                report.elapsed.as_secs_f64(),
                report.flags.len()
            );
        }
    }
    println!("Collected {} secret flags", report.flags.len());
    for flag in &report.flags {
        println!("  {}", flag);
    }
}
