// report.rs - Shared result type and table output
use std::time::Duration;

pub struct ThroughputResult {
    pub name: String,
    pub operations: u64,
    pub failures: u64,
    pub duration: Duration,
    pub throughput: f64,
}

impl ThroughputResult {
    pub fn new(name: &str, operations: u64, failures: u64, duration: Duration) -> Self {
        let seconds = duration.as_secs_f64();
        ThroughputResult {
            name: name.to_string(),
            operations,
            failures,
            duration,
            throughput: if seconds > 0.0 { operations as f64 / seconds } else { 0.0 },
        }
    }
}

pub fn print_results(title: &str, results: &[ThroughputResult]) {
    println!("\n=== {} ===\n", title);
    println!("{:<28} {:>12} {:>10} {:>12} {:>16}",
        "Case", "Operations", "Failures", "Time (ms)", "Throughput/s");
    println!("{}", "─".repeat(82));

    for r in results {
        println!("{:<28} {:>12} {:>10} {:>12.1} {:>16.0}",
            r.name,
            r.operations,
            r.failures,
            r.duration.as_secs_f64() * 1000.0,
            r.throughput
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_reports_zero_throughput() {
        let result = ThroughputResult::new("Binary codec", 0, 1, Duration::ZERO);
        assert_eq!(result.throughput, 0.0);

        let result = ThroughputResult::new("Binary codec", 10, 0, Duration::ZERO);
        assert!(result.throughput.is_finite());
    }

    #[test]
    fn throughput_is_operations_per_second() {
        let result = ThroughputResult::new("UDP round trip", 500, 0, Duration::from_millis(250));
        assert_eq!(result.throughput, 2000.0);
    }
}
