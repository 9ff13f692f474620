//! CPU and memory limit validation
//!
//! CPU values are cgroup CFS parameters in microseconds: the container may
//! use `quota` µs of CPU time every `period` µs.

use super::{ValidationReport, ValidationResult};
use crate::models::{MemoryLimit, ResourceConfig};

pub const CPU_PERIOD_MIN: i64 = 50_000;
pub const CPU_PERIOD_MAX: i64 = 200_000;
pub const CPU_QUOTA_MIN: i64 = 10_000;
pub const CPU_QUOTA_MAX: i64 = 100_000;

pub fn validate_cpu_period(period: i64) -> ValidationResult {
    if !(CPU_PERIOD_MIN..=CPU_PERIOD_MAX).contains(&period) {
        return ValidationResult::invalid(format!(
            "CPU period must be between {} and {} microseconds",
            CPU_PERIOD_MIN, CPU_PERIOD_MAX
        ));
    }
    ValidationResult::valid()
}

pub fn validate_cpu_quota(quota: i64, period: i64) -> ValidationResult {
    if !(CPU_QUOTA_MIN..=CPU_QUOTA_MAX).contains(&quota) {
        return ValidationResult::invalid(format!(
            "CPU quota must be between {} and {} microseconds",
            CPU_QUOTA_MIN, CPU_QUOTA_MAX
        ));
    }
    if quota > period {
        return ValidationResult::invalid("Quota must be ≤ Period");
    }
    ValidationResult::valid()
}

/// Parse raw form/CLI text as a microsecond count
fn parse_micros(field: &str, raw: &str) -> Result<i64, ValidationResult> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ValidationResult::invalid(format!("{} must be a number", field)))
}

/// [`validate_cpu_period`] for unparsed text input
pub fn validate_cpu_period_input(raw_period: &str) -> ValidationResult {
    match parse_micros("CPU period", raw_period) {
        Ok(period) => validate_cpu_period(period),
        Err(result) => result,
    }
}

/// [`validate_cpu_quota`] for unparsed text input
pub fn validate_cpu_quota_input(raw_quota: &str, raw_period: &str) -> ValidationResult {
    let quota = match parse_micros("CPU quota", raw_quota) {
        Ok(quota) => quota,
        Err(result) => return result,
    };
    match parse_micros("CPU period", raw_period) {
        Ok(period) => validate_cpu_quota(quota, period),
        Err(result) => result,
    }
}

/// Swap must be at least as large as the memory limit
pub fn validate_memory_swap(swap_limit: &str, memory_limit: &str) -> ValidationResult {
    let memory = match memory_limit.parse::<MemoryLimit>() {
        Ok(memory) => memory,
        Err(_) => {
            return ValidationResult::invalid(format!("Invalid memory limit: {}", memory_limit))
        }
    };
    let swap = match swap_limit.parse::<MemoryLimit>() {
        Ok(swap) => swap,
        Err(_) => return ValidationResult::invalid(format!("Invalid swap limit: {}", swap_limit)),
    };

    if swap.bytes() < memory.bytes() {
        return ValidationResult::invalid(format!(
            "Swap limit ({}) must be greater than or equal to memory limit ({})",
            swap, memory
        ));
    }
    ValidationResult::valid()
}

/// Next larger memory option as a string; unknown input is returned unchanged
pub fn next_memory_option(current: &str) -> String {
    match current.parse::<MemoryLimit>() {
        Ok(memory) => memory.next().to_string(),
        Err(_) => current.to_string(),
    }
}

pub fn validate_resources(config: &ResourceConfig) -> ValidationReport {
    ValidationReport::from_results([
        validate_cpu_period(config.cpu_period),
        validate_cpu_quota(config.cpu_quota, config.cpu_period),
        validate_memory_swap(&config.memory_swap_limit, &config.memory_limit),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_bounds() {
        assert!(validate_cpu_period(50_000).is_valid);
        assert!(validate_cpu_period(200_000).is_valid);
        assert!(!validate_cpu_period(49_999).is_valid);
        assert!(!validate_cpu_period(200_001).is_valid);
        assert!(!validate_cpu_period(-1).is_valid);
    }

    #[test]
    fn test_period_and_quota_ranges_exhaustive() {
        for period in (CPU_PERIOD_MIN..=CPU_PERIOD_MAX).step_by(10_000) {
            assert!(validate_cpu_period(period).is_valid);
            for quota in (CPU_QUOTA_MIN..=CPU_QUOTA_MAX).step_by(5_000) {
                let result = validate_cpu_quota(quota, period);
                assert_eq!(result.is_valid, quota <= period, "quota={} period={}", quota, period);
            }
        }
    }

    #[test]
    fn test_quota_messages() {
        let result = validate_cpu_quota(60_000, 50_000);
        assert!(!result.is_valid);
        assert_eq!(result.message, "Quota must be ≤ Period");

        assert!(validate_cpu_quota(50_000, 100_000).is_valid);

        let result = validate_cpu_quota(5_000, 100_000);
        assert_eq!(
            result.message,
            "CPU quota must be between 10000 and 100000 microseconds"
        );
    }

    #[test]
    fn test_text_input() {
        assert!(validate_cpu_period_input("100000").is_valid);
        let result = validate_cpu_period_input("abc");
        assert!(!result.is_valid);
        assert_eq!(result.message, "CPU period must be a number");

        assert!(validate_cpu_quota_input(" 20000 ", "100000").is_valid);
        assert_eq!(
            validate_cpu_quota_input("20000", "").message,
            "CPU period must be a number"
        );
        assert_eq!(
            validate_cpu_quota_input("1.5", "100000").message,
            "CPU quota must be a number"
        );
    }

    #[test]
    fn test_memory_swap_all_pairs() {
        for memory in MemoryLimit::ALL {
            for swap in MemoryLimit::ALL {
                let result = validate_memory_swap(swap.as_str(), memory.as_str());
                assert_eq!(result.is_valid, swap.bytes() >= memory.bytes());
            }
        }
    }

    #[test]
    fn test_memory_swap_examples() {
        assert!(validate_memory_swap("512m", "512m").is_valid);
        assert!(!validate_memory_swap("256m", "512m").is_valid);
        assert_eq!(
            validate_memory_swap("512m", "3g").message,
            "Invalid memory limit: 3g"
        );
        assert_eq!(
            validate_memory_swap("lots", "512m").message,
            "Invalid swap limit: lots"
        );
    }

    #[test]
    fn test_next_memory_option() {
        assert_eq!(next_memory_option("64m"), "128m");
        assert_eq!(next_memory_option("768m"), "1024m");
        assert_eq!(next_memory_option("2048m"), "2048m");
        assert_eq!(next_memory_option("huge"), "huge");
    }

    #[test]
    fn test_validate_resources_aggregates() {
        let config = ResourceConfig {
            cpu_period: 40_000,
            cpu_quota: 45_000,
            memory_limit: "1024m".to_string(),
            memory_swap_limit: "512m".to_string(),
        };
        let report = validate_resources(&config);
        assert!(!report.is_valid);
        assert_eq!(report.messages.len(), 3);

        assert!(validate_resources(&ResourceConfig::default()).is_valid);
    }
}
