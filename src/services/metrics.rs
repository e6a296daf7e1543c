//! Folding raw variant counters into derived rates.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AbTest, MetricsUpdate, VariantMetrics};
use crate::services::statistics::{round_to, two_proportion_confidence, ConversionSample};

/// Click-through rate in percent, two decimals. Zero impressions yield 0.
pub fn click_through_rate(clicks: u64, impressions: u64) -> f64 {
    percentage(clicks, impressions)
}

/// Conversions per click in percent, two decimals. Zero clicks yield 0.
pub fn conversion_rate(conversions: u64, clicks: u64) -> f64 {
    percentage(conversions, clicks)
}

fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round_to(numerator as f64 / denominator as f64 * 100.0, 2)
}

/// Merge cumulative counters into `current` and recompute derived rates.
///
/// Counters are running totals: a reported value lower than the stored one
/// is rejected, since it can only come from a caller sending deltas or from
/// out-of-order delivery.
pub fn apply_update(current: &VariantMetrics, update: &MetricsUpdate) -> DomainResult<VariantMetrics> {
    let impressions = merge_counter("impressions", current.impressions, update.impressions)?;
    let clicks = merge_counter("clicks", current.clicks, update.clicks)?;
    let conversions = merge_counter("conversions", current.conversions, update.conversions)?;

    let cost = match update.cost {
        Some(cost) if !cost.is_finite() || cost < 0.0 => {
            return Err(DomainError::ValidationFailed(format!(
                "cost must be a non-negative number, got {cost}"
            )));
        }
        Some(cost) => cost,
        None => current.cost,
    };

    Ok(VariantMetrics {
        impressions,
        clicks,
        conversions,
        ctr: click_through_rate(clicks, impressions),
        conversion_rate: conversion_rate(conversions, clicks),
        cost,
    })
}

fn merge_counter(name: &str, current: u64, reported: Option<u64>) -> DomainResult<u64> {
    match reported {
        Some(value) if value < current => Err(DomainError::ValidationFailed(format!(
            "{name} is cumulative and cannot decrease ({current} -> {value})"
        ))),
        Some(value) => Ok(value),
        None => Ok(current),
    }
}

/// Conversion samples used by the significance test, per impression.
pub fn conversion_samples(test: &AbTest) -> (ConversionSample, ConversionSample) {
    let a = &test.variant_a.metrics;
    let b = &test.variant_b.metrics;
    (
        ConversionSample::new(a.conversions, a.impressions),
        ConversionSample::new(b.conversions, b.impressions),
    )
}

/// Current significance of a test, `None` while data is insufficient.
pub fn test_significance(test: &AbTest) -> Option<f64> {
    let (a, b) = conversion_samples(test);
    two_proportion_confidence(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_rounded_two_decimals() {
        assert!((click_through_rate(180, 2500) - 7.2).abs() < 1e-9);
        assert!((conversion_rate(32, 180) - 17.78).abs() < 1e-9);
    }

    #[test]
    fn test_zero_denominators() {
        assert!(click_through_rate(5, 0).abs() < f64::EPSILON);
        assert!(conversion_rate(5, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_update_merges_partial() {
        let current = VariantMetrics {
            impressions: 1000,
            clicks: 50,
            conversions: 5,
            cost: 10.0,
            ..Default::default()
        };
        let update = MetricsUpdate {
            clicks: Some(80),
            ..Default::default()
        };

        let merged = apply_update(&current, &update).unwrap();
        assert_eq!(merged.impressions, 1000);
        assert_eq!(merged.clicks, 80);
        assert_eq!(merged.conversions, 5);
        assert!((merged.ctr - 8.0).abs() < 1e-9);
        assert!((merged.conversion_rate - 6.25).abs() < 1e-9);
        assert!((merged.cost - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_update_rejects_decrease() {
        let current = VariantMetrics {
            impressions: 1000,
            ..Default::default()
        };
        let update = MetricsUpdate {
            impressions: Some(10),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&current, &update),
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_apply_update_rejects_negative_cost() {
        let update = MetricsUpdate {
            cost: Some(-1.0),
            ..Default::default()
        };
        assert!(apply_update(&VariantMetrics::default(), &update).is_err());
    }
}
