//! Per-axis response transform
//!
//! Pure math that turns one raw joystick sample into one normalized output
//! sample: sensitivity scaling, clamping, inversion, then a linear/cubic
//! blend curve.

use crate::config::AxisConfig;

/// Clamp a sample into the normalized [-1, 1] range
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

/// Linear/cubic blend response curve.
///
/// `expo` 0.0 is a linear passthrough, 1.0 is pure cubic; values in between
/// flatten the response near center while keeping full range at the
/// extremes. The stored config value is not trusted and is clamped here.
pub fn expo_blend(value: f32, expo: f32) -> f32 {
    let e = expo.clamp(0.0, 1.0);
    (1.0 - e) * value + e * value * value * value
}

/// Full per-axis transform: raw sample in, normalized sample out.
///
/// Inversion is applied to the scaled, clamped value rather than the raw
/// input, so sensitivity and clamping behave the same for both directions.
/// The closing clamp guarantees the output range regardless of curve
/// parameters. Never fails; NaN input propagates as NaN and is rejected by
/// the sinks.
pub fn transform(raw: f32, cfg: &AxisConfig) -> f32 {
    let scaled = clamp_unit(raw * cfg.sensitivity);
    let signed = if cfg.inverted { -scaled } else { scaled };
    clamp_unit(expo_blend(signed, cfg.expo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(inverted: bool, sensitivity: f32, expo: f32) -> AxisConfig {
        AxisConfig {
            source_axis: "x".to_string(),
            inverted,
            sensitivity,
            expo,
        }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-6, "{a} != {b}");
    }

    #[test]
    fn test_zero_expo_is_linear_passthrough() {
        assert_close(transform(0.5, &cfg(false, 1.0, 0.0)), 0.5);
        assert_close(transform(-0.25, &cfg(false, 1.0, 0.0)), -0.25);
    }

    #[test]
    fn test_full_expo_is_pure_cubic() {
        assert_close(transform(0.5, &cfg(false, 1.0, 1.0)), 0.125);
        assert_close(transform(-0.5, &cfg(false, 1.0, 1.0)), -0.125);
    }

    #[test]
    fn test_zero_input_stays_centered() {
        assert_close(transform(0.0, &cfg(false, 1.5, 0.7)), 0.0);
        assert_close(transform(0.0, &cfg(true, 1.5, 0.7)), 0.0);
    }

    #[test]
    fn test_sensitivity_saturates_at_range_edge() {
        assert_close(transform(0.9, &cfg(false, 1.5, 0.0)), 1.0);
        assert_close(transform(-0.9, &cfg(false, 1.5, 0.0)), -1.0);
    }

    #[test]
    fn test_inversion_negates_unsaturated_input() {
        // Holds exactly when |raw * sensitivity| < 1
        for raw in [-0.6, -0.3, 0.0, 0.2, 0.55] {
            let plain = transform(raw, &cfg(false, 1.2, 0.5));
            let flipped = transform(raw, &cfg(true, 1.2, 0.5));
            assert_close(flipped, -plain);
        }
    }

    #[test]
    fn test_out_of_range_expo_is_clamped() {
        assert_close(
            transform(0.5, &cfg(false, 1.0, 5.0)),
            transform(0.5, &cfg(false, 1.0, 1.0)),
        );
        assert_close(
            transform(0.5, &cfg(false, 1.0, -2.0)),
            transform(0.5, &cfg(false, 1.0, 0.0)),
        );
    }

    #[test]
    fn test_output_in_range_at_boundaries() {
        for raw in [-1e6, -1.0, -0.999, 0.999, 1.0, 1e6] {
            for expo in [0.0, 0.5, 1.0] {
                let out = transform(raw, &cfg(false, 3.0, expo));
                assert!((-1.0..=1.0).contains(&out), "raw={raw} expo={expo} -> {out}");
            }
        }
    }

    #[test]
    fn test_output_in_range_under_fuzz() {
        // Deterministic LCG so failures reproduce
        let mut state: u32 = 0x1234_5678;
        let mut next_unit = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1 << 24) as f32
        };

        for _ in 0..10_000 {
            let raw = next_unit() * 8.0 - 4.0;
            let sensitivity = next_unit() * 4.0 + 0.001;
            let expo = next_unit() * 1.5; // deliberately past the legal range
            let inverted = next_unit() > 0.5;
            let out = transform(raw, &cfg(inverted, sensitivity, expo));
            assert!(
                (-1.0..=1.0).contains(&out),
                "raw={raw} sens={sensitivity} expo={expo} -> {out}"
            );
        }
    }

    #[test]
    fn test_nan_propagates() {
        assert!(transform(f32::NAN, &cfg(false, 1.0, 0.5)).is_nan());
    }
}
