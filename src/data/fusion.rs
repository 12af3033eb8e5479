//! The model/baseline blending rule applied upstream to produce `pm25_final`.
//!
//! The viewer never recomputes forecasts; it uses this module to check that a
//! loaded document is self-consistent and to synthesize sample documents.

use super::model::Forecast;

/// Trust given to the model when it agrees with the baseline.
pub const MAX_TRUST: f64 = 0.9;
/// Floor for the model trust when the two disagree strongly.
pub const MIN_TRUST: f64 = 0.15;
/// Absolute disagreement (µg/m³) at which trust bottoms out.
pub const TRUST_SPAN: f64 = 150.0;

/// Adaptive model weight: linear decay from 0.9 to 0.15 as the gap to the
/// baseline grows to 150 µg/m³, rounded to two decimals.
pub fn trust_weight(model: f64, baseline: f64) -> f64 {
    let decay = ((model - baseline).abs() / TRUST_SPAN).min(1.0);
    let raw = MAX_TRUST - (MAX_TRUST - MIN_TRUST) * decay;
    (raw.max(MIN_TRUST) * 100.0).round() / 100.0
}

/// `trust * model + (1 - trust) * baseline`.
pub fn blend(model: f64, baseline: f64, trust: f64) -> f64 {
    trust * model + (1.0 - trust) * baseline
}

/// One horizon of a blended sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendStep {
    pub model: f64,
    pub baseline: f64,
    pub trust: f64,
    /// Blended value clipped at zero.
    pub value: f64,
}

/// Blend a sequence of model predictions against sequential baselines.
///
/// The first baseline is `current`; every later one is the previous blended
/// value. Without a current reading the model is trusted fully and the
/// recorded baseline is 0.
pub fn blend_horizons(model_preds: &[f64], current: Option<f64>) -> Vec<BlendStep> {
    let Some(mut baseline) = current else {
        return model_preds
            .iter()
            .map(|&model| BlendStep {
                model,
                baseline: 0.0,
                trust: 1.0,
                value: model.max(0.0),
            })
            .collect();
    };

    model_preds
        .iter()
        .map(|&model| {
            let trust = trust_weight(model, baseline);
            let blended = blend(model, baseline, trust);
            let step = BlendStep {
                model,
                baseline,
                trust,
                value: blended.max(0.0),
            };
            baseline = blended;
            step
        })
        .collect()
}

/// A forecast whose stored final value disagrees with its own inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionMismatch {
    pub horizon_hours: u32,
    pub expected: f64,
    pub stored: f64,
}

/// Check a stored forecast against the blending invariant.
///
/// With a zero baseline the final value must equal the raw model value and
/// the trust must be 1.0.
pub fn check_forecast(forecast: &Forecast, tolerance: f64) -> Result<(), FusionMismatch> {
    let expected = if forecast.pm25_baseline_cpcb > 0.0 {
        blend(
            forecast.pm25_model_raw,
            forecast.pm25_baseline_cpcb,
            forecast.trust_model,
        )
        .max(0.0)
    } else {
        forecast.pm25_model_raw.max(0.0)
    };

    let trust_ok = forecast.pm25_baseline_cpcb > 0.0 || (forecast.trust_model - 1.0).abs() < 1e-9;
    if trust_ok && (expected - forecast.pm25_final).abs() <= tolerance {
        Ok(())
    } else {
        Err(FusionMismatch {
            horizon_hours: forecast.horizon_hours,
            expected,
            stored: forecast.pm25_final,
        })
    }
}
