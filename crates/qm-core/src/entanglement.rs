use serde::{Deserialize, Serialize};

use crate::constants::UNDEFINED_CORRELATION;
use crate::state::{EmotionState, MemoryVector};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntanglementAnalysis {
    /// |correlation| · entanglement_measure · coherence_measure, in [0, 1].
    pub entanglement_strength: f64,
    /// Pearson correlation of magnitudes, in [-1, 1].
    pub correlation: f64,
}

/// Correlate memory and emotion magnitudes.
///
/// The first min(|memory|, |emotion|) components of each side are compared.
/// Zero variance on either side (including the zero memory vector) gives the
/// fixed 0.5 correlation.
pub fn analyze(memory: &MemoryVector, emotion: &EmotionState) -> EntanglementAnalysis {
    let n = memory.dimension().min(emotion.dimension());
    let xs: Vec<f64> = memory.components.magnitudes().take(n).collect();
    let ys: Vec<f64> = emotion.amplitudes.magnitudes().take(n).collect();

    let correlation = pearson(&xs, &ys).unwrap_or(UNDEFINED_CORRELATION);
    let strength = correlation.abs()
        * memory.entanglement_measure.clamp(0.0, 1.0)
        * emotion.coherence_measure.clamp(0.0, 1.0);

    EntanglementAnalysis {
        entanglement_strength: strength.clamp(0.0, 1.0),
        correlation,
    }
}

/// Pearson correlation, or None when undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    // relative threshold: float noise on a constant series is not variance
    let scale = (mx.abs() + my.abs()).max(1.0);
    if vx <= 1e-24 * scale || vy <= 1e-24 * scale {
        return None;
    }
    let r = cov / (vx.sqrt() * vy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}
