//! Keyframed scalar tracks driving width, angle, offset and alpha over
//! global t.

use crate::config::T_EPS;

/// Monotone limiting only engages when the interval actually changes value.
const FLAT_DELTA_EPS: f64 = 1.0e-12;

/// Tangent behaviour at a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Knot {
    /// Central-difference tangent through the key.
    #[default]
    Smooth,
    /// One-sided tangents on each side (a corner in value).
    Cusp,
    /// Outgoing tangent is zero: the value eases out of the key.
    Hold,
    /// Incoming tangent is zero: the value eases into the key.
    Snap,
}

/// Interpolation between keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interp {
    Linear,
    Hermite,
    /// Hermite with Fritsch-Carlson limiting (no overshoot).
    #[default]
    HermiteMonotone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub t: f64,
    pub value: f64,
    pub knot: Knot,
    /// Easing exponent of the interval starting at this key. The outgoing
    /// tangent is scaled by `2^-alpha`.
    pub alpha: f64,
}

impl Keyframe {
    pub fn new(t: f64, value: f64) -> Self {
        Self { t, value, knot: Knot::Smooth, alpha: 0.0 }
    }

    pub fn with_knot(mut self, knot: Knot) -> Self {
        self.knot = knot;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

/// A sorted keyframe curve over t ∈ [0, 1].
///
/// Keys are clamped into [0, 1] and made strictly increasing in t (a key
/// within `T_EPS` of its predecessor is dropped). Outside the keyed range
/// the value holds at the nearest key.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTrack {
    keys: Vec<Keyframe>,
    interp: Interp,
    /// (incoming, outgoing) tangent per key, in value units per unit t.
    tangents: Vec<(f64, f64)>,
}

impl ParamTrack {
    pub fn new(mut keys: Vec<Keyframe>, interp: Interp) -> Self {
        for k in &mut keys {
            k.t = k.t.clamp(0.0, 1.0);
        }
        keys.sort_by(|a, b| a.t.total_cmp(&b.t));
        keys.dedup_by(|later, earlier| later.t - earlier.t <= T_EPS);
        let tangents = compute_tangents(&keys, interp);
        Self { keys, interp, tangents }
    }

    /// A track holding one value everywhere.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![Keyframe::new(0.0, value)], Interp::Linear)
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn interp(&self) -> Interp {
        self.interp
    }

    /// True if the track has more than one distinct value.
    pub fn is_animated(&self) -> bool {
        self.keys
            .windows(2)
            .any(|w| (w[1].value - w[0].value).abs() > FLAT_DELTA_EPS)
    }

    /// Index of the interval containing t, or `None` outside the keyed range.
    fn interval(&self, t: f64) -> Option<usize> {
        let n = self.keys.len();
        if n < 2 || t < self.keys[0].t || t >= self.keys[n - 1].t {
            return None;
        }
        Some(self.keys.partition_point(|k| k.t <= t) - 1)
    }

    pub fn value(&self, t: f64) -> f64 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t <= first.t {
            return first.value;
        }
        if t >= last.t {
            return last.value;
        }
        let Some(i) = self.interval(t) else {
            return last.value;
        };
        let (k0, k1) = (&self.keys[i], &self.keys[i + 1]);
        let dt = k1.t - k0.t;
        let s = (t - k0.t) / dt;
        match self.interp {
            Interp::Linear => k0.value + (k1.value - k0.value) * s,
            Interp::Hermite | Interp::HermiteMonotone => {
                let m0 = self.tangents[i].1;
                let m1 = self.tangents[i + 1].0;
                let s2 = s * s;
                let s3 = s2 * s;
                let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
                let h10 = s3 - 2.0 * s2 + s;
                let h01 = -2.0 * s3 + 3.0 * s2;
                let h11 = s3 - s2;
                h00 * k0.value + h10 * dt * m0 + h01 * k1.value + h11 * dt * m1
            }
        }
    }

    /// Easing exponent of the interval containing t.
    ///
    /// Before the first key this is the first key's alpha; at or after the
    /// last key it is zero.
    pub fn segment_alpha(&self, t: f64) -> f64 {
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        if t < first.t {
            return first.alpha;
        }
        match self.interval(t) {
            Some(i) => self.keys[i].alpha,
            None => 0.0,
        }
    }

    /// Key times strictly inside (0, 1).
    pub fn interior_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.keys.iter().map(|k| k.t).filter(|&t| t > 0.0 && t < 1.0)
    }
}

fn slope(a: &Keyframe, b: &Keyframe) -> f64 {
    let dt = b.t - a.t;
    if dt > 0.0 {
        (b.value - a.value) / dt
    } else {
        0.0
    }
}

fn compute_tangents(keys: &[Keyframe], interp: Interp) -> Vec<(f64, f64)> {
    let n = keys.len();
    if n < 2 || interp == Interp::Linear {
        return vec![(0.0, 0.0); n];
    }
    let mut tangents: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let left = (i > 0).then(|| slope(&keys[i - 1], &keys[i]));
            let right = (i + 1 < n).then(|| slope(&keys[i], &keys[i + 1]));
            let central = match (i > 0, i + 1 < n) {
                (true, true) => slope(&keys[i - 1], &keys[i + 1]),
                _ => left.or(right).unwrap_or(0.0),
            };
            let (mut m_in, mut m_out) = match keys[i].knot {
                Knot::Cusp => (left.unwrap_or(central), right.unwrap_or(central)),
                _ => (central, central),
            };
            match keys[i].knot {
                Knot::Hold => m_out = 0.0,
                Knot::Snap => m_in = 0.0,
                Knot::Smooth | Knot::Cusp => {}
            }
            m_out *= 2f64.powf(-keys[i].alpha);
            (m_in, m_out)
        })
        .collect();

    if interp == Interp::HermiteMonotone {
        for i in 0..n - 1 {
            let dv = keys[i + 1].value - keys[i].value;
            if dv.abs() <= FLAT_DELTA_EPS {
                tangents[i].1 = 0.0;
                tangents[i + 1].0 = 0.0;
                continue;
            }
            let delta = slope(&keys[i], &keys[i + 1]);
            let mut a = tangents[i].1 / delta;
            let mut b = tangents[i + 1].0 / delta;
            if a < 0.0 {
                a = 0.0;
            }
            if b < 0.0 {
                b = 0.0;
            }
            let sum = a * a + b * b;
            if sum > 9.0 {
                let scale = 3.0 / sum.sqrt();
                a *= scale;
                b *= scale;
            }
            tangents[i].1 = a * delta;
            tangents[i + 1].0 = b * delta;
        }
    }
    tangents
}
