//! Easing functions for interpolation links
//!
//! Every link carries one [`InterpolationMode`]. The mode warps the link's
//! normalized progress before the values are blended.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::AnimationError;

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;
const BOUNCE_N1: f32 = 7.5625;
const BOUNCE_D1: f32 = 2.75;

/// Interpolation mode applied to a link's normalized progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    SmoothStep,
    SmootherStep,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInCirc,
    EaseOutCirc,
    EaseInOutCirc,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    CubicBezier(f32, f32, f32, f32),
}

impl InterpolationMode {
    /// Every named mode, in menu order
    pub const ALL: [InterpolationMode; 27] = [
        InterpolationMode::Linear,
        InterpolationMode::EaseInQuad,
        InterpolationMode::EaseOutQuad,
        InterpolationMode::EaseInOutQuad,
        InterpolationMode::EaseInCubic,
        InterpolationMode::EaseOutCubic,
        InterpolationMode::EaseInOutCubic,
        InterpolationMode::SmoothStep,
        InterpolationMode::SmootherStep,
        InterpolationMode::EaseInSine,
        InterpolationMode::EaseOutSine,
        InterpolationMode::EaseInOutSine,
        InterpolationMode::EaseInExpo,
        InterpolationMode::EaseOutExpo,
        InterpolationMode::EaseInOutExpo,
        InterpolationMode::EaseInCirc,
        InterpolationMode::EaseOutCirc,
        InterpolationMode::EaseInOutCirc,
        InterpolationMode::EaseInBack,
        InterpolationMode::EaseOutBack,
        InterpolationMode::EaseInOutBack,
        InterpolationMode::EaseInElastic,
        InterpolationMode::EaseOutElastic,
        InterpolationMode::EaseInOutElastic,
        InterpolationMode::EaseInBounce,
        InterpolationMode::EaseOutBounce,
        InterpolationMode::EaseInOutBounce,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0)
    ///
    /// Endpoints are always exact. Back and elastic modes overshoot in
    /// between.
    pub fn apply(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match self {
            InterpolationMode::Linear => t,
            InterpolationMode::EaseInQuad => t * t,
            InterpolationMode::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            InterpolationMode::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            InterpolationMode::EaseInCubic => t * t * t,
            InterpolationMode::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            InterpolationMode::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            InterpolationMode::SmoothStep => t * t * (3.0 - 2.0 * t),
            InterpolationMode::SmootherStep => t * t * t * (t * (6.0 * t - 15.0) + 10.0),
            InterpolationMode::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            InterpolationMode::EaseOutSine => (t * PI / 2.0).sin(),
            InterpolationMode::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            InterpolationMode::EaseInExpo => 2f32.powf(10.0 * t - 10.0),
            InterpolationMode::EaseOutExpo => 1.0 - 2f32.powf(-10.0 * t),
            InterpolationMode::EaseInOutExpo => {
                if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            InterpolationMode::EaseInCirc => 1.0 - (1.0 - t * t).sqrt(),
            InterpolationMode::EaseOutCirc => (1.0 - (t - 1.0).powi(2)).sqrt(),
            InterpolationMode::EaseInOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            InterpolationMode::EaseInBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
            InterpolationMode::EaseOutBack => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            InterpolationMode::EaseInOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }
            InterpolationMode::EaseInElastic => {
                -(2f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
            }
            InterpolationMode::EaseOutElastic => {
                2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
            }
            InterpolationMode::EaseInOutElastic => {
                if t < 0.5 {
                    -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                } else {
                    (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin())
                        / 2.0
                        + 1.0
                }
            }
            InterpolationMode::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            InterpolationMode::EaseOutBounce => bounce_out(t),
            InterpolationMode::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            InterpolationMode::CubicBezier(x1, y1, x2, y2) => {
                cubic_bezier_ease(t, *x1, *y1, *x2, *y2)
            }
        }
    }

    /// Stable kebab-case name, as used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMode::Linear => "linear",
            InterpolationMode::EaseInQuad => "ease-in-quad",
            InterpolationMode::EaseOutQuad => "ease-out-quad",
            InterpolationMode::EaseInOutQuad => "ease-in-out-quad",
            InterpolationMode::EaseInCubic => "ease-in-cubic",
            InterpolationMode::EaseOutCubic => "ease-out-cubic",
            InterpolationMode::EaseInOutCubic => "ease-in-out-cubic",
            InterpolationMode::SmoothStep => "smooth-step",
            InterpolationMode::SmootherStep => "smoother-step",
            InterpolationMode::EaseInSine => "ease-in-sine",
            InterpolationMode::EaseOutSine => "ease-out-sine",
            InterpolationMode::EaseInOutSine => "ease-in-out-sine",
            InterpolationMode::EaseInExpo => "ease-in-expo",
            InterpolationMode::EaseOutExpo => "ease-out-expo",
            InterpolationMode::EaseInOutExpo => "ease-in-out-expo",
            InterpolationMode::EaseInCirc => "ease-in-circ",
            InterpolationMode::EaseOutCirc => "ease-out-circ",
            InterpolationMode::EaseInOutCirc => "ease-in-out-circ",
            InterpolationMode::EaseInBack => "ease-in-back",
            InterpolationMode::EaseOutBack => "ease-out-back",
            InterpolationMode::EaseInOutBack => "ease-in-out-back",
            InterpolationMode::EaseInElastic => "ease-in-elastic",
            InterpolationMode::EaseOutElastic => "ease-out-elastic",
            InterpolationMode::EaseInOutElastic => "ease-in-out-elastic",
            InterpolationMode::EaseInBounce => "ease-in-bounce",
            InterpolationMode::EaseOutBounce => "ease-out-bounce",
            InterpolationMode::EaseInOutBounce => "ease-in-out-bounce",
            InterpolationMode::CubicBezier(..) => "cubic-bezier",
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationMode::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
            mode => f.write_str(mode.name()),
        }
    }
}

impl FromStr for InterpolationMode {
    type Err = AnimationError;

    /// Parses a mode name, or `cubic-bezier(x1,y1,x2,y2)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(args) = s
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<f32> = args
                .split(',')
                .map(|p| p.trim().parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|_| AnimationError::UnknownMode(s.to_string()))?;
            return match parts.as_slice() {
                [x1, y1, x2, y2] => Ok(InterpolationMode::CubicBezier(*x1, *y1, *x2, *y2)),
                _ => Err(AnimationError::UnknownMode(s.to_string())),
            };
        }

        InterpolationMode::ALL
            .iter()
            .find(|mode| mode.name() == s)
            .copied()
            .ok_or_else(|| AnimationError::UnknownMode(s.to_string()))
    }
}

fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

/// Solve a CSS-style cubic-bezier timing curve for the given x.
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
/// Computes in f64 internally to avoid f32 precision jitter.
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let x = t as f64;
    let x1 = x1 as f64;
    let y1 = y1 as f64;
    let x2 = x2 as f64;
    let y2 = y2 as f64;

    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2) as f32
}

/// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³, in Horner form
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_exact_for_every_mode() {
        for mode in InterpolationMode::ALL {
            assert_eq!(mode.apply(0.0), 0.0, "{mode} at 0");
            assert_eq!(mode.apply(1.0), 1.0, "{mode} at 1");
        }
    }

    #[test]
    fn test_power_curves() {
        assert_eq!(InterpolationMode::Linear.apply(0.3), 0.3);
        assert_eq!(InterpolationMode::EaseInQuad.apply(0.5), 0.25);
        assert_eq!(InterpolationMode::EaseOutQuad.apply(0.5), 0.75);
        assert_eq!(InterpolationMode::EaseInCubic.apply(0.5), 0.125);
        assert_eq!(InterpolationMode::EaseOutCubic.apply(0.5), 0.875);
    }

    #[test]
    fn test_in_out_modes_are_symmetric_at_half() {
        for mode in [
            InterpolationMode::EaseInOutQuad,
            InterpolationMode::EaseInOutCubic,
            InterpolationMode::SmoothStep,
            InterpolationMode::SmootherStep,
            InterpolationMode::EaseInOutSine,
            InterpolationMode::EaseInOutExpo,
            InterpolationMode::EaseInOutCirc,
            InterpolationMode::EaseInOutBounce,
        ] {
            assert!((mode.apply(0.5) - 0.5).abs() < 1e-4, "{mode}");
        }
    }

    #[test]
    fn test_back_overshoots() {
        assert!(InterpolationMode::EaseInBack.apply(0.2) < 0.0);
        assert!(InterpolationMode::EaseOutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn test_bounce_out_stays_in_unit_range() {
        for i in 0..=100 {
            let v = InterpolationMode::EaseOutBounce.apply(i as f32 / 100.0);
            assert!((0.0..=1.0001).contains(&v), "{v}");
        }
    }

    #[test]
    fn test_cubic_bezier_linear_control_points() {
        let mode = InterpolationMode::CubicBezier(0.25, 0.25, 0.75, 0.75);
        for i in 1..10 {
            let t = i as f32 / 10.0;
            assert!((mode.apply(t) - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for mode in InterpolationMode::ALL {
            assert_eq!(mode.name().parse::<InterpolationMode>().unwrap(), mode);
        }
        assert_eq!(
            "cubic-bezier(0.1, 0.2, 0.3, 0.4)"
                .parse::<InterpolationMode>()
                .unwrap(),
            InterpolationMode::CubicBezier(0.1, 0.2, 0.3, 0.4)
        );
        assert!("ease-sideways".parse::<InterpolationMode>().is_err());
    }
}
