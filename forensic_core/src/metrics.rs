//! Collision summaries: minimum TTC, closest approach, risk windows, and the
//! pairwise TTC matrix shown on the case overview.

use crate::kinematics::{INITIAL_SEPARATION, TTC_CAP};
use crate::types::ClosingSample;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Reduced view of one pair's closing series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollisionSummary {
    /// Smallest TTC over the series (TTC_CAP when empty). Can exceed the cap
    /// while the pair is still far apart.
    pub min_ttc: f64,
    /// Time at which `min_ttc` first occurs
    pub min_ttc_time: Option<f64>,
    /// Closest approach (INITIAL_SEPARATION when empty)
    pub min_distance: f64,
    pub first_risk_time: Option<f64>,
    /// Number of samples flagged as risky
    pub risk_samples: usize,
    /// Maximal runs of consecutive risky samples, as (start, end) times
    pub risk_windows: Vec<(f64, f64)>,
}

impl Default for CollisionSummary {
    fn default() -> Self {
        Self {
            min_ttc: TTC_CAP,
            min_ttc_time: None,
            min_distance: INITIAL_SEPARATION,
            first_risk_time: None,
            risk_samples: 0,
            risk_windows: Vec::new(),
        }
    }
}

impl CollisionSummary {
    pub fn from_closing(samples: &[ClosingSample]) -> Self {
        let mut summary = Self::default();
        let mut open: Option<(f64, f64)> = None;

        for s in samples {
            if summary.min_ttc_time.is_none() || s.ttc < summary.min_ttc {
                summary.min_ttc = s.ttc;
                summary.min_ttc_time = Some(s.time);
            }
            summary.min_distance = summary.min_distance.min(s.distance);

            if s.risk {
                summary.risk_samples += 1;
                summary.first_risk_time.get_or_insert(s.time);
                open = match open {
                    Some((start, _)) => Some((start, s.time)),
                    None => Some((s.time, s.time)),
                };
            } else if let Some(window) = open.take() {
                summary.risk_windows.push(window);
            }
        }
        if let Some(window) = open {
            summary.risk_windows.push(window);
        }

        summary
    }

    pub fn has_risk(&self) -> bool {
        self.risk_samples > 0
    }
}

/// Symmetric `n × n` matrix of per-pair minimum TTC. The diagonal and pairs
/// not listed are `None` (not evaluated), so they never read as a measured
/// TTC. Pairs with an index outside `0..n` are ignored.
pub fn pairwise_ttc_matrix(n: usize, pairs: &[(usize, usize, f64)]) -> DMatrix<Option<f64>> {
    let mut m = DMatrix::from_element(n, n, None);
    for &(i, j, ttc) in pairs {
        if i < n && j < n && i != j {
            m[(i, j)] = Some(ttc);
            m[(j, i)] = Some(ttc);
        }
    }
    m
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, distance: f64, ttc: f64, risk: bool) -> ClosingSample {
        ClosingSample {
            time,
            distance,
            ttc,
            risk,
        }
    }

    #[test]
    fn empty_series_is_safe() {
        let s = CollisionSummary::from_closing(&[]);
        assert_eq!(s, CollisionSummary::default());
        assert!(!s.has_risk());
    }

    #[test]
    fn risk_windows_are_contiguous_runs() {
        let series = vec![
            sample(0.0, 40.0, 5.0, false),
            sample(0.1, 18.0, 2.0, true),
            sample(0.2, 15.0, 1.5, true),
            sample(0.3, 30.0, 10.0, false),
            sample(0.4, 10.0, 1.0, true),
        ];
        let s = CollisionSummary::from_closing(&series);
        assert_eq!(s.risk_samples, 3);
        assert_eq!(s.first_risk_time, Some(0.1));
        assert_eq!(s.risk_windows, vec![(0.1, 0.2), (0.4, 0.4)]);
        assert_eq!(s.min_ttc, 1.0);
        assert_eq!(s.min_ttc_time, Some(0.4));
        assert_eq!(s.min_distance, 10.0);
    }

    #[test]
    fn capped_series_reports_first_sample_time() {
        let series = vec![sample(0.0, 50.0, TTC_CAP, false), sample(0.1, 50.0, TTC_CAP, false)];
        let s = CollisionSummary::from_closing(&series);
        assert_eq!(s.min_ttc_time, Some(0.0));
        assert!(s.risk_windows.is_empty());
    }

    #[test]
    fn ttc_matrix_is_symmetric() {
        let m = pairwise_ttc_matrix(3, &[(0, 2, 1.25), (1, 2, 33.3), (5, 0, 0.1)]);
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m[(0, 2)], Some(1.25));
        assert_eq!(m[(2, 0)], Some(1.25));
        // a measured TTC above the cap stays distinct from "not evaluated"
        assert_eq!(m[(1, 2)], Some(33.3));
        assert_eq!(m[(0, 1)], None);
        assert_eq!(m[(1, 1)], None);
        assert_eq!(m, m.transpose());
    }
}
