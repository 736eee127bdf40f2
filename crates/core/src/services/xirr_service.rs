use chrono::NaiveDate;
use log::debug;

use crate::errors::CoreError;
use crate::models::analytics::{SolveMethod, XirrReport};
use crate::models::event::CashFlow;
use crate::models::settings::SolverConfig;

/// Day-count basis: actual/365.
const DAYS_PER_YEAR: f64 = 365.0;

/// Relative tolerance used by Brent's method on top of the absolute one.
const BRENT_RTOL: f64 = 4.0 * f64::EPSILON;

/// Accepted |NPV| at a secant result, relative to the gross cash flow.
const SECANT_RESIDUAL: f64 = 1e-6;

/// Net present value of `flows` at `rate`, discounting from the earliest date.
///
/// Returns `+inf` for `rate <= -1`, where the discount factor stops being
/// positive, so bracket searches degrade instead of failing.
#[must_use]
pub fn npv(flows: &[CashFlow], rate: f64) -> f64 {
    let Some(first) = flows.iter().map(|f| f.date).min() else {
        return 0.0;
    };
    NpvCurve::new(flows, first).at(rate)
}

/// Cash flows with their year fractions precomputed.
struct NpvCurve {
    terms: Vec<(f64, f64)>,
}

impl NpvCurve {
    fn new(flows: &[CashFlow], first: NaiveDate) -> Self {
        Self {
            terms: flows
                .iter()
                .map(|f| (f.amount, (f.date - first).num_days() as f64 / DAYS_PER_YEAR))
                .collect(),
        }
    }

    fn at(&self, rate: f64) -> f64 {
        if rate <= -1.0 {
            return f64::INFINITY;
        }
        let base = 1.0 + rate;
        self.terms.iter().map(|(amount, t)| amount / base.powf(*t)).sum()
    }
}

/// Money-weighted annualized return (XIRR).
///
/// Stateless: every call is a pure function of the cash flows it is given.
pub struct XirrService {
    config: SolverConfig,
}

impl XirrService {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Full report for a ledger's cash flows valued at `terminal_value` on
    /// `terminal_date`. `flows` must not already contain the valuation.
    pub fn report(
        &self,
        flows: &[CashFlow],
        terminal_date: NaiveDate,
        terminal_value: f64,
    ) -> Result<XirrReport, CoreError> {
        let mut all = Vec::with_capacity(flows.len() + 1);
        all.extend_from_slice(flows);
        all.push(CashFlow::new(terminal_date, terminal_value));

        let earliest = all.iter().map(|f| f.date).min().unwrap_or(terminal_date);
        if terminal_date <= earliest {
            return Err(CoreError::DateOrder {
                earliest,
                terminal: terminal_date,
            });
        }

        let (rate, method) = self.solve(&all)?;

        let total_contributed: f64 = all.iter().filter(|f| f.amount < 0.0).map(|f| -f.amount).sum();
        let total_returned: f64 = all.iter().filter(|f| f.amount > 0.0).map(|f| f.amount).sum();

        Ok(XirrReport {
            rate,
            profit: total_returned - total_contributed,
            total_contributed,
            total_returned,
            method,
            terminal_date,
            terminal_value,
        })
    }

    /// Solve `NPV(r) = 0` for a complete set of cash flows.
    ///
    /// Errors:
    /// - `DateOrder` when every flow falls on a single date
    /// - `SignMismatch` without both a negative and a positive amount
    /// - `NonConvergence` when neither root finder succeeds
    pub fn solve(&self, flows: &[CashFlow]) -> Result<(f64, SolveMethod), CoreError> {
        let (Some(earliest), Some(latest)) = (
            flows.iter().map(|f| f.date).min(),
            flows.iter().map(|f| f.date).max(),
        ) else {
            return Err(CoreError::SignMismatch);
        };
        if latest <= earliest {
            return Err(CoreError::DateOrder {
                earliest,
                terminal: latest,
            });
        }
        let has_outflow = flows.iter().any(|f| f.amount < 0.0);
        let has_inflow = flows.iter().any(|f| f.amount > 0.0);
        if !(has_outflow && has_inflow) {
            return Err(CoreError::SignMismatch);
        }

        let curve = NpvCurve::new(flows, earliest);

        if let Some(rate) = self.brent(&curve) {
            return Ok((rate, SolveMethod::Bracketed));
        }

        debug!(
            "No sign change over [{}, {}]; falling back to secant from {}",
            self.config.lower_bound, self.config.upper_bound, self.config.secant_seed
        );

        let scale: f64 = flows.iter().map(|f| f.amount.abs()).sum();
        match self.secant(&curve) {
            Some(rate) if rate > -1.0 && curve.at(rate).abs() <= SECANT_RESIDUAL * scale.max(1.0) => {
                Ok((rate, SolveMethod::Secant))
            }
            Some(rate) => Err(CoreError::NonConvergence(format!(
                "secant iteration ended at {rate} without zeroing the NPV"
            ))),
            None => Err(CoreError::NonConvergence(format!(
                "no sign change in [{}, {}] and secant failed after {} iterations",
                self.config.lower_bound, self.config.upper_bound, self.config.secant_max_iterations
            ))),
        }
    }

    /// Brent's method over the configured bracket. `None` when the bracket
    /// has no sign change or the iteration budget runs out.
    fn brent(&self, curve: &NpvCurve) -> Option<f64> {
        let xtol = self.config.tolerance;

        let mut xpre = self.config.lower_bound;
        let mut xcur = self.config.upper_bound;
        let mut fpre = curve.at(xpre);
        let mut fcur = curve.at(xcur);

        if fpre.is_nan() || fcur.is_nan() || fpre * fcur > 0.0 {
            return None;
        }
        if fpre == 0.0 {
            return Some(xpre);
        }
        if fcur == 0.0 {
            return Some(xcur);
        }

        let (mut xblk, mut fblk) = (0.0, 0.0);
        let (mut spre, mut scur) = (0.0_f64, 0.0_f64);

        for _ in 0..self.config.max_iterations {
            if fpre * fcur < 0.0 {
                xblk = xpre;
                fblk = fpre;
                spre = xcur - xpre;
                scur = spre;
            }
            if fblk.abs() < fcur.abs() {
                xpre = xcur;
                xcur = xblk;
                xblk = xpre;
                fpre = fcur;
                fcur = fblk;
                fblk = fpre;
            }

            let delta = (xtol + BRENT_RTOL * xcur.abs()) / 2.0;
            let sbis = (xblk - xcur) / 2.0;
            if fcur == 0.0 || sbis.abs() < delta {
                return Some(xcur);
            }

            if spre.abs() > delta && fcur.abs() < fpre.abs() {
                let stry = if xpre == xblk {
                    // secant
                    -fcur * (xcur - xpre) / (fcur - fpre)
                } else {
                    // inverse quadratic interpolation
                    let dpre = (fpre - fcur) / (xpre - xcur);
                    let dblk = (fblk - fcur) / (xblk - xcur);
                    -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
                };
                if stry.is_finite() && 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                    spre = scur;
                    scur = stry;
                } else {
                    spre = sbis;
                    scur = sbis;
                }
            } else {
                spre = sbis;
                scur = sbis;
            }

            xpre = xcur;
            fpre = fcur;
            if scur.abs() > delta {
                xcur += scur;
            } else {
                xcur += if sbis > 0.0 { delta } else { -delta };
            }
            fcur = curve.at(xcur);
            if fcur.is_nan() {
                return None;
            }
        }

        None
    }

    /// Derivative-free secant iteration from the configured seed.
    fn secant(&self, curve: &NpvCurve) -> Option<f64> {
        let seed = self.config.secant_seed;
        let tol = self.config.secant_tolerance;

        let mut p0 = seed;
        let mut p1 = seed * (1.0 + 1e-4) + if seed >= 0.0 { 1e-4 } else { -1e-4 };
        let mut q0 = curve.at(p0);
        let mut q1 = curve.at(p1);
        if q1.abs() < q0.abs() {
            std::mem::swap(&mut p0, &mut p1);
            std::mem::swap(&mut q0, &mut q1);
        }

        for _ in 0..self.config.secant_max_iterations {
            if !q0.is_finite() && !q1.is_finite() {
                return None;
            }
            if q1 == q0 {
                // flat step; the residual check decides whether this is a root
                return Some((p0 + p1) / 2.0);
            }
            let p = if q1.abs() > q0.abs() {
                (-q0 / q1 * p1 + p0) / (1.0 - q0 / q1)
            } else {
                (-q1 / q0 * p0 + p1) / (1.0 - q1 / q0)
            };
            if !p.is_finite() {
                return None;
            }
            if (p - p1).abs() < tol {
                return Some(p);
            }
            p0 = p1;
            q0 = q1;
            p1 = p;
            q1 = curve.at(p1);
        }

        None
    }
}
