//! Numeric helpers shared by the models.

/// Specific heat of produced water, J/kg/K.
pub(crate) const WATER_HEAT_CAPACITY: f64 = 4184.0;

/// Density of produced water, kg/m3.
pub(crate) const WATER_DENSITY: f64 = 1000.0;

/// Seconds in a Julian year.
pub(crate) const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// Hours in a 365-day year.
pub(crate) const HOURS_PER_YEAR: f64 = 8760.0;

/// Error function, Abramowitz and Stegun 7.1.26 (|error| < 1.5e-7).
pub(crate) fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Time of each sample point, in years, for `lifetime` years at `steps` per year.
///
/// Includes both endpoints, so there are `lifetime * steps + 1` points.
pub(crate) fn time_axis(lifetime: i64, steps: i64) -> Vec<f64> {
    let n = lifetime * steps;
    (0..=n).map(|i| i as f64 / steps as f64).collect()
}

/// Averages `series` over each year, `steps` samples per year.
///
/// A series that runs short repeats its last value.
pub(crate) fn yearly_means(series: &[f64], lifetime: i64, steps: i64) -> Vec<f64> {
    let steps = steps.max(1) as usize;
    let Some(&last) = series.last() else {
        return vec![0.0; lifetime.max(0) as usize];
    };
    (0..lifetime.max(0) as usize)
        .map(|year| {
            let start = (year * steps).min(series.len());
            let end = ((year + 1) * steps).min(series.len());
            let window = &series[start..end];
            if window.is_empty() {
                last
            } else {
                window.iter().sum::<f64>() / window.len() as f64
            }
        })
        .collect()
}

/// Capital recovery factor at `rate` over `years`.
pub(crate) fn capital_recovery_factor(rate: f64, years: f64) -> f64 {
    if rate == 0.0 {
        1.0 / years
    } else {
        rate / (1.0 - (1.0 + rate).powf(-years))
    }
}

/// Net present value of `cash_flows`, where index 0 is undiscounted.
pub(crate) fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Internal rate of return by bisection, or NaN if NPV never changes sign.
pub(crate) fn irr(cash_flows: &[f64]) -> f64 {
    let (mut lo, mut hi) = (-0.99, 10.0);
    let (mut f_lo, f_hi) = (npv(lo, cash_flows), npv(hi, cash_flows));
    if !f_lo.is_finite() || !f_hi.is_finite() || f_lo.signum() == f_hi.signum() {
        return f64::NAN;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = npv(mid, cash_flows);
        if f_mid == 0.0 || (hi - lo) < 1e-12 {
            return mid;
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Years until cumulative cash flow turns non-negative, or NaN if it never does.
///
/// Interpolates linearly within the crossing year.
pub(crate) fn payback_period(cash_flows: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    for (year, cf) in cash_flows.iter().enumerate() {
        let before = cumulative;
        cumulative += cf;
        if cumulative >= 0.0 && year > 0 {
            return (year - 1) as f64 + (-before / cf);
        }
    }
    f64::NAN
}
