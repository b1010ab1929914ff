//! Binomial probabilities for operating-characteristic figures
//!
//! Acceptance numbers in the sampling tables never exceed a handful, so the
//! CDF is summed term by term in log space rather than through a gamma
//! function.

/// Probability of drawing zero defectives: `(1 - p)^n`
pub fn prob_zero(n: u64, p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    (1.0 - p).powf(n as f64)
}

/// `ln(n choose k)`, accumulated as a product of `k` ratios
fn ln_choose(n: u64, k: u64) -> f64 {
    (0..k)
        .map(|i| ((n - i) as f64).ln() - ((i + 1) as f64).ln())
        .sum()
}

/// Probability mass `P(X = k)` for `X ~ Binomial(n, p)`
pub fn pmf(k: u64, n: u64, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    let ln_p = ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln();
    ln_p.exp()
}

/// Cumulative probability `P(X <= c)` for `X ~ Binomial(n, p)`
pub fn cdf(c: u64, n: u64, p: f64) -> f64 {
    if c >= n {
        return 1.0;
    }
    let total: f64 = (0..=c).map(|k| pmf(k, n, p)).sum();
    total.clamp(0.0, 1.0)
}
