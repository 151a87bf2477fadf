/// Equated monthly installment for `principal` at `annual_rate` percent over `tenure_months`.
///
/// The annuity denominator `1 - (1 + r)^-n` is formed in log space, so long tenures settle at
/// `principal * r` instead of overflowing. When the rate is zero, or too small to register
/// against 1.0, the principal is amortized evenly.
pub fn monthly_installment(principal: f64, annual_rate: f64, tenure_months: i32) -> f64 {
    let periods = f64::from(tenure_months);
    let monthly_rate = annual_rate / (12.0 * 100.0);
    if monthly_rate == 0.0 {
        return principal / periods;
    }

    let discount = -(-periods * monthly_rate.ln_1p()).exp_m1();
    if discount == 0.0 || !discount.is_finite() {
        return principal / periods;
    }
    principal * monthly_rate / discount
}

/// Round to two decimal places for reporting.
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
