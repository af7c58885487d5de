//! Simple interest with a one-entry cache.

/// The three inputs the interest depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterestTerms {
    pub principal: f64,
    /// Percent per month.
    pub rate: f64,
    pub months: f64,
}

impl InterestTerms {
    pub fn new(principal: f64, rate: f64, months: f64) -> Self {
        Self {
            principal,
            rate,
            months,
        }
    }

    /// `principal * rate * months / 100`
    pub fn interest(&self) -> f64 {
        (self.principal * self.rate * self.months) / 100.0
    }
}

/// Remembers the last terms and their result. Asking again with equal terms
/// returns the cached value without recomputing.
#[derive(Debug, Default)]
pub struct InterestCalculator {
    last: Option<(InterestTerms, f64)>,
    computations: u64,
}

impl InterestCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interest(&mut self, principal: f64, rate: f64, months: f64) -> f64 {
        self.for_terms(InterestTerms::new(principal, rate, months))
    }

    pub fn for_terms(&mut self, terms: InterestTerms) -> f64 {
        if let Some((cached, value)) = self.last {
            if cached == terms {
                return value;
            }
        }
        let value = terms.interest();
        self.computations += 1;
        self.last = Some((terms, value));
        value
    }

    /// How many times the formula actually ran.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
