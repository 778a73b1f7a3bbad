use serde::{Deserialize, Serialize};

/// Pod-wide settings captured in the charter step, plus the running spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodConfig {
    pub name: String,
    pub goal: String,
    pub approval_rule: String,
    pub budget: f64,
    /// Only ever grows while the pod is live.
    pub current_spend: f64,
}

impl PodConfig {
    pub fn with_budget(budget: f64) -> Self {
        Self {
            name: String::new(),
            goal: String::new(),
            approval_rule: String::new(),
            budget,
            current_spend: 0.0,
        }
    }

    /// Spend as a percentage of budget, clamped to 100.
    pub fn spend_percent(&self) -> f64 {
        if self.budget <= 0.0 {
            return 100.0;
        }
        (self.current_spend / self.budget * 100.0).min(100.0)
    }

    pub fn accrue(&mut self, amount: f64) {
        if amount > 0.0 {
            self.current_spend += amount;
        }
    }
}

impl Default for PodConfig {
    fn default() -> Self {
        Self::with_budget(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_percent_is_clamped() {
        let mut pod = PodConfig::with_budget(10.0);
        pod.accrue(2.5);
        assert_eq!(pod.spend_percent(), 25.0);
        pod.accrue(50.0);
        assert_eq!(pod.spend_percent(), 100.0);
    }

    #[test]
    fn accrue_never_decreases_spend() {
        let mut pod = PodConfig::default();
        pod.accrue(1.0);
        pod.accrue(-5.0);
        assert_eq!(pod.current_spend, 1.0);
    }
}
