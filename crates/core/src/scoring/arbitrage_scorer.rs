//! Composite arbitrage score with a hard risk veto.

use log::debug;
use rust_decimal::Decimal;

use super::scoring_model::{
    AdjustmentKind, ArbitrageScore, Assessment, ScoreAdjustment, ScoreSignal, ScoringConfig,
};

#[derive(Debug, Clone, Default)]
pub struct ArbitrageScorer {
    config: ScoringConfig,
}

impl ArbitrageScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores a sourcing candidate.
    ///
    /// The mispricing bonus and the decline penalty are independent checks
    /// and both apply when both conditions hold.
    pub fn score(&self, signal: &ScoreSignal) -> ArbitrageScore {
        let config = &self.config;
        let mut score = config.base_score;
        let mut adjustments = Vec::new();
        let mut apply = |score: &mut Decimal, kind: AdjustmentKind, delta: Decimal| {
            *score += delta;
            adjustments.push(ScoreAdjustment { kind, delta });
        };

        if signal.discount_ratio() >= config.mispricing_discount_threshold
            && signal.short_window_drop_ratio > config.drop_ratio_threshold
        {
            apply(&mut score, AdjustmentKind::MispricingBonus, config.mispricing_bonus);
        }

        if signal.discontinued && signal.open_offer_count <= config.scarcity_max_open_offers {
            apply(&mut score, AdjustmentKind::ScarcityBonus, config.scarcity_bonus);
        }

        if signal.sustained_decline {
            apply(&mut score, AdjustmentKind::DeclinePenalty, -config.decline_penalty);
        }

        if signal.is_high_risk() {
            let delta = -score;
            apply(&mut score, AdjustmentKind::RiskVeto, delta);
            debug!("Candidate vetoed by high risk assessment");
            return ArbitrageScore {
                score: Decimal::ZERO,
                vetoed: true,
                adjustments,
            };
        }

        if signal.potential == Some(Assessment::High) {
            apply(&mut score, AdjustmentKind::PotentialBonus, config.potential_bonus);
        }

        if score < Decimal::ZERO {
            let delta = -score;
            apply(&mut score, AdjustmentKind::Clamped, delta);
        }

        if let Some(cap) = config.score_cap {
            if score > cap {
                let delta = cap - score;
                apply(&mut score, AdjustmentKind::Capped, delta);
            }
        }

        ArbitrageScore {
            score,
            vetoed: false,
            adjustments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn neutral() -> ScoreSignal {
        ScoreSignal {
            current_price: dec!(100),
            trailing_average_price: dec!(100),
            short_window_drop_ratio: dec!(0),
            open_offer_count: 10,
            discontinued: false,
            sustained_decline: false,
            risk: None,
            potential: None,
        }
    }

    fn mispriced() -> ScoreSignal {
        ScoreSignal {
            current_price: dec!(60),
            short_window_drop_ratio: dec!(0.35),
            ..neutral()
        }
    }

    #[test]
    fn test_neutral_signal_scores_base() {
        let result = ArbitrageScorer::default().score(&neutral());
        assert_eq!(result.score, dec!(50));
        assert!(result.adjustments.is_empty());
        assert!(!result.vetoed);
    }

    #[test]
    fn test_mispricing_requires_both_conditions() {
        let scorer = ArbitrageScorer::default();
        assert_eq!(scorer.score(&mispriced()).score, dec!(80));

        let discount_only = ScoreSignal {
            short_window_drop_ratio: dec!(0.1),
            ..mispriced()
        };
        assert_eq!(scorer.score(&discount_only).score, dec!(50));

        let drop_only = ScoreSignal {
            current_price: dec!(90),
            ..mispriced()
        };
        assert_eq!(scorer.score(&drop_only).score, dec!(50));
    }

    #[test]
    fn test_scarcity_bonus() {
        let scorer = ArbitrageScorer::default();
        let scarce = ScoreSignal {
            discontinued: true,
            open_offer_count: 3,
            ..neutral()
        };
        assert_eq!(scorer.score(&scarce).score, dec!(65));

        let crowded = ScoreSignal {
            open_offer_count: 4,
            ..scarce
        };
        assert_eq!(scorer.score(&crowded).score, dec!(50));
    }

    #[test]
    fn test_mispricing_and_decline_are_additive() {
        let signal = ScoreSignal {
            sustained_decline: true,
            ..mispriced()
        };
        let result = ArbitrageScorer::default().score(&signal);

        assert_eq!(result.score, dec!(65));
        assert!(result.has(AdjustmentKind::MispricingBonus));
        assert!(result.has(AdjustmentKind::DeclinePenalty));
    }

    #[test]
    fn test_high_risk_vetoes_everything() {
        let signal = ScoreSignal {
            discontinued: true,
            open_offer_count: 0,
            risk: Some(Assessment::High),
            potential: Some(Assessment::High),
            ..mispriced()
        };
        let result = ArbitrageScorer::default().score(&signal);

        assert_eq!(result.score, Decimal::ZERO);
        assert!(result.vetoed);
        assert!(result.has(AdjustmentKind::RiskVeto));
        assert!(!result.has(AdjustmentKind::PotentialBonus));
    }

    #[test]
    fn test_potential_bonus_only_when_high() {
        let scorer = ArbitrageScorer::default();
        let high = ScoreSignal {
            potential: Some(Assessment::High),
            ..neutral()
        };
        let medium = ScoreSignal {
            potential: Some(Assessment::Medium),
            ..neutral()
        };
        assert_eq!(scorer.score(&high).score, dec!(55));
        assert_eq!(scorer.score(&medium).score, dec!(50));
    }

    #[test]
    fn test_clamped_at_zero() {
        let scorer = ArbitrageScorer::new(ScoringConfig {
            decline_penalty: dec!(80),
            ..ScoringConfig::default()
        });
        let signal = ScoreSignal {
            sustained_decline: true,
            ..neutral()
        };
        let result = scorer.score(&signal);
        assert_eq!(result.score, Decimal::ZERO);
        assert!(result.has(AdjustmentKind::Clamped));
    }

    #[test]
    fn test_no_upper_bound_unless_capped() {
        let signal = ScoreSignal {
            discontinued: true,
            open_offer_count: 1,
            potential: Some(Assessment::High),
            ..mispriced()
        };
        assert_eq!(ArbitrageScorer::default().score(&signal).score, dec!(100));

        let generous = ArbitrageScorer::new(ScoringConfig {
            mispricing_bonus: dec!(45),
            ..ScoringConfig::default()
        });
        assert_eq!(generous.score(&signal).score, dec!(115));

        let capped = ArbitrageScorer::new(ScoringConfig {
            mispricing_bonus: dec!(45),
            score_cap: Some(dec!(100)),
            ..ScoringConfig::default()
        });
        let result = capped.score(&signal);
        assert_eq!(result.score, dec!(100));
        assert!(result.has(AdjustmentKind::Capped));
    }
}
