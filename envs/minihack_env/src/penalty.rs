use minihack_core::Observation;
use serde::{Deserialize, Serialize};

/// How the per-step penalty grows while game time stands still.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMode {
    /// `penalty_step` on every frozen step.
    #[default]
    Constant,
    /// `2^frozen * penalty_step`.
    Exp,
    /// `frozen^2 * penalty_step`.
    Square,
    /// `frozen * penalty_step`.
    Linear,
    /// `penalty_step` on every step.
    Always,
}

/// Penalty for steps that waste game time, plus a charge per elapsed game turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TimePenalty {
    mode: PenaltyMode,
    penalty_step: f64,
    penalty_time: f64,
    frozen_steps: u32,
}

impl TimePenalty {
    pub fn new(mode: PenaltyMode, penalty_step: f64, penalty_time: f64) -> Self {
        Self { mode, penalty_step, penalty_time, frozen_steps: 0 }
    }

    /// Consecutive steps in which game time did not advance.
    pub fn frozen_steps(&self) -> u32 { self.frozen_steps }

    pub fn reset(&mut self) { self.frozen_steps = 0; }

    pub fn apply(&mut self, previous: &Observation, observation: &Observation) -> f64 {
        let (old_time, new_time) = (previous.time(), observation.time());
        if old_time == new_time {
            self.frozen_steps += 1;
        } else {
            self.frozen_steps = 0;
        }
        let frozen = self.frozen_steps as f64;
        let mut penalty = match self.mode {
            PenaltyMode::Constant if self.frozen_steps > 0 => self.penalty_step,
            PenaltyMode::Constant => 0.0,
            PenaltyMode::Exp => 2f64.powf(frozen) * self.penalty_step,
            PenaltyMode::Square => frozen * frozen * self.penalty_step,
            PenaltyMode::Linear => frozen * self.penalty_step,
            PenaltyMode::Always => self.penalty_step,
        };
        penalty += (new_time - old_time) as f64 * self.penalty_time;
        penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_time(t: i64) -> Observation {
        let mut obs = Observation::blank();
        obs.set_time(t);
        obs
    }

    #[test]
    fn constant_only_charges_frozen_steps() {
        let mut p = TimePenalty::new(PenaltyMode::Constant, -0.01, 0.0);
        assert_eq!(p.apply(&at_time(1), &at_time(2)), 0.0);
        assert_eq!(p.apply(&at_time(2), &at_time(2)), -0.01);
        assert_eq!(p.frozen_steps(), 1);
        assert_eq!(p.apply(&at_time(2), &at_time(2)), -0.01);
        assert_eq!(p.frozen_steps(), 2);
        p.apply(&at_time(2), &at_time(3));
        assert_eq!(p.frozen_steps(), 0);
    }

    #[test]
    fn growing_modes() {
        let same = at_time(5);
        let mut exp = TimePenalty::new(PenaltyMode::Exp, -1.0, 0.0);
        let mut square = TimePenalty::new(PenaltyMode::Square, -1.0, 0.0);
        let mut linear = TimePenalty::new(PenaltyMode::Linear, -1.0, 0.0);
        let exp_seq: Vec<f64> = (0..3).map(|_| exp.apply(&same, &same)).collect();
        let square_seq: Vec<f64> = (0..3).map(|_| square.apply(&same, &same)).collect();
        let linear_seq: Vec<f64> = (0..3).map(|_| linear.apply(&same, &same)).collect();
        assert_eq!(exp_seq, vec![-2.0, -4.0, -8.0]);
        assert_eq!(square_seq, vec![-1.0, -4.0, -9.0]);
        assert_eq!(linear_seq, vec![-1.0, -2.0, -3.0]);
        // Exp charges even when time moves: 2^0 * step.
        assert_eq!(exp.apply(&at_time(5), &at_time(6)), -1.0);
    }

    #[test]
    fn always_and_time_charge() {
        let mut p = TimePenalty::new(PenaltyMode::Always, -0.5, -0.1);
        let charged = p.apply(&at_time(10), &at_time(13));
        assert!((charged - (-0.5 - 0.3)).abs() < 1e-12);
        p.reset();
        assert_eq!(p.frozen_steps(), 0);
    }
}
