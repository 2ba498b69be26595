//! Obstacle decisions expressed as station/lateral footprints

use serde::{Deserialize, Serialize};

/// What the path must do about an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionIntent {
    /// The footprint may not be entered
    Block,
    /// Pass by, keeping at least `margin` lateral clearance when possible
    Nudge { margin: f64 },
    /// No influence on the path
    Ignore,
}

/// One obstacle decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleDecision {
    pub id: String,
    pub start_s: f64,
    pub end_s: f64,
    /// right edge of the footprint
    pub start_l: f64,
    /// left edge of the footprint
    pub end_l: f64,
    pub intent: DecisionIntent,
}

impl ObstacleDecision {
    pub fn new(
        id: &str,
        (start_s, end_s): (f64, f64),
        (start_l, end_l): (f64, f64),
        intent: DecisionIntent,
    ) -> Self {
        Self {
            id: id.to_string(),
            start_s: start_s.min(end_s),
            end_s: start_s.max(end_s),
            start_l: start_l.min(end_l),
            end_l: start_l.max(end_l),
            intent,
        }
    }

    pub fn block(id: &str, s_range: (f64, f64), l_range: (f64, f64)) -> Self {
        Self::new(id, s_range, l_range, DecisionIntent::Block)
    }

    pub fn nudge(id: &str, s_range: (f64, f64), l_range: (f64, f64), margin: f64) -> Self {
        Self::new(id, s_range, l_range, DecisionIntent::Nudge { margin })
    }

    /// Whether the footprint intersects the closed station interval
    pub fn overlaps_station(&self, start_s: f64, end_s: f64) -> bool {
        self.start_s <= end_s && start_s <= self.end_s
    }

    pub fn contains_station(&self, s: f64) -> bool {
        self.start_s <= s && s <= self.end_s
    }

    /// Lateral distance from `l` to the footprint grown by `buffer`; 0 inside
    pub fn lateral_clearance(&self, l: f64, buffer: f64) -> f64 {
        let lo = self.start_l - buffer;
        let hi = self.end_l + buffer;
        if l < lo {
            lo - l
        } else if l > hi {
            l - hi
        } else {
            0.0
        }
    }
}

/// Read-only set of decisions for one planning cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionData {
    decisions: Vec<ObstacleDecision>,
}

impl DecisionData {
    pub fn new(decisions: Vec<ObstacleDecision>) -> Self {
        Self { decisions }
    }

    pub fn add(&mut self, decision: ObstacleDecision) {
        self.decisions.push(decision);
    }

    pub fn decisions(&self) -> &[ObstacleDecision] {
        &self.decisions
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// Non-ignored decisions whose station range meets `[start_s, end_s]`
    pub fn relevant(&self, start_s: f64, end_s: f64) -> impl Iterator<Item = &ObstacleDecision> {
        self.decisions.iter().filter(move |d| {
            d.intent != DecisionIntent::Ignore && d.overlaps_station(start_s, end_s)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_ranges() {
        let d = ObstacleDecision::block("a", (20.0, 10.0), (1.0, -1.0));
        assert_eq!((d.start_s, d.end_s), (10.0, 20.0));
        assert_eq!((d.start_l, d.end_l), (-1.0, 1.0));
    }

    #[test]
    fn test_lateral_clearance() {
        let d = ObstacleDecision::nudge("a", (0.0, 5.0), (0.5, 1.5), 1.0);
        assert_eq!(d.lateral_clearance(1.0, 0.0), 0.0);
        assert!((d.lateral_clearance(-0.5, 0.0) - 1.0).abs() < 1e-12);
        assert!((d.lateral_clearance(2.0, 0.25) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_relevant_skips_ignored() {
        let data = DecisionData::new(vec![
            ObstacleDecision::block("a", (10.0, 12.0), (-1.0, 1.0)),
            ObstacleDecision::new("b", (10.0, 12.0), (-1.0, 1.0), DecisionIntent::Ignore),
            ObstacleDecision::block("c", (40.0, 42.0), (-1.0, 1.0)),
        ]);
        let ids: Vec<&str> = data.relevant(0.0, 11.0).map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }
}
