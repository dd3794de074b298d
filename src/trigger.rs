//! Cooldown-gated anomaly trigger.
//!
//! The controller has no timer. Whether it is armed or cooling is derived from the distance
//! between the frame being evaluated and the last frame that fired.
use crate::config::TriggerConfig;
use tracing::{info, trace};

/// Observable state of the controller at a given frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    Armed,
    Cooling { remaining: u64 },
}

#[derive(Clone, Debug)]
pub struct TriggerController {
    config: TriggerConfig,
    last_fired: Option<u64>,
}

impl TriggerController {
    /// Starts armed: the first frame is eligible immediately.
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            config,
            last_fired: None,
        }
    }

    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    pub fn last_fired_frame(&self) -> Option<u64> {
        self.last_fired
    }

    pub fn state_at(&self, frame_index: u64) -> TriggerState {
        match self.last_fired {
            Some(last) => {
                let elapsed = frame_index.saturating_sub(last);
                if elapsed >= self.config.cooldown_frames {
                    TriggerState::Armed
                } else {
                    TriggerState::Cooling {
                        remaining: self.config.cooldown_frames - elapsed,
                    }
                }
            }
            None => TriggerState::Armed,
        }
    }

    /// Whether either metric is over its threshold. Undefined metrics never are.
    pub fn exceeds(&self, motion_smoothness: Option<f64>, msi: Option<f64>) -> bool {
        motion_smoothness.is_some_and(|s| s > self.config.smoothness_threshold)
            || msi.is_some_and(|m| m > self.config.msi_threshold)
    }

    /// Decides whether `frame_index` fires, recording it as the last fired frame if so.
    pub fn evaluate(
        &mut self,
        frame_index: u64,
        motion_smoothness: Option<f64>,
        msi: Option<f64>,
    ) -> bool {
        if !self.exceeds(motion_smoothness, msi) {
            return false;
        }
        match self.state_at(frame_index) {
            TriggerState::Armed => {
                info!(
                    frame = frame_index,
                    smoothness = ?motion_smoothness,
                    msi = ?msi,
                    "Trigger fired"
                );
                self.last_fired = Some(frame_index);
                true
            }
            TriggerState::Cooling { remaining } => {
                trace!(frame = frame_index, remaining, "Trigger suppressed by cooldown");
                false
            }
        }
    }

    /// Re-arms the controller.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(cooldown_frames: u64) -> TriggerController {
        TriggerController::new(TriggerConfig {
            smoothness_threshold: 5.0,
            msi_threshold: 10.0,
            cooldown_frames,
        })
    }

    #[test]
    fn test_cooldown_scenario() {
        let mut trigger = controller(30);
        assert!(trigger.evaluate(10, Some(6.0), None));
        assert!(!trigger.evaluate(20, Some(6.0), None));
        assert_eq!(trigger.state_at(20), TriggerState::Cooling { remaining: 20 });
        assert!(trigger.evaluate(41, Some(6.0), None));
        assert_eq!(trigger.last_fired_frame(), Some(41));
    }

    #[test]
    fn test_fires_exactly_at_cooldown_boundary() {
        let mut trigger = controller(30);
        assert!(trigger.evaluate(0, None, Some(11.0)));
        assert!(!trigger.evaluate(29, None, Some(11.0)));
        assert!(trigger.evaluate(30, None, Some(11.0)));
    }

    #[test]
    fn test_undefined_metrics_never_fire() {
        let mut trigger = controller(0);
        assert!(!trigger.evaluate(1, None, None));
        assert!(!trigger.evaluate(2, Some(5.0), Some(10.0)));
        assert_eq!(trigger.last_fired_frame(), None);
    }

    #[test]
    fn test_zero_cooldown_fires_every_frame() {
        let mut trigger = controller(0);
        assert!((0..5).all(|frame| trigger.evaluate(frame, Some(9.0), None)));
    }

    #[test]
    fn test_fired_frames_respect_cooldown() {
        let cooldown = 7;
        let mut trigger = controller(cooldown);
        let fired: Vec<u64> = (0..200)
            .filter(|frame| {
                let spike = if frame % 3 == 0 { Some(20.0) } else { Some(1.0) };
                trigger.evaluate(*frame, spike, None)
            })
            .collect();
        assert!(fired.len() > 1);
        assert!(fired.windows(2).all(|w| w[1] - w[0] >= cooldown));
    }

    #[test]
    fn test_reset_rearms() {
        let mut trigger = controller(100);
        assert!(trigger.evaluate(1, Some(6.0), None));
        trigger.reset();
        assert_eq!(trigger.state_at(2), TriggerState::Armed);
        assert!(trigger.evaluate(2, Some(6.0), None));
    }
}
