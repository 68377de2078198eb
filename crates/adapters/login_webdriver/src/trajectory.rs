//! Drag-trajectory synthesis for the slider captcha.
//!
//! The portal scores the pointer path, so a single linear move gets the
//! attempt rejected. The synthesized path decelerates toward the target the
//! way a hand does: each step covers a random fraction of the remaining
//! distance, with slight vertical wobble and uneven pacing.

use std::time::Duration;

use rand::Rng;

use cems_app::ports::browser::DragStep;

/// Hold duration before releasing at the target.
const SETTLE: Duration = Duration::from_millis(500);

/// Build the intermediate pointer positions for a drag from `start` moving
/// `distance` pixels to the right.
///
/// The last step always lands exactly on the target.
pub fn synthesize(start: (f64, f64), distance: f64, rng: &mut impl Rng) -> Vec<DragStep> {
    let target = start.0 + distance;
    let mut x = start.0;
    let mut steps = Vec::new();

    loop {
        let step = (target - x) / rng.gen_range(2.0..4.0);
        if step < 1.0 {
            break;
        }
        x += step;
        steps.push(DragStep {
            x,
            y: start.1 + f64::from(rng.gen_range(-1i32..=1)),
            pause: Duration::from_millis(rng.gen_range(10..=30)),
        });
    }

    steps.push(DragStep {
        x: target,
        y: start.1,
        pause: SETTLE,
    });
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng as _;
    use rand::rngs::StdRng;

    #[test]
    fn should_land_exactly_on_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let steps = synthesize((120.0, 430.0), 115.0, &mut rng);
        let last = steps.last().unwrap();
        assert!((last.x - 235.0).abs() < f64::EPSILON);
        assert!((last.y - 430.0).abs() < f64::EPSILON);
        assert_eq!(last.pause, SETTLE);
    }

    #[test]
    fn should_move_monotonically_without_overshoot() {
        let mut rng = StdRng::seed_from_u64(42);
        let steps = synthesize((0.0, 100.0), 200.0, &mut rng);
        let mut previous = 0.0;
        for step in &steps {
            assert!(step.x >= previous, "x went backwards");
            assert!(step.x <= 200.0 + f64::EPSILON, "x overshot the target");
            previous = step.x;
        }
    }

    #[test]
    fn should_pace_intermediate_steps_unevenly_but_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let steps = synthesize((0.0, 100.0), 150.0, &mut rng);
        assert!(steps.len() > 3, "expected several intermediate steps");
        for step in &steps[..steps.len() - 1] {
            assert!(step.pause >= Duration::from_millis(10));
            assert!(step.pause <= Duration::from_millis(30));
            assert!((step.y - 100.0).abs() <= 1.0);
        }
    }

    #[test]
    fn should_emit_single_step_for_tiny_distance() {
        let mut rng = StdRng::seed_from_u64(3);
        let steps = synthesize((50.0, 100.0), 0.5, &mut rng);
        assert_eq!(steps.len(), 1);
        assert!((steps[0].x - 50.5).abs() < f64::EPSILON);
    }
}
