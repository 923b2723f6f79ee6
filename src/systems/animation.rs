//! Animation routing and playback.
//!
//! - [`select_animation`] runs once per fixed step inside
//!   [`Entity::time_shift`](crate::components::entity::Entity::time_shift) and
//!   picks the key an entity's [`AnimationController`] wants.
//! - [`advance_animation`] runs once per render frame from
//!   [`World::update_animation`](crate::world::World::update_animation) and
//!   steps frames at the definition's fps.
//!
//! # Related
//!
//! - [`crate::components::animation`] – definitions, playback state, rules
//! - [`crate::components::signals::Signals`] – inputs to the rules

use crate::components::animation::{Animation, AnimationController, AnimationResource, CmpOp, Condition};
use crate::components::signals::Signals;

/// Advance playback by `dt` seconds.
///
/// Looped animations wrap; one-shot animations stop on the last frame and set
/// [`Animation::ended`].
pub fn advance_animation(anim: &mut Animation, resource: &AnimationResource, dt: f64) {
    if resource.frame_count == 0 || resource.fps <= 0.0 || anim.ended {
        return;
    }

    anim.elapsed_time += dt;
    let frame_duration = 1.0 / resource.fps;
    while anim.elapsed_time >= frame_duration {
        anim.elapsed_time -= frame_duration;
        anim.frame_index += 1;

        if anim.frame_index >= resource.frame_count {
            if resource.looped {
                anim.frame_index = 0;
            } else {
                anim.frame_index = resource.frame_count - 1; // stay on last frame
                anim.ended = true;
                anim.elapsed_time = 0.0;
                break;
            }
        }
    }
}

/// Pick the key of the first satisfied rule, else the fallback.
pub fn select_animation<'a>(controller: &'a AnimationController, signals: &Signals) -> &'a str {
    controller
        .rules
        .iter()
        .find(|rule| evaluate_condition(signals, &rule.when))
        .map(|rule| rule.set_key.as_str())
        .unwrap_or(controller.fallback_key.as_str())
}

/// Evaluate a controller condition against an entity's current signals.
///
/// Missing keys never satisfy a comparison.
pub fn evaluate_condition(signals: &Signals, condition: &Condition) -> bool {
    match condition {
        Condition::ScalarCmp { key, op, value } => signals
            .get_scalar(key)
            .is_some_and(|signal_value| match op {
                CmpOp::Lt => signal_value < *value,
                CmpOp::Le => signal_value <= *value,
                CmpOp::Gt => signal_value > *value,
                CmpOp::Ge => signal_value >= *value,
                CmpOp::Eq => (signal_value - *value).abs() < f64::EPSILON,
                CmpOp::Ne => (signal_value - *value).abs() >= f64::EPSILON,
            }),
        Condition::ScalarRange {
            key,
            min,
            max,
            inclusive,
        } => signals.get_scalar(key).is_some_and(|v| {
            if *inclusive {
                v >= *min && v <= *max
            } else {
                v > *min && v < *max
            }
        }),
        Condition::IntegerCmp { key, op, value } => signals
            .get_integer(key)
            .is_some_and(|signal_value| match op {
                CmpOp::Lt => signal_value < *value,
                CmpOp::Le => signal_value <= *value,
                CmpOp::Gt => signal_value > *value,
                CmpOp::Ge => signal_value >= *value,
                CmpOp::Eq => signal_value == *value,
                CmpOp::Ne => signal_value != *value,
            }),
        Condition::IntegerRange {
            key,
            min,
            max,
            inclusive,
        } => signals.get_integer(key).is_some_and(|v| {
            if *inclusive {
                v >= *min && v <= *max
            } else {
                v > *min && v < *max
            }
        }),
        Condition::HasFlag { key } => signals.has_flag(key),
        Condition::LacksFlag { key } => !signals.has_flag(key),
        Condition::All(conditions) => conditions
            .iter()
            .all(|cond| evaluate_condition(signals, cond)),
        Condition::Any(conditions) => conditions
            .iter()
            .any(|cond| evaluate_condition(signals, cond)),
        Condition::Not(cond) => !evaluate_condition(signals, cond),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals_with_scalar(key: &str, value: f64) -> Signals {
        let mut s = Signals::default();
        s.set_scalar(key, value);
        s
    }

    #[test]
    fn test_scalar_cmp_lt() {
        let cond = Condition::ScalarCmp {
            key: "speed".to_string(),
            op: CmpOp::Lt,
            value: 10.0,
        };
        assert!(evaluate_condition(&signals_with_scalar("speed", 5.0), &cond));
        assert!(!evaluate_condition(&signals_with_scalar("speed", 15.0), &cond));
    }

    #[test]
    fn test_scalar_cmp_missing_key() {
        let cond = Condition::ScalarCmp {
            key: "speed".to_string(),
            op: CmpOp::Ne,
            value: 10.0,
        };
        assert!(!evaluate_condition(&Signals::default(), &cond));
    }

    #[test]
    fn test_integer_range_exclusive_at_boundary() {
        let mut s = Signals::default();
        s.set_integer("lives", 3);
        let cond = Condition::IntegerRange {
            key: "lives".to_string(),
            min: 3,
            max: 5,
            inclusive: false,
        };
        assert!(!evaluate_condition(&s, &cond));
    }

    #[test]
    fn test_combinators() {
        let s = Signals::default().with_flag("airborne");
        let cond = Condition::All(vec![
            Condition::HasFlag {
                key: "airborne".to_string(),
            },
            Condition::Not(Box::new(Condition::HasFlag {
                key: "firing".to_string(),
            })),
        ]);
        assert!(evaluate_condition(&s, &cond));
        assert!(!evaluate_condition(&s, &Condition::Any(vec![])));
        assert!(evaluate_condition(&s, &Condition::All(vec![])));
    }

    #[test]
    fn test_select_animation_first_rule_wins() {
        let controller = AnimationController::new("idle")
            .with_rule(
                Condition::HasFlag {
                    key: "airborne".to_string(),
                },
                "jump",
            )
            .with_rule(
                Condition::ScalarCmp {
                    key: "speed".to_string(),
                    op: CmpOp::Gt,
                    value: 0.0,
                },
                "run",
            );

        let mut s = signals_with_scalar("speed", 3.0);
        assert_eq!(select_animation(&controller, &s), "run");
        s.set_flag("airborne");
        assert_eq!(select_animation(&controller, &s), "jump");
        assert_eq!(select_animation(&controller, &Signals::default()), "idle");
    }

    #[test]
    fn test_advance_looped_wraps() {
        let res = AnimationResource::new(3, 10.0, true);
        let mut anim = Animation::new("run");
        advance_animation(&mut anim, &res, 0.35);
        assert_eq!(anim.frame_index, 0);
        assert!(!anim.ended);
    }

    #[test]
    fn test_advance_one_shot_stops_on_last_frame() {
        let res = AnimationResource::new(3, 10.0, false);
        let mut anim = Animation::new("die");
        advance_animation(&mut anim, &res, 1.0);
        assert_eq!(anim.frame_index, 2);
        assert!(anim.ended);
        advance_animation(&mut anim, &res, 1.0);
        assert_eq!(anim.frame_index, 2);
    }
}
