#[cfg(test)]
mod tests {
    use crate::enums::*;
    use crate::events::MissionEvent;
    use crate::tunables::MissionTunables;
    use crate::types::{wrap_angle, DroneState, Position, SimTime, SurvivorId};

    /// Verify the status enums round-trip through serde_json.
    #[test]
    fn test_target_status_serde() {
        let variants = vec![
            TargetStatus::Undetected,
            TargetStatus::Detected,
            TargetStatus::Queued,
            TargetStatus::InProgress,
            TargetStatus::Resolved,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: TargetStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_interaction_phase_serde() {
        let variants = vec![
            InteractionPhase::Idle,
            InteractionPhase::Approaching,
            InteractionPhase::Signaling,
            InteractionPhase::DeliveringResource,
            InteractionPhase::Done,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: InteractionPhase = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    /// Verify MissionEvent round-trips through serde (tagged union).
    #[test]
    fn test_mission_event_serde() {
        let events = vec![
            MissionEvent::TargetDetected {
                id: SurvivorId(3),
                position: Position::new(1.0, 2.0, 3.0),
            },
            MissionEvent::TargetResolved {
                id: SurvivorId(3),
                kind: ResolutionKind::Delivered,
            },
            MissionEvent::TargetAbandoned {
                id: SurvivorId(9),
                reason: AbandonReason::Stuck,
            },
            MissionEvent::Collision {
                position: Position::default(),
            },
        ];
        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: MissionEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(json, serde_json::to_string(&back).unwrap());
        }
    }

    /// Verify Position geometry calculations.
    #[test]
    fn test_position_ranges() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 12.0);
        assert!((a.range_to(&b) - 13.0).abs() < 1e-10);
        assert!((a.horizontal_range_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_direction_to_is_unit() {
        let a = Position::new(1.0, 1.0, 1.0);
        let b = Position::new(4.0, 5.0, 1.0);
        let dir = a.direction_to(&b);
        assert!((dir.length() - 1.0).abs() < 1e-10);
        // Coincident points give the zero vector, not NaN.
        let zero = a.direction_to(&a);
        assert_eq!(zero.length(), 0.0);
    }

    #[test]
    fn test_drone_forward_from_yaw() {
        // Yaw 0 = North (+y).
        let north = DroneState::new(Position::default(), 0.0);
        assert!((north.forward().y - 1.0).abs() < 1e-10);

        // Yaw PI/2 = East (+x).
        let east = DroneState::new(Position::default(), std::f64::consts::FRAC_PI_2);
        assert!((east.forward().x - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_wrap_angle_shortest_turn() {
        use std::f64::consts::PI;
        // Crossing the 0/TAU seam takes the short way.
        let diff = wrap_angle(0.1, std::f64::consts::TAU - 0.1);
        assert!((diff + 0.2).abs() < 1e-10, "expected -0.2, got {diff}");
        assert!(wrap_angle(0.0, PI / 2.0) > 0.0);
    }

    /// Verify SimTime advancement at the 50 Hz tick rate.
    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..50 {
            time.advance();
        }
        assert_eq!(time.tick, 50);
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_tunables_default_is_valid() {
        assert!(MissionTunables::default().validate().is_ok());
    }

    #[test]
    fn test_tunables_reject_nonpositive() {
        let mut t = MissionTunables::default();
        t.signal_duration_secs = 0.0;
        assert!(t.validate().is_err());

        let mut t = MissionTunables::default();
        t.resource_fraction = 1.5;
        assert!(t.validate().is_err());
    }
}
