//! End-to-end navigation scenarios driven through `Tutorial`

use coconut_steps::consts::*;
use coconut_steps::renderer::build_frame_mesh;
use coconut_steps::scene::{Group, PartKind, stream_droplet_position};
use coconut_steps::sim::HalvesTransform;
use coconut_steps::{QualityPreset, Settings, Step, StepError, Tutorial, compose};

fn tutorial() -> Tutorial {
    Tutorial::new(Settings::default(), 42)
}

#[test]
fn test_next_seven_times_reaches_split() {
    let mut t = tutorial();
    for _ in 0..7 {
        assert!(t.next());
    }
    assert_eq!(t.current_step(), Step::LAST);
    assert!(!t.next());
    assert!(t.current_step().is_complete());

    let scene = t.scene();
    assert!(scene.has_group(Group::TopHalf));
    assert!(scene.has_group(Group::BottomHalf));
    assert_eq!(scene.count(PartKind::Splash), SPLASH_COUNT);
    assert!(scene.has(PartKind::SpillStream));
    assert!(!scene.has(PartKind::CrackRing));
    assert!(!scene.has(PartKind::HammerHandle));
    assert!(!scene.has(PartKind::HammerHead));
}

#[test]
fn test_crack_step_has_hammer_and_ring() {
    let scene = compose(7).unwrap();
    assert!(scene.has(PartKind::CrackRing));
    assert!(scene.has(PartKind::HammerHandle));
    assert!(scene.has(PartKind::HammerHead));
    assert!(!scene.has(PartKind::Splash));
    assert_eq!(scene.count(PartKind::Droplet), DROPLET_COUNT);
}

#[test]
fn test_stream_droplet_layout() {
    let scene = compose(5).unwrap();
    for i in 0..STREAM_DROPLET_COUNT as u8 {
        let part = scene.part(PartKind::StreamDroplet, i).unwrap();
        let expected = -1.5 - f32::from(i) * 0.2;
        assert!((part.transform.position.y - expected).abs() < 1e-6);
        assert_eq!(part.transform.position, stream_droplet_position(i));
    }
}

#[test]
fn test_previous_at_first_is_noop() {
    let mut t = tutorial();
    assert!(!t.previous());
    assert_eq!(t.current_step(), Step::FIRST);
}

#[test]
fn test_go_to_out_of_range() {
    let mut t = tutorial();
    t.go_to(3).unwrap();
    assert_eq!(t.go_to(9), Err(StepError::OutOfRange { step: 9, max: 8 }));
    assert!(t.go_to(-1).is_err());
    assert_eq!(t.current_step().get(), 3);
}

#[test]
fn test_reset_restarts_shake_at_phase_zero() {
    let mut t = tutorial();
    t.go_to(7).unwrap();
    for frame in 0..30 {
        t.advance(2.0 + frame as f32 / 60.0);
    }
    let stale = t.advance(2.6);
    assert_ne!(stale.halves, HalvesTransform::IDENTITY);

    t.reset();
    assert_eq!(t.current_step(), Step::FIRST);
    t.go_to(7).unwrap();
    let fresh = t.advance(30.0);
    assert_eq!(fresh.crack_onset, Some(30.0));
    assert_eq!(fresh.halves.top.position.x, 0.0);
}

#[test]
fn test_split_opens_over_time() {
    let mut t = tutorial();
    t.go_to(8).unwrap();
    let start = t.advance(1.0);
    let mid = t.advance(2.0);
    let end = t.advance(10.0);

    let top_y = |p: &coconut_steps::FramePose| p.halves.top.position.y;
    assert_eq!(top_y(&start), 0.0);
    assert!(top_y(&mid) > top_y(&start));
    assert!((top_y(&end) - 0.6 * SPLIT_MAX).abs() < 1e-5);
}

#[test]
fn test_droplets_stay_above_ground() {
    let mut t = tutorial();
    t.go_to(7).unwrap();
    for frame in 0..600 {
        let pose = t.advance(frame as f32 / 60.0);
        assert_eq!(pose.droplets.len(), DROPLET_COUNT);
        for d in &pose.droplets {
            assert!(d.position.y >= GROUND_LEVEL);
            assert!((DROPLET_MIN_OPACITY..=1.0).contains(&d.opacity));
            assert!((DROPLET_MIN_SCALE..=1.0).contains(&d.scale));
        }
    }
}

#[test]
fn test_same_seed_same_frames() {
    let run = |seed| {
        let mut t = Tutorial::new(Settings::default(), seed);
        t.go_to(7).unwrap();
        (0..240)
            .map(|frame| t.advance(frame as f32 / 60.0).droplets)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(9), run(9));
    assert_ne!(run(9), run(10));
}

#[test]
fn test_configured_seed_overrides_clock() {
    let settings = Settings {
        droplet_seed: Some(5),
        ..Settings::default()
    };
    let mut a = Tutorial::new(settings.clone(), 1);
    let mut b = Tutorial::new(settings, 2);
    a.go_to(8).unwrap();
    b.go_to(8).unwrap();
    assert_eq!(a.advance(0.5).droplets, b.advance(0.5).droplets);
}

#[test]
fn test_every_step_renders() {
    let mut t = tutorial();
    let mut time = 0.0;
    loop {
        for _ in 0..10 {
            let pose = t.advance(time);
            let mesh = build_frame_mesh(t.scene(), &pose, QualityPreset::Low);
            assert!(mesh.vertex_count() > 0);
            time += 1.0 / 60.0;
        }
        if !t.next() {
            break;
        }
    }
    assert_eq!(t.frames(), 80);
}
