//! Simulation driver
//!
//! `Tutorial` owns the current step and everything derived from it. The host
//! calls the navigation methods from its UI and `advance` once per rendered
//! frame with its clock; the returned pose plus `scene()` is what gets drawn.

use crate::error::StepError;
use crate::scene::{
    FramePose, PartKind, SceneDescription, compose_step, idle_sway, water_stream_transform,
};
use crate::settings::Settings;
use crate::steps::{Step, StepDescriptor, StepRegistry};

use super::droplets::DropletSystem;
use super::kinematics::{HalvesTransform, compute_halves_transform};
use super::state::{CrackLatch, SimulationState};

/// Receiver of composed frames (the rendering runtime)
pub trait SceneSink {
    fn submit(&mut self, scene: &SceneDescription, pose: &FramePose);
}

/// Composed scene with user-disabled decorations removed
fn scene_for(step: Step, settings: &Settings) -> SceneDescription {
    let mut scene = compose_step(step);
    if !settings.splash {
        scene.parts.retain(|p| p.id.kind != PartKind::Splash);
    }
    scene
}

/// The tutorial controller
#[derive(Debug, Clone)]
pub struct Tutorial {
    state: SimulationState,
    registry: StepRegistry,
    settings: Settings,
    latch: CrackLatch,
    droplets: DropletSystem,
    scene: SceneDescription,
    frames: u64,
}

impl Tutorial {
    /// Start at step 1 with the built-in step content
    pub fn new(settings: Settings, seed: u64) -> Self {
        Self::with_registry(settings, StepRegistry::default(), seed)
    }

    /// Start at step 1 with injected step content
    pub fn with_registry(settings: Settings, registry: StepRegistry, seed: u64) -> Self {
        let state = SimulationState::new();
        let seed = settings.seed_or(seed);
        log::info!("Tutorial initialized (droplet seed {})", seed);
        Self {
            scene: scene_for(state.current_step(), &settings),
            state,
            registry,
            droplets: DropletSystem::new(seed),
            settings,
            latch: CrackLatch::default(),
            frames: 0,
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    #[inline]
    pub fn current_step(&self) -> Step {
        self.state.current_step()
    }

    /// Scene for the current step
    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn descriptor(&self) -> &StepDescriptor {
        self.registry.descriptor(self.current_step())
    }

    pub fn caption(&self) -> String {
        self.registry.caption(self.current_step())
    }

    /// Onset time of the running crack animation
    pub fn crack_onset(&self) -> Option<f32> {
        self.latch.onset()
    }

    /// Frames advanced since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance one step; no-op at the last step
    pub fn next(&mut self) -> bool {
        let from = self.current_step();
        let changed = self.state.next();
        if changed {
            self.step_changed(from);
        }
        changed
    }

    /// Go back one step; no-op at the first step
    pub fn previous(&mut self) -> bool {
        let from = self.current_step();
        let changed = self.state.previous();
        if changed {
            self.step_changed(from);
        }
        changed
    }

    /// Jump to step `n`; out-of-range requests are rejected without changing anything
    pub fn go_to(&mut self, n: i64) -> Result<bool, StepError> {
        let from = self.current_step();
        match self.state.go_to(n) {
            Ok(changed) => {
                if changed {
                    self.step_changed(from);
                }
                Ok(changed)
            }
            Err(e) => {
                log::warn!("Rejected navigation: {}", e);
                Err(e)
            }
        }
    }

    /// Back to step 1 with a fresh crack animation
    pub fn reset(&mut self) {
        let from = self.current_step();
        self.state.reset();
        self.latch.clear();
        self.scene = scene_for(self.current_step(), &self.settings);
        log::info!("Tutorial reset (was at step {})", from);
    }

    fn step_changed(&mut self, from: Step) {
        let to = self.current_step();
        self.scene = scene_for(to, &self.settings);
        log::info!(
            "Step {} -> {}: {} ({} parts)",
            from,
            to,
            self.registry.descriptor(to).title,
            self.scene.parts.len()
        );
    }

    /// Compute the pose for a frame at host time `time` (seconds)
    pub fn advance(&mut self, time: f32) -> FramePose {
        self.frames += 1;
        let step = self.current_step();
        let crack_onset = self.latch.observe(step, time);

        let mut root = self.scene.root;
        root.rotation.y += idle_sway(step, time);

        let water_stream = self
            .scene
            .part(PartKind::WaterStream, 0)
            .map(|stream| water_stream_transform(stream.transform, time));

        let (halves, droplets) = match crack_onset {
            Some(onset) => {
                let halves = compute_halves_transform(step, time, onset);
                let droplets = if self.settings.particles {
                    self.droplets.activate(step, time, onset).to_vec()
                } else {
                    Vec::new()
                };
                (halves, droplets)
            }
            None => (HalvesTransform::IDENTITY, Vec::new()),
        };

        FramePose {
            step,
            time,
            crack_onset,
            root,
            water_stream,
            halves,
            droplets,
        }
    }

    /// Advance and hand the frame to `sink`
    pub fn run_frame<S: SceneSink + ?Sized>(&mut self, time: f32, sink: &mut S) -> FramePose {
        let pose = self.advance(time);
        sink.submit(&self.scene, &pose);
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec3;

    fn tutorial() -> Tutorial {
        Tutorial::new(Settings::default(), 1)
    }

    #[derive(Default)]
    struct CountingSink {
        frames: usize,
        last_parts: usize,
    }

    impl SceneSink for CountingSink {
        fn submit(&mut self, scene: &SceneDescription, _pose: &FramePose) {
            self.frames += 1;
            self.last_parts = scene.parts.len();
        }
    }

    #[test]
    fn test_scene_follows_step() {
        let mut t = tutorial();
        assert_eq!(t.scene().step, Step::FIRST);
        t.next();
        assert_eq!(t.scene().step.get(), 2);
        t.go_to(7).unwrap();
        assert!(t.scene().has(PartKind::CrackRing));
        t.previous();
        assert!(t.scene().has(PartKind::SeamRing));
    }

    #[test]
    fn test_rejected_go_to_keeps_state() {
        let mut t = tutorial();
        t.go_to(4).unwrap();
        assert!(t.go_to(12).is_err());
        assert!(t.go_to(0).is_err());
        assert_eq!(t.current_step().get(), 4);
        assert_eq!(t.scene().step.get(), 4);
    }

    #[test]
    fn test_first_step_sways() {
        let mut t = tutorial();
        let pose = t.advance(3.0);
        assert!((pose.root.rotation.y - (1.5f32).sin() * 0.1).abs() < 1e-6);
        assert!(pose.droplets.is_empty());
        assert_eq!(pose.crack_onset, None);
    }

    #[test]
    fn test_pour_stream_animates() {
        let mut t = tutorial();
        t.go_to(5).unwrap();
        let pose = t.advance(0.0);
        let stream = pose.water_stream.unwrap();
        assert_eq!(stream.position.y, STREAM_BASE_Y);
        assert_eq!(stream.scale.y, 0.5);
        assert_eq!(pose.root.rotation.x, std::f32::consts::PI);
    }

    #[test]
    fn test_crack_latches_on_first_frame() {
        let mut t = tutorial();
        t.go_to(7).unwrap();
        let first = t.advance(10.0);
        assert_eq!(first.crack_onset, Some(10.0));
        assert_eq!(first.halves, HalvesTransform::IDENTITY);
        assert_eq!(first.droplets.len(), DROPLET_COUNT);

        let later = t.advance(10.5);
        assert_eq!(later.crack_onset, Some(10.0));

        t.next();
        let split = t.advance(11.0);
        assert_eq!(split.crack_onset, Some(10.0));
        let expected = Vec3::new(0.8, 0.6, 0.3) * (1.0 * SPLIT_RATE);
        assert!(split.halves.top.position.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn test_reset_clears_latch() {
        let mut t = tutorial();
        t.go_to(7).unwrap();
        t.advance(5.0);
        t.advance(6.3);
        t.reset();
        assert_eq!(t.current_step(), Step::FIRST);
        assert_eq!(t.crack_onset(), None);

        t.go_to(7).unwrap();
        let pose = t.advance(20.0);
        assert_eq!(pose.crack_onset, Some(20.0));
        assert_eq!(pose.halves, HalvesTransform::IDENTITY);
    }

    #[test]
    fn test_leaving_crack_range_relatches() {
        let mut t = tutorial();
        t.go_to(7).unwrap();
        t.advance(1.0);
        t.go_to(3).unwrap();
        t.advance(2.0);
        t.go_to(8).unwrap();
        let pose = t.advance(9.0);
        assert_eq!(pose.crack_onset, Some(9.0));
        assert_eq!(pose.halves, HalvesTransform::IDENTITY);
    }

    #[test]
    fn test_particles_setting_disables_droplets() {
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        let mut t = Tutorial::new(settings, 1);
        t.go_to(8).unwrap();
        let pose = t.advance(1.0);
        assert!(pose.droplets.is_empty());
        assert!(pose.crack_onset.is_some());
    }

    #[test]
    fn test_splash_setting_hides_markers() {
        let settings = Settings {
            splash: false,
            ..Settings::default()
        };
        let mut t = Tutorial::new(settings, 1);
        t.go_to(8).unwrap();
        assert!(!t.scene().has(PartKind::Splash));
        assert!(t.scene().has(PartKind::SpillStream));

        let mut t = tutorial();
        t.go_to(8).unwrap();
        assert_eq!(t.scene().count(PartKind::Splash), SPLASH_COUNT);
    }

    #[test]
    fn test_run_frame_submits() {
        let mut t = tutorial();
        let mut sink = CountingSink::default();
        t.run_frame(0.0, &mut sink);
        t.next();
        t.run_frame(0.016, &mut sink);
        assert_eq!(sink.frames, 2);
        assert_eq!(sink.last_parts, t.scene().parts.len());
        assert_eq!(t.frames(), 2);
    }

    #[test]
    fn test_caption_tracks_step() {
        let mut t = tutorial();
        assert_eq!(t.caption(), "Step 1: Select Fresh Coconut");
        t.go_to(6).unwrap();
        assert_eq!(t.descriptor().title, "Find the Seam");
    }
}
