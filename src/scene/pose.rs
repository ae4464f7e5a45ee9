//! Per-frame pose: the time-varying part of the scene
//!
//! The composed scene is static per step; a `FramePose` carries everything
//! that moves (idle sway, the pouring stream, the two halves, the droplets)
//! and `SceneDescription::posed` resolves both into world matrices.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::SceneDescription;
use super::part::{Group, Part, PartKind, Transform};
use crate::consts::*;
use crate::euler_to_quat;
use crate::sim::droplets::DropletTransform;
use crate::sim::kinematics::{HalvesTransform, PartPose};
use crate::steps::Step;

/// Everything that moves on one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePose {
    pub step: Step,
    /// Host clock (seconds)
    pub time: f32,
    /// Crack onset in effect for this frame
    pub crack_onset: Option<f32>,
    /// Coconut root including idle motion
    pub root: Transform,
    /// Animated pouring stream (step 5 only)
    pub water_stream: Option<Transform>,
    pub halves: HalvesTransform,
    /// One entry per droplet slot; empty when droplets are inactive
    pub droplets: Vec<DropletTransform>,
}

/// Gentle yaw while the coconut is being selected
pub fn idle_sway(step: Step, time: f32) -> f32 {
    if step == Step::FIRST {
        (time * IDLE_SWAY_FREQUENCY).sin() * IDLE_SWAY_AMPLITUDE
    } else {
        0.0
    }
}

/// Pulsing pour: the stream stretches and bobs with the flow
pub fn water_stream_transform(rest: Transform, time: f32) -> Transform {
    let wave = (time * STREAM_FREQUENCY).sin();
    let mut transform = rest;
    transform.scale.y = (wave * 0.5 + 0.5).max(0.1);
    transform.position.y = STREAM_BASE_Y + wave * 0.2;
    transform
}

fn pose_matrix(pose: &PartPose) -> Mat4 {
    Mat4::from_rotation_translation(euler_to_quat(pose.rotation), pose.position)
}

/// A part resolved to world space for one frame
#[derive(Debug, Clone, Serialize)]
pub struct PosedPart<'a> {
    pub part: &'a Part,
    pub world: Mat4,
    /// Final opacity (droplets fade independently of their material)
    pub opacity: f32,
}

impl SceneDescription {
    /// Resolve every visible part to world space; droplet slots without a transform are skipped
    pub fn posed(&self, pose: &FramePose) -> Vec<PosedPart<'_>> {
        let root = pose.root.to_matrix();
        let top = root * pose_matrix(&pose.halves.top);
        let bottom = root * pose_matrix(&pose.halves.bottom);

        self.parts
            .iter()
            .filter_map(|part| {
                let local = match (part.id.kind, pose.water_stream) {
                    (PartKind::WaterStream, Some(stream)) => stream,
                    _ => part.transform,
                }
                .to_matrix();

                let (world, opacity) = match part.group {
                    Group::World => (local, part.material.opacity),
                    Group::Coconut => (root * local, part.material.opacity),
                    Group::TopHalf => (top * local, part.material.opacity),
                    Group::BottomHalf => (bottom * local, part.material.opacity),
                    Group::Droplets => {
                        let droplet = pose.droplets.get(usize::from(part.id.index))?;
                        let m = Mat4::from_scale_rotation_translation(
                            Vec3::splat(droplet.scale),
                            euler_to_quat(droplet.rotation),
                            droplet.position,
                        );
                        (root * m * local, droplet.opacity)
                    }
                };
                Some(PosedPart {
                    part,
                    world,
                    opacity,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::compose;

    fn rest_pose(scene: &SceneDescription) -> FramePose {
        FramePose {
            step: scene.step,
            time: 0.0,
            crack_onset: None,
            root: scene.root,
            water_stream: None,
            halves: HalvesTransform::IDENTITY,
            droplets: Vec::new(),
        }
    }

    #[test]
    fn test_idle_sway_only_on_first_step() {
        assert_eq!(idle_sway(Step::FIRST, 0.0), 0.0);
        assert!(idle_sway(Step::FIRST, 3.0).abs() > 0.0);
        assert!(idle_sway(Step::FIRST, 3.0).abs() <= IDLE_SWAY_AMPLITUDE);
        assert_eq!(idle_sway(Step::LAST, 3.0), 0.0);
    }

    #[test]
    fn test_water_stream_pulse() {
        let rest = Transform::at(Vec3::new(0.9, -1.5, 0.0));
        let t0 = water_stream_transform(rest, 0.0);
        assert_eq!(t0.scale.y, 0.5);
        assert_eq!(t0.position.y, -1.5);
        assert_eq!(t0.position.x, 0.9);

        // Trough of the wave: scale floors at 0.1
        let trough = water_stream_transform(rest, 3.0 * std::f32::consts::FRAC_PI_4);
        assert!((trough.scale.y - 0.1).abs() < 1e-6);
        assert!((trough.position.y + 1.7).abs() < 1e-5);
    }

    #[test]
    fn test_droplets_hidden_without_transforms() {
        let scene = compose(7).unwrap();
        let posed = scene.posed(&rest_pose(&scene));
        assert!(posed.iter().all(|p| p.part.id.kind != PartKind::Droplet));
        assert_eq!(posed.len(), scene.parts.len() - DROPLET_COUNT);
    }

    #[test]
    fn test_halves_move_their_parts() {
        let scene = compose(8).unwrap();
        let mut pose = rest_pose(&scene);
        pose.halves.top.position = Vec3::new(1.0, 0.0, 0.0);
        let posed = scene.posed(&pose);
        let top_shell = posed
            .iter()
            .find(|p| p.part.group == Group::TopHalf && p.part.id.kind == PartKind::Shell)
            .unwrap();
        assert!(top_shell.world.w_axis.truncate().abs_diff_eq(Vec3::X, 1e-6));
        let bottom_shell = posed
            .iter()
            .find(|p| p.part.group == Group::BottomHalf && p.part.id.kind == PartKind::Shell)
            .unwrap();
        assert!(bottom_shell.world.w_axis.truncate().abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_flip_applies_to_coconut_not_world() {
        let scene = compose(5).unwrap();
        let posed = scene.posed(&rest_pose(&scene));
        let eye = posed.iter().find(|p| p.part.id.kind == PartKind::Eye).unwrap();
        // Eyes are on top (y=0.9) and end up below the lifted root
        assert!((eye.world.w_axis.y - (0.5 - 0.9)).abs() < 1e-5);
        let droplet = posed
            .iter()
            .find(|p| p.part.id.kind == PartKind::StreamDroplet)
            .unwrap();
        assert!((droplet.world.w_axis.y + 1.5).abs() < 1e-6);
    }
}
