//! Crack and split kinematics for the two coconut halves
//!
//! Both animations are pure functions of time since crack onset:
//! - crack step: symmetric shake around the seam, no net displacement
//! - split step: halves drift apart along fixed (asymmetric) directions until
//!   the split amount saturates, then hold the final pose

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::steps::Step;

/// Split direction per unit of split amount
const TOP_SPLIT_OFFSET: Vec3 = Vec3::new(0.8, 0.6, 0.3);
const TOP_SPLIT_TWIST: Vec3 = Vec3::new(0.4, 0.2, 0.3);
const BOTTOM_SPLIT_OFFSET: Vec3 = Vec3::new(-0.6, -0.4, -0.2);
const BOTTOM_SPLIT_TWIST: Vec3 = Vec3::new(-0.3, -0.1, -0.2);

/// Position and XYZ Euler rotation of a group
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartPose {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl PartPose {
    pub const IDENTITY: PartPose = PartPose {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
    };
}

/// Poses of the top and bottom half groups
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HalvesTransform {
    pub top: PartPose,
    pub bottom: PartPose,
}

impl HalvesTransform {
    pub const IDENTITY: HalvesTransform = HalvesTransform {
        top: PartPose::IDENTITY,
        bottom: PartPose::IDENTITY,
    };
}

/// Lateral shake offset `since_onset` seconds into the crack step
#[inline]
pub fn shake_offset(since_onset: f32) -> f32 {
    (since_onset * SHAKE_FREQUENCY).sin() * SHAKE_AMPLITUDE
}

/// Split progress; non-decreasing in `split_time`, saturating at `SPLIT_MAX`
#[inline]
pub fn split_amount(split_time: f32) -> f32 {
    (split_time * SPLIT_RATE).clamp(0.0, SPLIT_MAX)
}

/// Half-group poses for `step` at `time`, with the crack animation started at `onset`
pub fn compute_halves_transform(step: Step, time: f32, onset: f32) -> HalvesTransform {
    let since_onset = time - onset;
    match step.get() {
        CRACK_STEP => {
            let shake = shake_offset(since_onset);
            HalvesTransform {
                top: PartPose {
                    position: Vec3::new(shake, 0.0, 0.0),
                    rotation: Vec3::new(0.0, 0.0, shake * 0.5),
                },
                bottom: PartPose {
                    position: Vec3::new(-shake, 0.0, 0.0),
                    rotation: Vec3::new(0.0, 0.0, -shake * 0.5),
                },
            }
        }
        SPLIT_STEP => {
            let amount = split_amount(since_onset);
            HalvesTransform {
                top: PartPose {
                    position: TOP_SPLIT_OFFSET * amount,
                    rotation: TOP_SPLIT_TWIST * amount,
                },
                bottom: PartPose {
                    position: BOTTOM_SPLIT_OFFSET * amount,
                    rotation: BOTTOM_SPLIT_TWIST * amount,
                },
            }
        }
        _ => HalvesTransform::IDENTITY,
    }
}
