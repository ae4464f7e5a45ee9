//! Step-to-scene composition
//!
//! Pure mapping from a step to every part the scene contains. Nothing here
//! depends on time; animated parts are emitted at their rest pose and moved by
//! the frame pose (see `pose.rs`).

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI, TAU};

use glam::Vec3;

use super::material::{Material, Side, colors};
use super::part::{Group, Light, Part, PartId, PartKind, Primitive, Transform};
use super::SceneDescription;
use crate::consts::*;
use crate::error::StepError;
use crate::sim::droplets::{SPLASH_RADIUS, splash_positions};
use crate::steps::Step;

const SHELL_RADIUS: f32 = 1.3;
const HUSK_RADIUS: f32 = 1.25;
const HUSK_SCALE: f32 = 1.05;
const MEAT_RADIUS: f32 = 1.15;
const CAVITY_RADIUS: f32 = 0.9;
const EYE_RADIUS: f32 = 0.06;
const EYE_RING: f32 = 0.9;
const EYE_ACTIVE_SCALE: f32 = 1.4;
const HOLE_POSITION: Vec3 = Vec3::new(0.9, 0.9, 0.0);
const HOLE_DEPTH: f32 = 0.3;
const PILOT_HOLE_RADIUS: f32 = 0.02;
const DRAIN_HOLE_RADIUS: f32 = 0.05;
/// Seam and crack rings are unrotated tori, which lie flat on the equator
/// (XZ plane) where the halves separate, not upright
const SEAM_RADIUS: f32 = 1.32;

/// Water parts at step 5 sit below the hole, in world space: only the
/// coconut turns upside down, the stream and glass stay upright
const POUR_X: f32 = 0.9;
/// Puddle and ripples lie just above the ground
const PUDDLE_Y: f32 = -2.48;
const RIPPLE_Y: f32 = -2.47;
const RIPPLE_COUNT: u8 = 3;
const CRACK_SHARD_COUNT: u8 = 6;

/// Shell material (shared by the whole coconut and both halves)
const SHELL: Material = Material::matte(colors::SHELL).with_surface(0.9, 0.0).fibrous();
const HUSK: Material = Material::matte(colors::HUSK).with_opacity(0.7);
const WATER: Material = Material::water(colors::WATER, 0.8).with_glow(colors::WATER_GLOW, 0.1);

/// Compose the scene for a raw step number; out-of-range steps are rejected
pub fn compose(step: i64) -> Result<SceneDescription, StepError> {
    Step::new(step).map(compose_step)
}

/// Compose the scene for a raw step number, clamping out-of-range steps to the nearest valid one
pub fn compose_clamped(step: i64) -> SceneDescription {
    let clamped = Step::clamped(step);
    if i64::from(clamped.get()) != step {
        log::warn!("Composer clamped invalid step {} to {}", step, clamped);
    }
    compose_step(clamped)
}

/// Compose the scene for a validated step
pub fn compose_step(step: Step) -> SceneDescription {
    let mut builder = SceneBuilder::default();
    let n = step.get();

    builder.push(
        PartId::new(PartKind::Ground, 0),
        Group::World,
        Primitive::Plane {
            width: 20.0,
            height: 20.0,
        },
        Material::matte(colors::GROUND),
        Transform::at(Vec3::new(0.0, GROUND_LEVEL, 0.0)).rotated(Vec3::new(-FRAC_PI_2, 0.0, 0.0)),
    );

    if step.is_cracked() {
        builder.half(step, true);
        builder.half(step, false);
    } else {
        builder.whole(step);
    }

    match n {
        3 | 4 => builder.tool(),
        5 => builder.pour(),
        6 => builder.seam(),
        CRACK_STEP => {
            builder.crack_lines();
            builder.hammer();
        }
        _ => {}
    }

    if step.is_cracked() {
        builder.droplet_slots();
        builder.puddle();
        if step.is_split() {
            builder.splash();
        }
    }

    let root = if n == 5 {
        // Upside down over the glass
        Transform::at(Vec3::new(0.0, 0.5, 0.0)).rotated(Vec3::new(PI, 0.0, 0.0))
    } else {
        Transform::IDENTITY
    };

    SceneDescription {
        step,
        root,
        parts: builder.parts,
        lights: light_rig(),
    }
}

fn light_rig() -> Vec<Light> {
    vec![
        Light::Ambient { intensity: 0.4 },
        Light::Directional {
            position: Vec3::new(8.0, 8.0, 5.0),
            intensity: 1.2,
        },
        Light::Point {
            position: Vec3::new(-5.0, 3.0, -5.0),
            intensity: 0.6,
            color: colors::WARM_LIGHT,
        },
        Light::Spot {
            position: Vec3::new(0.0, 10.0, 0.0),
            intensity: 0.8,
            angle: 0.3,
            penumbra: 0.5,
        },
    ]
}

/// Local rest transform of eye `i`
pub fn eye_position(i: u8) -> Vec3 {
    let angle = f32::from(i) * TAU / 3.0;
    Vec3::new(angle.cos() * EYE_RING, EYE_RING, angle.sin() * EYE_RING)
}

/// Rest position of stream droplet `i` below the drainage hole (step 5)
pub fn stream_droplet_position(i: u8) -> Vec3 {
    let i = f32::from(i);
    Vec3::new(
        POUR_X + (i * 0.8).sin() * 0.1,
        STREAM_BASE_Y - i * 0.2,
        (i * 0.8).cos() * 0.1,
    )
}

#[derive(Default)]
struct SceneBuilder {
    parts: Vec<Part>,
}

impl SceneBuilder {
    fn push(
        &mut self,
        id: PartId,
        group: Group,
        primitive: Primitive,
        material: Material,
        transform: Transform,
    ) {
        self.parts.push(Part {
            id,
            group,
            primitive,
            material,
            transform,
        });
    }

    /// Eyes, plus the drainage hole once it has been started
    fn eyes_and_hole(&mut self, step: Step, group: Group) {
        let highlighted = step.get() >= 2;
        for i in 0..3 {
            let active = highlighted && i == 0;
            let color = if active { colors::EYE_ACTIVE } else { colors::EYE };
            let scale = if active { EYE_ACTIVE_SCALE } else { 1.0 };
            self.push(
                PartId::new(PartKind::Eye, i),
                group,
                Primitive::Sphere { radius: EYE_RADIUS },
                Material::matte(color).with_surface(0.5, 0.0),
                Transform::at(eye_position(i)).scaled(scale),
            );
        }

        if step.get() >= 3 {
            let radius = if step.get() >= 4 {
                DRAIN_HOLE_RADIUS
            } else {
                PILOT_HOLE_RADIUS
            };
            self.push(
                PartId::new(PartKind::Hole, 0),
                group,
                Primitive::Cylinder {
                    radius_top: radius,
                    radius_bottom: radius,
                    height: HOLE_DEPTH,
                },
                Material::matte(colors::HOLE),
                Transform::at(HOLE_POSITION),
            );
        }
    }

    fn whole(&mut self, step: Step) {
        self.push(
            PartId::new(PartKind::Shell, 0),
            Group::Coconut,
            Primitive::Sphere {
                radius: SHELL_RADIUS,
            },
            SHELL,
            Transform::IDENTITY,
        );
        self.push(
            PartId::new(PartKind::Husk, 0),
            Group::Coconut,
            Primitive::Sphere {
                radius: HUSK_RADIUS,
            },
            HUSK,
            Transform::IDENTITY.scaled(HUSK_SCALE),
        );
        self.eyes_and_hole(step, Group::Coconut);
    }

    /// One hemisphere: four concentric shells cut by polar range, eyes and hole on top only
    fn half(&mut self, step: Step, top: bool) {
        let (group, index, theta_start) = if top {
            (Group::TopHalf, 0, 0.0)
        } else {
            (Group::BottomHalf, 1, FRAC_PI_2)
        };
        let segment = |radius| Primitive::SphereSegment {
            radius,
            theta_start,
            theta_length: FRAC_PI_2,
        };

        self.push(
            PartId::new(PartKind::Shell, index),
            group,
            segment(SHELL_RADIUS),
            SHELL.with_side(Side::Double),
            Transform::IDENTITY,
        );
        self.push(
            PartId::new(PartKind::Husk, index),
            group,
            segment(HUSK_RADIUS),
            HUSK.with_side(Side::Double),
            Transform::IDENTITY.scaled(HUSK_SCALE),
        );
        self.push(
            PartId::new(PartKind::Meat, index),
            group,
            segment(MEAT_RADIUS),
            Material::matte(colors::MEAT)
                .with_surface(0.4, 0.0)
                .with_side(Side::Back),
            Transform::IDENTITY,
        );
        self.push(
            PartId::new(PartKind::Cavity, index),
            group,
            segment(CAVITY_RADIUS),
            Material::matte(colors::CAVITY).with_surface(0.6, 0.0),
            Transform::IDENTITY,
        );

        if top {
            self.eyes_and_hole(step, group);
        }
    }

    fn tool(&mut self) {
        self.push(
            PartId::new(PartKind::Tool, 0),
            Group::Coconut,
            Primitive::Cylinder {
                radius_top: 0.012,
                radius_bottom: 0.012,
                height: 0.8,
            },
            Material::matte(colors::TOOL).with_surface(0.1, 0.9),
            Transform::at(Vec3::new(1.2, 1.2, 0.0)).rotated(Vec3::new(0.0, 0.0, -FRAC_PI_4)),
        );
    }

    fn pour(&mut self) {
        self.push(
            PartId::new(PartKind::WaterStream, 0),
            Group::World,
            Primitive::Cylinder {
                radius_top: 0.025,
                radius_bottom: 0.008,
                height: 1.0,
            },
            WATER,
            Transform::at(Vec3::new(POUR_X, STREAM_BASE_Y, 0.0)),
        );
        for i in 0..STREAM_DROPLET_COUNT as u8 {
            self.push(
                PartId::new(PartKind::StreamDroplet, i),
                Group::World,
                Primitive::Sphere { radius: 0.01 },
                Material::water(colors::WATER, 0.7),
                Transform::at(stream_droplet_position(i)),
            );
        }
        self.push(
            PartId::new(PartKind::Glass, 0),
            Group::World,
            Primitive::Cylinder {
                radius_top: 0.4,
                radius_bottom: 0.3,
                height: 0.7,
            },
            Material::water(colors::GLASS, 0.15).with_surface(0.05, 0.1),
            Transform::at(Vec3::new(POUR_X, -3.0, 0.0)),
        );
        self.push(
            PartId::new(PartKind::GlassWater, 0),
            Group::World,
            Primitive::Cylinder {
                radius_top: 0.35,
                radius_bottom: 0.25,
                height: 0.4,
            },
            Material::water(colors::GLASS_WATER, 0.9),
            Transform::at(Vec3::new(POUR_X, -3.1, 0.0)),
        );
    }

    fn seam(&mut self) {
        self.push(
            PartId::new(PartKind::SeamRing, 0),
            Group::Coconut,
            Primitive::Torus {
                radius: SEAM_RADIUS,
                tube: 0.02,
            },
            Material::matte(colors::SEAM)
                .with_surface(0.5, 0.0)
                .with_glow(colors::SEAM, 0.4),
            Transform::IDENTITY,
        );
    }

    fn crack_lines(&mut self) {
        self.push(
            PartId::new(PartKind::CrackRing, 0),
            Group::Coconut,
            Primitive::Torus {
                radius: SEAM_RADIUS,
                tube: 0.008,
            },
            Material::matte(colors::CRACK),
            Transform::IDENTITY,
        );
        for i in 0..CRACK_SHARD_COUNT {
            let f = f32::from(i);
            let angle = f * PI * 0.33;
            self.push(
                PartId::new(PartKind::CrackShard, i),
                Group::Coconut,
                Primitive::Cuboid {
                    size: Vec3::new(0.015, 0.4, 0.008),
                },
                Material::matte(colors::CRACK),
                Transform::at(Vec3::new(
                    angle.cos() * SHELL_RADIUS,
                    (f * 0.8).sin() * 0.1,
                    angle.sin() * SHELL_RADIUS,
                ))
                .rotated(Vec3::new(0.0, angle, 0.0)),
            );
        }
    }

    fn hammer(&mut self) {
        let handle = Transform::at(Vec3::new(0.0, 2.2, 0.0)).rotated(Vec3::new(0.0, 0.0, FRAC_PI_6));
        self.push(
            PartId::new(PartKind::HammerHandle, 0),
            Group::Coconut,
            Primitive::Cuboid {
                size: Vec3::new(1.0, 0.08, 0.04),
            },
            Material::matte(colors::HAMMER_HANDLE),
            handle,
        );
        // Head sits 0.4 along the handle, sharing its tilt
        let head_offset = crate::euler_to_quat(handle.rotation) * Vec3::new(0.4, 0.0, 0.0);
        self.push(
            PartId::new(PartKind::HammerHead, 0),
            Group::Coconut,
            Primitive::Cuboid {
                size: Vec3::new(0.25, 0.4, 0.2),
            },
            Material::matte(colors::HAMMER_HEAD).with_surface(0.2, 0.8),
            Transform::at(handle.position + head_offset).rotated(handle.rotation),
        );
    }

    /// Unposed droplet meshes; the pool supplies their transforms each frame
    fn droplet_slots(&mut self) {
        for i in 0..DROPLET_COUNT {
            self.push(
                PartId::new(PartKind::Droplet, i as u8),
                Group::Droplets,
                Primitive::Sphere {
                    radius: 0.02 + (i % 3) as f32 * 0.01,
                },
                Material::water(colors::WATER, 0.9).with_glow(colors::WATER_GLOW, 0.1),
                Transform::IDENTITY,
            );
        }
    }

    fn puddle(&mut self) {
        let flat = Vec3::new(-FRAC_PI_2, 0.0, 0.0);
        self.push(
            PartId::new(PartKind::Puddle, 0),
            Group::World,
            Primitive::Disc { radius: 1.8 },
            Material::water(colors::PUDDLE, 0.7)
                .with_surface(0.1, 0.2)
                .with_glow(colors::WATER_GLOW, 0.05),
            Transform::at(Vec3::new(0.0, PUDDLE_Y, 0.0)).rotated(flat),
        );
        for i in 0..RIPPLE_COUNT {
            let f = f32::from(i);
            self.push(
                PartId::new(PartKind::Ripple, i),
                Group::World,
                Primitive::Annulus {
                    inner: 0.5 + f * 0.2,
                    outer: 0.6 + f * 0.2,
                },
                Material::water(colors::WATER_GLOW, 0.3 - f * 0.1),
                Transform::at(Vec3::new(0.0, RIPPLE_Y, 0.0))
                    .rotated(flat)
                    .scaled(1.0 + f * 0.3),
            );
        }
    }

    /// Spill stream and static splash markers while the halves separate
    fn splash(&mut self) {
        self.push(
            PartId::new(PartKind::SpillStream, 0),
            Group::Coconut,
            Primitive::Cylinder {
                radius_top: 0.08,
                radius_bottom: 0.02,
                height: 1.5,
            },
            Material::water(colors::WATER, 0.6),
            Transform::IDENTITY,
        );
        for (i, position) in splash_positions().into_iter().enumerate() {
            self.push(
                PartId::new(PartKind::Splash, i as u8),
                Group::Coconut,
                Primitive::Sphere {
                    radius: SPLASH_RADIUS,
                },
                Material::water(colors::WATER_GLOW, 0.7).with_surface(0.1, 0.2),
                Transform::at(position),
            );
        }
    }
}
