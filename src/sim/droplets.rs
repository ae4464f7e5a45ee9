//! Droplet particle system
//!
//! A fixed pool of droplets spilling out of the cracked coconut. Each droplet
//! runs a closed-form projectile curve over a repeating cycle. Once it lands
//! (or outlives its lifetime) it rests at its landing point until the cycle
//! wraps, and only then are its spawn origin/velocity re-rolled. The pool
//! never drains.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::clamp_visual;
use crate::consts::*;
use crate::steps::Step;

/// Radius of the static splash markers shown while the halves separate
pub const SPLASH_RADIUS: f32 = 0.015;

/// One pooled droplet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub origin: Vec3,
    pub velocity: Vec3,
    /// Offset into the animation cycle (seconds)
    pub phase_offset: f32,
    /// Mesh radius
    pub base_size: f32,
    /// Initial spin angle (radians)
    pub rotation_seed: f32,
    /// Cycle the current trajectory belongs to
    #[serde(default)]
    cycle: i64,
    /// Resting point once landed, until the cycle wraps
    #[serde(default)]
    landed: Option<Vec3>,
}

impl Droplet {
    fn spawn(slot: usize, rng: &mut Pcg32) -> Self {
        let (origin, velocity) = sample_launch(rng);
        Self {
            origin,
            velocity,
            phase_offset: rng.random::<f32>() * 2.0,
            base_size: 0.02 + (slot % 3) as f32 * 0.01,
            rotation_seed: rng.random::<f32>() * std::f32::consts::TAU,
            cycle: 0,
            landed: None,
        }
    }

    /// Re-roll origin and velocity for `cycle`; phase and spin seed are kept
    fn respawn(&mut self, cycle: i64, rng: &mut Pcg32) {
        let (origin, velocity) = sample_launch(rng);
        self.origin = origin;
        self.velocity = velocity;
        self.cycle = cycle;
        self.landed = None;
    }

    /// Index of the cycle containing `since_onset`
    #[inline]
    pub fn cycle_at(&self, since_onset: f32) -> i64 {
        ((since_onset + self.phase_offset) / DROPLET_CYCLE).floor() as i64
    }

    /// Where the droplet came to rest in its current cycle, if it has landed
    pub fn landed(&self) -> Option<Vec3> {
        self.landed
    }

    /// Time within the droplet's current cycle
    #[inline]
    pub fn local_time(&self, since_onset: f32) -> f32 {
        (since_onset + self.phase_offset).rem_euclid(DROPLET_CYCLE)
    }

    /// Unclamped projectile position `t` seconds into the cycle
    pub fn position_at(&self, t: f32) -> Vec3 {
        Vec3::new(
            self.origin.x + self.velocity.x * t * AIR_RESISTANCE,
            self.origin.y + self.velocity.y * t + 0.5 * GRAVITY * t * t,
            self.origin.z + self.velocity.z * t * AIR_RESISTANCE,
        )
    }
}

/// Spawn origin just inside the opened shell and a mostly-downward launch velocity
fn sample_launch(rng: &mut Pcg32) -> (Vec3, Vec3) {
    let origin = Vec3::new(
        (rng.random::<f32>() - 0.5) * 1.5,
        0.2 + rng.random::<f32>() * 0.3,
        (rng.random::<f32>() - 0.5) * 1.5,
    );
    let velocity = Vec3::new(
        (rng.random::<f32>() - 0.5) * 2.0,
        -1.5 - rng.random::<f32>() * 2.0,
        (rng.random::<f32>() - 0.5) * 2.0,
    );
    (origin, velocity)
}

/// Render transform for one droplet on one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropletTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    /// Uniform scale in `[DROPLET_MIN_SCALE, 1]`
    pub scale: f32,
    /// Opacity in `[DROPLET_MIN_OPACITY, 1]`
    pub opacity: f32,
}

/// Fixed-size droplet pool with its own seeded RNG
#[derive(Debug, Clone)]
pub struct DropletPool {
    droplets: Vec<Droplet>,
    rng: Pcg32,
    recycled: u64,
}

impl DropletPool {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let droplets = (0..DROPLET_COUNT)
            .map(|slot| Droplet::spawn(slot, &mut rng))
            .collect();
        Self {
            droplets,
            rng,
            recycled: 0,
        }
    }

    pub fn droplets(&self) -> &[Droplet] {
        &self.droplets
    }

    /// Total respawns since the pool was created
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    /// Advance every droplet to `since_onset` seconds after crack onset, writing transforms into `out`
    pub fn update_into(&mut self, since_onset: f32, out: &mut Vec<DropletTransform>) {
        out.clear();
        for (slot, droplet) in self.droplets.iter_mut().enumerate() {
            let cycle = droplet.cycle_at(since_onset);
            if cycle != droplet.cycle {
                log::trace!("Droplet {} respawned for cycle {}", slot, cycle);
                droplet.respawn(cycle, &mut self.rng);
                self.recycled += 1;
            }

            let t = droplet.local_time(since_onset);
            let position = match droplet.landed {
                Some(rest) => rest,
                None => {
                    let p = droplet.position_at(t);
                    if p.y < GROUND_LEVEL || t > DROPLET_LIFETIME {
                        let rest = Vec3::new(p.x, p.y.max(GROUND_LEVEL), p.z);
                        log::trace!("Droplet {} landed at {:?} (t={:.2})", slot, rest, t);
                        droplet.landed = Some(rest);
                        rest
                    } else {
                        p
                    }
                }
            };

            out.push(DropletTransform {
                position,
                rotation: Vec3::new(
                    droplet.rotation_seed + since_onset * DROPLET_SPIN_X,
                    0.0,
                    droplet.rotation_seed + since_onset * DROPLET_SPIN_Z,
                ),
                scale: clamp_visual(1.0 - t * DROPLET_SHRINK_RATE, DROPLET_MIN_SCALE),
                opacity: clamp_visual(1.0 - t * DROPLET_FADE_RATE, DROPLET_MIN_OPACITY),
            });
        }
    }

    /// Allocating variant of [`update_into`](Self::update_into)
    pub fn update(&mut self, since_onset: f32) -> Vec<DropletTransform> {
        let mut out = Vec::with_capacity(DROPLET_COUNT);
        self.update_into(since_onset, &mut out);
        out
    }
}

/// Droplet pool gated by step, created lazily on first activation
#[derive(Debug, Clone)]
pub struct DropletSystem {
    seed: u64,
    pool: Option<DropletPool>,
    transforms: Vec<DropletTransform>,
}

impl DropletSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            pool: None,
            transforms: Vec::with_capacity(DROPLET_COUNT),
        }
    }

    pub fn pool(&self) -> Option<&DropletPool> {
        self.pool.as_ref()
    }

    /// Per-frame entry point; renders nothing before the crack step
    pub fn activate(&mut self, step: Step, time: f32, onset: f32) -> &[DropletTransform] {
        if !step.is_cracked() {
            self.transforms.clear();
            return &self.transforms;
        }
        let seed = self.seed;
        let pool = self.pool.get_or_insert_with(|| {
            log::debug!("Creating droplet pool ({} droplets, seed {})", DROPLET_COUNT, seed);
            DropletPool::new(seed)
        });
        pool.update_into(time - onset, &mut self.transforms);
        &self.transforms
    }
}

/// Fixed layout of the splash markers around the puddle
pub fn splash_positions() -> [Vec3; SPLASH_COUNT] {
    std::array::from_fn(|i| {
        let i = i as f32;
        Vec3::new(
            (i * 0.4).sin() * 0.8,
            -1.5 + (i * 0.3).cos() * 0.3,
            (i * 0.4).cos() * 0.8,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_initial_ranges() {
        let pool = DropletPool::new(7);
        assert_eq!(pool.droplets().len(), DROPLET_COUNT);
        for d in pool.droplets() {
            assert!(d.origin.x >= -0.75 && d.origin.x < 0.75);
            assert!(d.origin.y >= 0.2 && d.origin.y < 0.5);
            assert!(d.origin.z >= -0.75 && d.origin.z < 0.75);
            assert!(d.velocity.x >= -1.0 && d.velocity.x < 1.0);
            assert!(d.velocity.y <= -1.5 && d.velocity.y > -3.5);
            assert!(d.phase_offset >= 0.0 && d.phase_offset < 2.0);
            assert!(d.base_size > 0.0);
            assert!(d.rotation_seed >= 0.0 && d.rotation_seed < std::f32::consts::TAU);
        }
    }

    #[test]
    fn test_same_seed_same_droplets() {
        let mut a = DropletPool::new(1234);
        let mut b = DropletPool::new(1234);
        for frame in 0..120 {
            let t = frame as f32 / 60.0;
            assert_eq!(a.update(t), b.update(t));
        }
        assert_eq!(a.recycled(), b.recycled());
    }

    #[test]
    fn test_projectile_curve() {
        let droplet = Droplet {
            origin: Vec3::new(0.0, 0.5, 0.0),
            velocity: Vec3::new(1.0, -2.0, -1.0),
            phase_offset: 0.0,
            base_size: 0.02,
            rotation_seed: 0.0,
            cycle: 0,
            landed: None,
        };
        let p = droplet.position_at(1.0);
        assert!((p.x - 0.98).abs() < 1e-6);
        assert!((p.y - (0.5 - 2.0 - 2.4)).abs() < 1e-6);
        assert!((p.z + 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_transforms_stay_above_ground_and_clamped() {
        let mut pool = DropletPool::new(99);
        for frame in 0..600 {
            for t in pool.update(frame as f32 / 30.0) {
                assert!(t.position.y >= GROUND_LEVEL);
                assert!(t.scale >= DROPLET_MIN_SCALE && t.scale <= 1.0);
                assert!(t.opacity >= DROPLET_MIN_OPACITY && t.opacity <= 1.0);
                assert!(t.position.is_finite());
            }
        }
        assert!(pool.recycled() > 0);
    }

    #[test]
    fn test_landed_droplets_stay_put() {
        let mut pool = DropletPool::new(42);
        let mut prev = pool.update(0.0);
        let mut grounded = 0;
        for frame in 1..180 {
            let next = pool.update(frame as f32 / 60.0);
            for (a, b) in prev.iter().zip(&next) {
                if a.position.y == GROUND_LEVEL && b.position.y == GROUND_LEVEL {
                    grounded += 1;
                    let jump = (a.position - b.position).length();
                    assert!(jump < 1e-6, "grounded droplet moved {}", jump);
                }
            }
            prev = next;
        }
        assert!(grounded > 0);
    }

    #[test]
    fn test_respawn_only_on_cycle_wrap() {
        let mut pool = DropletPool::new(8);
        for frame in 0..120 {
            pool.update(frame as f32 / 60.0);
        }
        let cycles: Vec<_> = pool.droplets().iter().map(|d| d.cycle_at(119.0 / 60.0)).collect();
        let expected = cycles.iter().filter(|&&c| c > 0).count() as u64;
        assert_eq!(pool.recycled(), expected);

        // A fresh trajectory starts well above ground
        for (d, c) in pool.droplets().iter().zip(&cycles) {
            if *c > 0 {
                assert!(d.position_at(0.0).y > 0.0);
            }
        }
    }

    #[test]
    fn test_recycle_keeps_phase_and_seed() {
        let mut pool = DropletPool::new(5);
        let before: Vec<_> = pool
            .droplets()
            .iter()
            .map(|d| (d.phase_offset, d.rotation_seed, d.base_size))
            .collect();
        for frame in 0..300 {
            pool.update(frame as f32 / 20.0);
        }
        assert!(pool.recycled() > 0);
        let after: Vec<_> = pool
            .droplets()
            .iter()
            .map(|d| (d.phase_offset, d.rotation_seed, d.base_size))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_system_inactive_before_crack() {
        let mut system = DropletSystem::new(1);
        for n in 1..=6 {
            let step = Step::new(n).unwrap();
            assert!(system.activate(step, 3.0, 0.0).is_empty());
        }
        assert!(system.pool().is_none());

        let crack = Step::new(7).unwrap();
        assert_eq!(system.activate(crack, 3.0, 2.0).len(), DROPLET_COUNT);
        assert!(system.pool().is_some());
        assert!(system.activate(Step::new(6).unwrap(), 4.0, 2.0).is_empty());
    }

    #[test]
    fn test_splash_layout() {
        let splash = splash_positions();
        assert_eq!(splash.len(), SPLASH_COUNT);
        assert!(splash[0].abs_diff_eq(Vec3::new(0.0, -1.2, 0.8), 1e-6));
    }
}
