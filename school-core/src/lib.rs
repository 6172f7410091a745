#![cfg_attr(not(feature = "std"), no_std)]

//! Flocking simulation of a school of fish confined to a sphere.
//!
//! Each step applies three rules to every fish (cohesion, separation and
//! alignment), integrates the result and teleports any fish that left the
//! sphere to the opposite side of it.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use rand::Rng;

/// Divisor applied to the offset towards the perceived centre (rule 1).
pub const COHESION_DIVISOR: f32 = 1000.0;
/// Fish closer than this push each other apart (rule 2).
pub const SEPARATION_DISTANCE: f32 = 1.0;
/// Scale applied to the accumulated separation vector (rule 2).
pub const SEPARATION_SCALE: f32 = 0.1;
/// Divisor applied to the offset towards the perceived velocity (rule 3).
pub const ALIGNMENT_DIVISOR: f32 = 8.0;
/// Extra allowance past the sphere surface before a fish counts as outside.
///
/// Fish are initialised exactly on the surface, so without it the first
/// step could reflect them straight away.
pub const BOUNDARY_SLACK: f32 = 0.001;
/// Fraction of the initial position used as the inward starting velocity.
pub const INITIAL_SPEED_FACTOR: f32 = 0.01;

/// A 3D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3D {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn magnitude(&self) -> f32 {
        let squared = self.x * self.x + self.y * self.y + self.z * self.z;
        #[cfg(feature = "std")]
        {
            squared.sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrtf(squared)
        }
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self / mag
        } else {
            Self::zero()
        }
    }

    pub fn distance(&self, other: &Vector3D) -> f32 {
        (*self - *other).magnitude()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl core::ops::Add for Vector3D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl core::ops::Sub for Vector3D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl core::ops::Mul<f32> for Vector3D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }
}

impl core::ops::Div<f32> for Vector3D {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
            z: self.z / scalar,
        }
    }
}

impl core::ops::Neg for Vector3D {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

impl core::ops::AddAssign for Vector3D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
    }
}

impl core::ops::SubAssign for Vector3D {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
        self.z -= other.z;
    }
}

/// A single fish in the school.
///
/// Plain state holder: the school owns every rule that moves it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
    position: Vector3D,
    velocity: Vector3D,
    size: f32,
}

impl Fish {
    pub fn new(size: f32) -> Self {
        Self::with_state(Vector3D::zero(), Vector3D::zero(), size)
    }

    pub fn with_state(position: Vector3D, velocity: Vector3D, size: f32) -> Self {
        Self {
            position,
            velocity,
            size,
        }
    }

    pub fn position(&self) -> Vector3D {
        self.position
    }

    pub fn velocity(&self) -> Vector3D {
        self.velocity
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_position(&mut self, position: Vector3D) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vector3D) {
        self.velocity = velocity;
    }

    /// Whether the fish is at least `slack` past the surface of a sphere of
    /// `sphere_radius` (grown by the fish's own size) centred on the origin.
    pub fn is_bounds_collided(&self, sphere_radius: f32, slack: f32) -> bool {
        let allowance = sphere_radius + self.size + slack;
        self.position.magnitude() >= allowance
    }

    /// Teleports the fish to the antipodal point on the sphere surface.
    /// Velocity is left untouched.
    pub fn move_to_opposite_bounds(&mut self, sphere_radius: f32) {
        let surface = self.position.normalize() * (sphere_radius + self.size);
        self.position = -surface;
    }
}

/// Tuning constants for the three rules and the boundary check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleConfig {
    pub cohesion_divisor: f32,
    pub separation_distance: f32,
    pub separation_scale: f32,
    pub alignment_divisor: f32,
    pub boundary_slack: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cohesion_divisor: COHESION_DIVISOR,
            separation_distance: SEPARATION_DISTANCE,
            separation_scale: SEPARATION_SCALE,
            alignment_divisor: ALIGNMENT_DIVISOR,
            boundary_slack: BOUNDARY_SLACK,
        }
    }
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), SchoolError> {
        let checks = [
            ("cohesion_divisor", self.cohesion_divisor),
            ("separation_distance", self.separation_distance),
            ("separation_scale", self.separation_scale),
            ("alignment_divisor", self.alignment_divisor),
            ("boundary_slack", self.boundary_slack),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(SchoolError::InvalidRule { name, value });
            }
        }
        Ok(())
    }
}

/// Configuration for the school simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchoolConfig {
    pub fish_count: usize,
    pub sphere_radius: f32,
    pub fish_length: f32,
    pub rules: RuleConfig,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            fish_count: 10,
            sphere_radius: 10.0,
            fish_length: 1.0,
            rules: RuleConfig::default(),
        }
    }
}

impl SchoolConfig {
    pub fn new(fish_count: usize, sphere_radius: f32) -> Self {
        Self {
            fish_count,
            sphere_radius,
            ..Self::default()
        }
    }

    /// Rejects configurations the step algorithm cannot run with.
    ///
    /// Cohesion and alignment average over every *other* fish, so a school
    /// needs at least two members.
    pub fn validate(&self) -> Result<(), SchoolError> {
        if self.fish_count < 2 {
            return Err(SchoolError::TooFewFish {
                count: self.fish_count,
            });
        }
        if !self.sphere_radius.is_finite() || self.sphere_radius <= 0.0 {
            return Err(SchoolError::InvalidSphereRadius {
                radius: self.sphere_radius,
            });
        }
        if !self.fish_length.is_finite() || self.fish_length < 0.0 {
            return Err(SchoolError::InvalidFishLength {
                length: self.fish_length,
            });
        }
        self.rules.validate()
    }
}

/// Errors raised while building a school
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchoolError {
    #[error("a school needs at least 2 fish, got {count}")]
    TooFewFish { count: usize },
    #[error("sphere radius must be positive and finite, got {radius}")]
    InvalidSphereRadius { radius: f32 },
    #[error("fish length must be non-negative and finite, got {length}")]
    InvalidFishLength { length: f32 },
    #[error("rule constant `{name}` must be positive and finite, got {value}")]
    InvalidRule { name: &'static str, value: f32 },
    #[error("expected {expected} fish, got {actual}")]
    PopulationMismatch { expected: usize, actual: usize },
}

/// The three boid rules.
///
/// Every function takes the fish being steered plus an iterator over every
/// *other* fish in the school, all read from the same pre-step state.
pub mod rules {
    use super::*;

    /// Rule 1: steer towards the perceived centre of the other fish.
    pub fn cohesion<'a, I>(fish: &Fish, others: I, config: &RuleConfig) -> Vector3D
    where
        I: Iterator<Item = &'a Fish>,
    {
        let mut sum = Vector3D::zero();
        let mut count = 0;

        for other in others {
            sum += other.position;
            count += 1;
        }

        if count == 0 {
            return Vector3D::zero();
        }

        let perceived_centre = sum / count as f32;
        (perceived_centre - fish.position) / config.cohesion_divisor
    }

    /// Rule 2: move away from any fish closer than the separation distance.
    pub fn separation<'a, I>(fish: &Fish, others: I, config: &RuleConfig) -> Vector3D
    where
        I: Iterator<Item = &'a Fish>,
    {
        let mut correction = Vector3D::zero();

        for other in others {
            let offset = other.position - fish.position;
            if offset.magnitude() < config.separation_distance {
                correction -= offset;
            }
        }

        correction * config.separation_scale
    }

    /// Rule 3: match the perceived velocity of the other fish.
    pub fn alignment<'a, I>(fish: &Fish, others: I, config: &RuleConfig) -> Vector3D
    where
        I: Iterator<Item = &'a Fish>,
    {
        let mut sum = Vector3D::zero();
        let mut count = 0;

        for other in others {
            sum += other.velocity;
            count += 1;
        }

        if count == 0 {
            return Vector3D::zero();
        }

        let perceived_velocity = sum / count as f32;
        (perceived_velocity - fish.velocity) / config.alignment_divisor
    }

    /// Sum of all three rules for the fish at `index` in `school`.
    pub fn contribution(index: usize, school: &[Fish], config: &RuleConfig) -> Vector3D {
        let fish = &school[index];
        let others = || {
            school
                .iter()
                .enumerate()
                .filter(move |(other, _)| *other != index)
                .map(|(_, other)| other)
        };

        cohesion(fish, others(), config)
            + separation(fish, others(), config)
            + alignment(fish, others(), config)
    }
}

/// A fixed-size school of fish inside a bounding sphere
#[derive(Debug, Clone)]
pub struct School {
    fish: Vec<Fish>,
    config: SchoolConfig,
}

impl School {
    /// Builds a school seeded from the wall clock.
    #[cfg(feature = "std")]
    pub fn new(config: SchoolConfig) -> Result<Self, SchoolError> {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(config, seed)
    }

    #[cfg(feature = "std")]
    pub fn with_seed(config: SchoolConfig, seed: u64) -> Result<Self, SchoolError> {
        use rand::SeedableRng;

        log::debug!("Seeding school with {}", seed);
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        Self::with_rng(config, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(config: SchoolConfig, rng: &mut R) -> Result<Self, SchoolError> {
        config.validate()?;

        let fish = (0..config.fish_count)
            .map(|_| Fish::new(config.fish_length))
            .collect();
        let mut school = Self { fish, config };
        school.initialise_positions(rng);

        log::debug!(
            "Created school of {} fish in sphere of radius {}",
            config.fish_count,
            config.sphere_radius
        );
        Ok(school)
    }

    /// Builds a school from explicit fish state, skipping random placement.
    pub fn from_fish(config: SchoolConfig, fish: Vec<Fish>) -> Result<Self, SchoolError> {
        config.validate()?;

        if fish.len() != config.fish_count {
            return Err(SchoolError::PopulationMismatch {
                expected: config.fish_count,
                actual: fish.len(),
            });
        }

        Ok(Self { fish, config })
    }

    /// Places every fish at a random point on the sphere surface, drifting
    /// towards the centre.
    pub fn initialise_positions<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let high = self.config.sphere_radius;
        let low = -high;

        for fish in self.fish.iter_mut() {
            let direction = loop {
                let candidate = Vector3D::new(
                    rng.gen_range(low..=high),
                    rng.gen_range(low..=high),
                    rng.gen_range(low..=high),
                );
                // A zero draw has no direction to normalise.
                if candidate.magnitude() > 0.0 {
                    break candidate.normalize();
                }
            };

            let position = direction * (high + fish.size);
            fish.set_position(position);
            fish.set_velocity(-(position * INITIAL_SPEED_FACTOR));
        }

        log::debug!("Placed {} fish on the sphere surface", self.fish.len());
    }

    /// Advances the simulation by exactly one step.
    ///
    /// Returns how many fish were reflected to the opposite side of the
    /// sphere.
    pub fn update(&mut self) -> usize {
        let forces = self.rule_contributions();
        let sphere_radius = self.config.sphere_radius;
        let slack = self.config.rules.boundary_slack;
        let mut reflected = 0;

        for (index, (fish, force)) in self.fish.iter_mut().zip(forces.iter()).enumerate() {
            let velocity = fish.velocity + *force;
            let position = fish.position + velocity;
            debug_assert!(
                velocity.is_finite() && position.is_finite(),
                "fish {} left finite space",
                index
            );

            fish.set_position(position);
            fish.set_velocity(velocity);

            if fish.is_bounds_collided(sphere_radius, slack) {
                fish.move_to_opposite_bounds(sphere_radius);
                log::trace!("Fish {} reflected to {:?}", index, fish.position);
                reflected += 1;
            }
        }

        reflected
    }

    // Every contribution is computed before any fish is written back.
    fn rule_contributions(&self) -> Vec<Vector3D> {
        let school = self.fish.as_slice();
        let config = &self.config.rules;

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..school.len())
                .into_par_iter()
                .map(|index| rules::contribution(index, school, config))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..school.len())
                .map(|index| rules::contribution(index, school, config))
                .collect()
        }
    }

    /// Average position of every fish.
    pub fn centre_of_mass(&self) -> Vector3D {
        let mut sum = Vector3D::zero();
        for fish in &self.fish {
            sum += fish.position;
        }
        sum / self.fish.len() as f32
    }

    pub fn fish(&self) -> &[Fish] {
        &self.fish
    }

    pub fn fish_at(&self, index: usize) -> Option<&Fish> {
        self.fish.get(index)
    }

    pub fn fish_mut(&mut self, index: usize) -> Option<&mut Fish> {
        self.fish.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.fish.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fish.is_empty()
    }

    pub fn config(&self) -> &SchoolConfig {
        &self.config
    }

    pub fn sphere_radius(&self) -> f32 {
        self.config.sphere_radius
    }
}
