use crate::playback::Playback;
use anyhow::Result;
use school_core::{School, Vector3D};
use school_shared::{FishSnapshot, Point3, SchoolSnapshot};
use std::io::Write;

pub fn point(vector: Vector3D) -> Point3 {
    Point3::new(vector.x, vector.y, vector.z)
}

pub fn snapshot(school: &School, step: u64) -> SchoolSnapshot {
    let fish = school
        .fish()
        .iter()
        .map(|fish| FishSnapshot {
            position: point(fish.position()),
            velocity: point(fish.velocity()),
            size: fish.size(),
        })
        .collect();

    SchoolSnapshot {
        step,
        sphere_radius: school.sphere_radius(),
        centre_of_mass: point(school.centre_of_mass()),
        fish,
    }
}

/// A school together with the caller-side run state that drives it
pub struct Simulation {
    school: School,
    playback: Playback,
    steps: u64,
}

impl Simulation {
    pub fn new(school: School, playback: Playback) -> Self {
        Self {
            school,
            playback,
            steps: 0,
        }
    }

    pub fn school(&self) -> &School {
        &self.school
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    /// Number of steps the school has taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Runs one frame, returning whether the school moved.
    pub fn frame(&mut self) -> bool {
        let stepped = self.playback.tick(&mut self.school);
        if stepped {
            self.steps += 1;
        }
        stepped
    }

    pub fn snapshot(&self) -> SchoolSnapshot {
        snapshot(&self.school, self.steps)
    }

    /// Runs `frames` frames, writing a JSON snapshot line first and then
    /// after every `every`-th frame.
    pub fn run_batch<W: Write>(&mut self, frames: u64, every: u64, out: &mut W) -> Result<()> {
        let every = every.max(1);

        if !self.playback.is_playing() {
            log::warn!("Playback is paused; the school will not move");
        }

        writeln!(out, "{}", self.snapshot().to_json()?)?;

        for frame in 1..=frames {
            self.frame();
            if frame % every == 0 {
                writeln!(out, "{}", self.snapshot().to_json()?)?;
            }
        }

        log::info!("Ran {} frames, {} steps", frames, self.steps);
        Ok(())
    }
}
