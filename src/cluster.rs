//! Crystal clusters: a substrate plus crystals that abut instead of overlapping.

use crate::errors::ClipError;
use crate::float_types::Real;
use crate::polyhedron::Polyhedron;
use crate::render::TriangleSink;
use nalgebra::Point3;
use tracing::{debug, instrument};

/// A union of polyhedra in which each crystal added is clipped against the
/// substrate and every crystal already present, so later crystals grow
/// around earlier ones.
#[derive(Debug, Clone)]
pub struct Cluster<S: Clone> {
    substrate: Option<Polyhedron<S>>,
    crystals: Vec<Polyhedron<S>>,
}

impl<S: Clone> Default for Cluster<S> {
    fn default() -> Self {
        Cluster {
            substrate: None,
            crystals: Vec::new(),
        }
    }
}

impl<S: Clone> Cluster<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_substrate(substrate: Polyhedron<S>) -> Self {
        Cluster {
            substrate: Some(substrate),
            crystals: Vec::new(),
        }
    }

    pub const fn substrate(&self) -> Option<&Polyhedron<S>> {
        self.substrate.as_ref()
    }

    pub fn crystals(&self) -> &[Polyhedron<S>] {
        &self.crystals
    }

    /// Clip `crystal` against everything already in the cluster and keep what
    /// is left. Returns false when nothing was left to keep.
    #[instrument(skip_all, fields(existing = self.crystals.len()))]
    pub fn add_crystal(&mut self, mut crystal: Polyhedron<S>) -> Result<bool, ClipError> {
        if let Some(substrate) = &self.substrate {
            crystal.clip_to(substrate)?;
        }
        for other in &self.crystals {
            if crystal.is_empty() {
                break;
            }
            crystal.clip_to(other)?;
        }

        if crystal.is_empty() {
            debug!("crystal fully enclosed, dropped");
            return Ok(false);
        }
        self.crystals.push(crystal);
        Ok(true)
    }

    pub fn contains(&self, point: &Point3<Real>) -> bool {
        self.substrate.iter().any(|s| s.contains(point))
            || self.crystals.iter().any(|c| c.contains(point))
    }

    /// Total volume of substrate and crystals.
    pub fn volume(&self) -> Result<Real, ClipError> {
        let mut total = 0.0;
        for part in self.substrate.iter().chain(&self.crystals) {
            total += part.volume()?;
        }
        Ok(total)
    }

    pub fn draw<R: TriangleSink<S>>(&self, renderer: &mut R) -> Result<(), ClipError> {
        for part in self.substrate.iter().chain(&self.crystals) {
            part.draw(renderer)?;
        }
        Ok(())
    }
}
