//! Force-directed layout simulation.
//!
//! Node bodies live in a flat arena indexed by [`NodeHandle`]: positions,
//! velocities, collision radii and pin flags are parallel vectors. The engine
//! is the only writer of positions; the renderer and the interaction layer
//! read them through [`LayoutEngine::positions`].
//!
//! Each tick applies, in order:
//! 1. charge repulsion between every pair of bodies
//! 2. link attraction toward a target separation
//! 3. a weak pull toward the mean of each axis
//! 4. velocity integration with damping
//! 5. bounded collision resolution
//! 6. a translation of the whole layout toward the center point, which the
//!    owner keeps on the world point under the viewport center
//!
//! Force magnitudes are multiplied by the simulation temperature `alpha`,
//! which decays geometrically every tick. Below `alpha_min` the engine stops
//! moving anything and reports [`TickOutcome::Settled`] exactly once.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use log::debug;
use thiserror::Error;

use super::model::{NodeHandle, Snapshot};

/// 2-D vector in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn length_sq(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	pub fn length(self) -> f64 {
		self.length_sq().sqrt()
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	/// Scales the vector down so its length is at most `max`.
	pub fn clamp_length(self, max: f64) -> Self {
		let len = self.length();
		if len > max && len > 0.0 {
			self * (max / len)
		} else {
			self
		}
	}
}

impl Add for Vec2 {
	type Output = Vec2;
	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Vec2 {
	type Output = Vec2;
	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Vec2;
	fn mul(self, rhs: f64) -> Vec2 {
		Vec2::new(self.x * rhs, self.y * rhs)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Vec2) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl SubAssign for Vec2 {
	fn sub_assign(&mut self, rhs: Vec2) {
		self.x -= rhs.x;
		self.y -= rhs.y;
	}
}

/// Rejected layout parameter.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
	#[error("{field} must be finite and non-negative, got {value}")]
	Negative { field: &'static str, value: f64 },

	#[error("{field} must be finite and positive, got {value}")]
	NotPositive { field: &'static str, value: f64 },

	#[error("{field} must lie strictly between 0 and 1, got {value}")]
	OutOfUnitRange { field: &'static str, value: f64 },

	#[error("max_ticks must be at least 1")]
	NoTicks,

	#[error("zoom clamp must satisfy 0 < min <= max, got ({min}, {max})")]
	ZoomClamp { min: f64, max: f64 },
}

/// Physics parameters. Defaults are empirically tuned for graphs of a few
/// hundred nodes; none of the constants is load-bearing.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
	/// Repulsion between every pair of nodes. Force falls off as `1 / distance`.
	pub charge_strength: f64,
	/// Target separation of linked nodes in world units at zoom 1.
	pub link_distance: f64,
	/// Fraction of the length error corrected per tick, scaled by edge strength.
	pub link_strength: f64,
	/// Collision radius as a multiple of node `size`.
	pub collision_radius_multiplier: f64,
	/// Fraction of each overlap resolved per pass.
	pub collision_strength: f64,
	/// Overlap resolution passes per tick.
	pub collision_iterations: u32,
	/// Translation of the layout's mean toward the viewport center per tick.
	pub center_strength: f64,
	/// Pull of every node toward the mean of each axis.
	pub axis_strength: f64,
	/// Geometric decay of `alpha` per tick.
	pub alpha_decay: f64,
	/// `alpha` below which the layout is settled.
	pub alpha_min: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Largest displacement of any node in one tick.
	pub max_displacement: f64,
	/// Hard bound on ticks before the layout is declared settled.
	pub max_ticks: u32,
	/// Bounds applied to the zoom factor before it scales physics. Matches the
	/// renderer's node growth so collision radii track drawn bodies.
	pub zoom_clamp: (f64, f64),
	/// Smallest distance used in force denominators.
	pub distance_floor: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			charge_strength: 300.0,
			link_distance: 80.0,
			link_strength: 0.3,
			collision_radius_multiplier: 1.6,
			collision_strength: 0.7,
			collision_iterations: 2,
			center_strength: 0.05,
			axis_strength: 0.02,
			// 300 ticks from alpha 1 to alpha_min
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			alpha_min: 0.001,
			velocity_decay: 0.4,
			max_displacement: 30.0,
			max_ticks: 600,
			zoom_clamp: (0.8, 2.5),
			distance_floor: 1.0,
		}
	}
}

impl LayoutConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		let non_negative = [
			("charge_strength", self.charge_strength),
			("link_strength", self.link_strength),
			("collision_radius_multiplier", self.collision_radius_multiplier),
			("collision_strength", self.collision_strength),
			("center_strength", self.center_strength),
			("axis_strength", self.axis_strength),
		];
		for (field, value) in non_negative {
			if !value.is_finite() || value < 0.0 {
				return Err(ConfigError::Negative { field, value });
			}
		}

		let positive = [
			("link_distance", self.link_distance),
			("alpha_min", self.alpha_min),
			("max_displacement", self.max_displacement),
			("distance_floor", self.distance_floor),
		];
		for (field, value) in positive {
			if !value.is_finite() || value <= 0.0 {
				return Err(ConfigError::NotPositive { field, value });
			}
		}

		for (field, value) in [
			("alpha_decay", self.alpha_decay),
			("velocity_decay", self.velocity_decay),
		] {
			if !(value > 0.0 && value < 1.0) {
				return Err(ConfigError::OutOfUnitRange { field, value });
			}
		}

		if self.max_ticks == 0 {
			return Err(ConfigError::NoTicks);
		}

		let (min, max) = self.zoom_clamp;
		if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
			return Err(ConfigError::ZoomClamp { min, max });
		}
		Ok(())
	}
}

/// Result of one [`LayoutEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// Positions were updated.
	Running,
	/// The simulation just converged. Reported once per run.
	Settled,
	/// Already settled; nothing moved.
	Idle,
}

#[derive(Clone, Copy, Debug)]
struct Link {
	source: usize,
	target: usize,
	strength: f64,
}

/// Single-writer force simulation over an arena of node bodies.
pub struct LayoutEngine {
	config: LayoutConfig,
	ids: Vec<String>,
	index: HashMap<String, NodeHandle>,
	positions: Vec<Vec2>,
	velocities: Vec<Vec2>,
	sizes: Vec<f64>,
	pinned: Vec<bool>,
	links: Vec<Link>,
	center: Vec2,
	zoom: f64,
	alpha: f64,
	ticks: u32,
	settled: bool,
}

/// Initial spacing of the seed spiral in world units.
const SEED_RADIUS: f64 = 10.0;

impl LayoutEngine {
	pub fn new(config: LayoutConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		Ok(Self::unchecked(config))
	}

	fn unchecked(config: LayoutConfig) -> Self {
		Self {
			config,
			ids: Vec::new(),
			index: HashMap::new(),
			positions: Vec::new(),
			velocities: Vec::new(),
			sizes: Vec::new(),
			pinned: Vec::new(),
			links: Vec::new(),
			center: Vec2::ZERO,
			zoom: 1.0,
			alpha: 1.0,
			ticks: 0,
			settled: false,
		}
	}

	/// Replaces the simulated graph and restarts at full energy.
	///
	/// Nodes with a finite entry in `seeds` start there; the rest are placed
	/// on a phyllotaxis spiral around the center. Handles follow the order of
	/// `snapshot.nodes`.
	pub fn load(&mut self, snapshot: &Snapshot, seeds: &HashMap<String, Vec2>) {
		let n = snapshot.nodes.len();
		self.ids = snapshot.nodes.iter().map(|node| node.id.clone()).collect();
		self.index = snapshot
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), NodeHandle(i as u32)))
			.collect();
		self.sizes = snapshot
			.nodes
			.iter()
			.map(|node| {
				if node.size.is_finite() && node.size > 0.0 {
					node.size
				} else {
					super::model::DEFAULT_NODE_SIZE
				}
			})
			.collect();
		self.positions = snapshot
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				seeds
					.get(&node.id)
					.copied()
					.filter(|p| p.is_finite())
					.unwrap_or_else(|| self.spiral_seed(i))
			})
			.collect();
		self.velocities = vec![Vec2::ZERO; n];
		self.pinned = vec![false; n];
		self.links = snapshot
			.edge_handles()
			.into_iter()
			.zip(&snapshot.edges)
			.filter_map(|(handles, edge)| {
				let (source, target) = handles?;
				(source != target).then(|| Link {
					source: source.index(),
					target: target.index(),
					strength: edge.strength,
				})
			})
			.collect();

		self.alpha = 1.0;
		self.ticks = 0;
		self.settled = false;
		debug!(
			"kg-canvas: layout loaded {} bodies, {} links ({} seeded)",
			n,
			self.links.len(),
			snapshot
				.nodes
				.iter()
				.filter(|node| seeds.contains_key(&node.id))
				.count()
		);
	}

	fn spiral_seed(&self, i: usize) -> Vec2 {
		let radius = SEED_RADIUS * (0.5 + i as f64).sqrt();
		let angle = i as f64 * PI * (3.0 - 5.0_f64.sqrt());
		self.center + Vec2::new(radius * angle.cos(), radius * angle.sin())
	}

	/// Restores energy without re-seeding, e.g. after a node was dragged.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
		self.ticks = 0;
		if self.alpha >= self.config.alpha_min {
			self.settled = false;
		}
	}

	/// Moves the point the layout is centered on. Seeding uses it from the
	/// next [`LayoutEngine::load`]; centering from the next tick.
	pub fn set_center(&mut self, center: Vec2) {
		if center.is_finite() {
			self.center = center;
		}
	}

	/// Records the current zoom factor. Takes effect on the next tick.
	pub fn set_zoom(&mut self, zoom: f64) {
		if zoom.is_finite() && zoom > 0.0 {
			self.zoom = zoom;
		}
	}

	fn zoom_factor(&self) -> f64 {
		let (min, max) = self.config.zoom_clamp;
		self.zoom.clamp(min, max)
	}

	/// Fixes a node at `position` until the next [`LayoutEngine::load`].
	pub fn pin(&mut self, handle: NodeHandle, position: Vec2) {
		let i = handle.index();
		if i < self.positions.len() && position.is_finite() {
			self.positions[i] = position;
			self.velocities[i] = Vec2::ZERO;
			self.pinned[i] = true;
		}
	}

	/// Advances the simulation by one step.
	pub fn tick(&mut self) -> TickOutcome {
		if self.settled {
			return TickOutcome::Idle;
		}
		if self.positions.is_empty() {
			self.settled = true;
			return TickOutcome::Settled;
		}

		let previous = self.positions.clone();
		let k = self.zoom_factor();
		let alpha = self.alpha;

		self.apply_charge(alpha, k);
		self.apply_links(alpha, k);
		self.apply_axis_pull(alpha);
		self.integrate();
		self.resolve_collisions(k);
		self.apply_centering();
		self.finish_step(&previous);

		self.alpha *= 1.0 - self.config.alpha_decay;
		self.ticks += 1;
		if self.alpha < self.config.alpha_min || self.ticks >= self.config.max_ticks {
			self.settled = true;
			debug!(
				"kg-canvas: layout settled after {} ticks (alpha {:.4})",
				self.ticks, self.alpha
			);
			return TickOutcome::Settled;
		}
		TickOutcome::Running
	}

	fn is_active(&self, i: usize) -> bool {
		self.positions[i].is_finite() && self.velocities[i].is_finite()
	}

	fn apply_charge(&mut self, alpha: f64, k: f64) {
		let strength = self.config.charge_strength * k * alpha;
		let floor_sq = self.config.distance_floor * self.config.distance_floor;
		let n = self.positions.len();

		for i in 0..n {
			if !self.is_active(i) {
				continue;
			}
			for j in (i + 1)..n {
				if !self.is_active(j) {
					continue;
				}
				let delta = self.positions[i] - self.positions[j];
				let dist_sq = delta.length_sq();
				let direction = if dist_sq > 1e-12 {
					delta * (1.0 / dist_sq.sqrt())
				} else {
					// Coincident bodies: separate along a deterministic angle.
					let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
					Vec2::new(angle.cos(), angle.sin())
				};
				let push = direction * (strength / dist_sq.max(floor_sq).sqrt());
				self.velocities[i] += push;
				self.velocities[j] -= push;
			}
		}
	}

	fn apply_links(&mut self, alpha: f64, k: f64) {
		let target = self.config.link_distance * k;
		for link in &self.links {
			let (s, t) = (link.source, link.target);
			if !(self.positions[s].is_finite() && self.positions[t].is_finite()) {
				continue;
			}
			let delta = self.positions[t] - self.positions[s];
			let distance = delta.length().max(self.config.distance_floor);
			let correction = (distance - target) / distance
				* self.config.link_strength
				* link.strength
				* alpha;
			let adjust = delta * (correction * 0.5);
			self.velocities[s] += adjust;
			self.velocities[t] -= adjust;
		}
	}

	fn apply_axis_pull(&mut self, alpha: f64) {
		let Some(mean) = self.mean_position() else {
			return;
		};
		let strength = self.config.axis_strength * alpha;
		for i in 0..self.positions.len() {
			if self.is_active(i) {
				let pull = (mean - self.positions[i]) * strength;
				self.velocities[i] += pull;
			}
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.config.velocity_decay;
		for i in 0..self.positions.len() {
			if self.pinned[i] {
				self.velocities[i] = Vec2::ZERO;
				continue;
			}
			if !self.is_active(i) {
				continue;
			}
			self.velocities[i] = (self.velocities[i] * keep).clamp_length(self.config.max_displacement);
			let step = self.velocities[i];
			self.positions[i] += step;
		}
	}

	fn resolve_collisions(&mut self, k: f64) {
		let scale = self.config.collision_radius_multiplier * k;
		let n = self.positions.len();
		for _ in 0..self.config.collision_iterations {
			for i in 0..n {
				if !self.positions[i].is_finite() {
					continue;
				}
				for j in (i + 1)..n {
					if !self.positions[j].is_finite() {
						continue;
					}
					let reach = (self.sizes[i] + self.sizes[j]) * scale;
					let delta = self.positions[j] - self.positions[i];
					let dist_sq = delta.length_sq();
					if dist_sq >= reach * reach {
						continue;
					}
					let distance = dist_sq.sqrt();
					let direction = if distance > 1e-6 {
						delta * (1.0 / distance)
					} else {
						let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
						Vec2::new(angle.cos(), angle.sin())
					};
					let overlap = (reach - distance) * self.config.collision_strength;
					match (self.pinned[i], self.pinned[j]) {
						(true, true) => {}
						(true, false) => self.positions[j] += direction * overlap,
						(false, true) => self.positions[i] -= direction * overlap,
						(false, false) => {
							let half = direction * (overlap * 0.5);
							self.positions[i] -= half;
							self.positions[j] += half;
						}
					}
				}
			}
		}
	}

	fn apply_centering(&mut self) {
		let Some(mean) = self.mean_position() else {
			return;
		};
		let shift = (self.center - mean) * self.config.center_strength;
		for i in 0..self.positions.len() {
			if !self.pinned[i] && self.positions[i].is_finite() {
				self.positions[i] += shift;
			}
		}
	}

	/// Bounds each body's total displacement for the tick and discards
	/// non-finite results.
	fn finish_step(&mut self, previous: &[Vec2]) {
		let max = self.config.max_displacement;
		for (i, before) in previous.iter().enumerate() {
			if !before.is_finite() {
				continue;
			}
			let moved = self.positions[i] - *before;
			if !moved.is_finite() || !self.velocities[i].is_finite() {
				self.positions[i] = *before;
				self.velocities[i] = Vec2::ZERO;
				continue;
			}
			self.positions[i] = *before + moved.clamp_length(max);
		}
	}

	fn mean_position(&self) -> Option<Vec2> {
		let mut sum = Vec2::ZERO;
		let mut count = 0usize;
		for p in self.positions.iter().filter(|p| p.is_finite()) {
			sum += *p;
			count += 1;
		}
		(count > 0).then(|| sum * (1.0 / count as f64))
	}

	/// Positions indexed by [`NodeHandle`].
	pub fn positions(&self) -> &[Vec2] {
		&self.positions
	}

	pub fn position(&self, handle: NodeHandle) -> Option<Vec2> {
		self.positions.get(handle.index()).copied()
	}

	pub fn handle_of(&self, id: &str) -> Option<NodeHandle> {
		self.index.get(id).copied()
	}

	/// Current positions keyed by node id, for seeding a later load.
	pub fn seeds(&self) -> HashMap<String, Vec2> {
		self.ids
			.iter()
			.zip(&self.positions)
			.filter(|(_, p)| p.is_finite())
			.map(|(id, p)| (id.clone(), *p))
			.collect()
	}

	/// Axis-aligned box covering every finite body, each padded by its
	/// `size × radius_scale`.
	pub fn bounds(&self, radius_scale: f64) -> Option<(Vec2, Vec2)> {
		let mut min = Vec2::new(f64::INFINITY, f64::INFINITY);
		let mut max = Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
		for (p, size) in self.positions.iter().zip(&self.sizes) {
			if !p.is_finite() {
				continue;
			}
			let size = size * radius_scale;
			min.x = min.x.min(p.x - size);
			min.y = min.y.min(p.y - size);
			max.x = max.x.max(p.x + size);
			max.y = max.y.max(p.y + size);
		}
		(min.is_finite() && max.is_finite()).then_some((min, max))
	}
}

impl Default for LayoutEngine {
	fn default() -> Self {
		Self::unchecked(LayoutConfig::default())
	}
}
