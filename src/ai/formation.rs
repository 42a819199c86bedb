//! Squad formation slot allocation
//!
//! Converts a squad's ordered membership into per-member target positions
//! around a shared reference point. A member's slot depends only on its
//! index, the squad size, the shape and the spacing, so repeated queries
//! with the same inputs are bit-identical.

use crate::core::config::FormationConfig;
use crate::core::types::{AgentId, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Geometric arrangement of a squad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormationShape {
    /// Centered row along the X axis
    #[default]
    Line,
    /// Centered file along the Z axis
    Column,
    /// Ring of radius `2 * spacing` on the ground plane
    Circle,
}

impl FormationShape {
    pub fn all() -> [FormationShape; 3] {
        [
            FormationShape::Line,
            FormationShape::Column,
            FormationShape::Circle,
        ]
    }
}

impl std::str::FromStr for FormationShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(FormationShape::Line),
            "column" => Ok(FormationShape::Column),
            "circle" => Ok(FormationShape::Circle),
            other => Err(format!("unknown formation shape: {}", other)),
        }
    }
}

/// Compute the slot for member `index` of `count` around `reference`
///
/// Returns `reference` unchanged when `index` is not below `count`.
pub fn slot_position(
    shape: FormationShape,
    index: usize,
    count: usize,
    spacing: f32,
    reference: Vec3,
) -> Vec3 {
    if index >= count {
        return reference;
    }

    match shape {
        FormationShape::Line => Vec3::new(
            reference.x + lateral_offset(index, count, spacing),
            reference.y,
            reference.z,
        ),
        FormationShape::Column => Vec3::new(
            reference.x,
            reference.y,
            reference.z + lateral_offset(index, count, spacing),
        ),
        FormationShape::Circle => {
            let angle = index as f32 * (TAU / count as f32);
            let radius = spacing * 2.0;
            Vec3::new(
                reference.x + radius * angle.cos(),
                reference.y,
                reference.z + radius * angle.sin(),
            )
        }
    }
}

/// Offset of slot `index` from the center of a row of `count` slots
fn lateral_offset(index: usize, count: usize, spacing: f32) -> f32 {
    let center = (count - 1) as f32 * 0.5;
    (index as f32 - center) * spacing
}

/// Compute positions for every slot of a formation of `count` members
pub fn compute_formation_positions(
    shape: FormationShape,
    spacing: f32,
    reference: Vec3,
    count: usize,
) -> Vec<Vec3> {
    (0..count)
        .map(|i| slot_position(shape, i, count, spacing, reference))
        .collect()
}

/// Ordered, deduplicated squad membership plus formation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormationAllocator<H = AgentId> {
    members: Vec<H>,
    shape: FormationShape,
    spacing: f32,
}

impl<H> Default for FormationAllocator<H> {
    fn default() -> Self {
        Self::new(FormationShape::default(), FormationConfig::default().spacing)
    }
}

impl<H> FormationAllocator<H> {
    pub fn new(shape: FormationShape, spacing: f32) -> Self {
        Self {
            members: Vec::new(),
            shape,
            spacing: sanitize_spacing(spacing),
        }
    }

    pub fn from_config(config: &FormationConfig) -> Self {
        Self::new(config.shape, config.spacing)
    }

    pub fn shape(&self) -> FormationShape {
        self.shape
    }

    pub fn set_shape(&mut self, shape: FormationShape) {
        if shape != self.shape {
            tracing::debug!("Formation shape {:?} -> {:?}", self.shape, shape);
            self.shape = shape;
        }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = sanitize_spacing(spacing);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in slot order
    pub fn members(&self) -> &[H] {
        &self.members
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }
}

impl<H: PartialEq> FormationAllocator<H> {
    /// Append a member; adding a tracked member is a no-op
    ///
    /// Returns true if the member was added.
    pub fn add_member(&mut self, member: H) -> bool {
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Remove a member; later members shift down one slot
    ///
    /// Returns true if the member was tracked.
    pub fn remove_member(&mut self, member: &H) -> bool {
        match self.index_of(member) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, member: &H) -> bool {
        self.members.iter().any(|m| m == member)
    }

    /// Slot index of a member
    pub fn index_of(&self, member: &H) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }

    /// Target position of `member` relative to `reference`
    ///
    /// Untracked members go straight to the reference point.
    pub fn position(&self, member: &H, reference: Vec3) -> Vec3 {
        match self.index_of(member) {
            Some(index) => slot_position(
                self.shape,
                index,
                self.members.len(),
                self.spacing,
                reference,
            ),
            None => reference,
        }
    }
}

impl<H: Clone> FormationAllocator<H> {
    /// Target positions for every member, in slot order
    pub fn positions(&self, reference: Vec3) -> Vec<(H, Vec3)> {
        let count = self.members.len();
        self.members
            .iter()
            .enumerate()
            .map(|(i, m)| {
                (
                    m.clone(),
                    slot_position(self.shape, i, count, self.spacing, reference),
                )
            })
            .collect()
    }
}

fn sanitize_spacing(spacing: f32) -> f32 {
    if spacing.is_finite() {
        spacing.max(0.0)
    } else {
        0.0
    }
}
