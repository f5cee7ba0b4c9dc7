//! Arena of pose nodes forming the frame tree.
//!
//! Frames reference their parents by handle rather than by pointer: the
//! arena owns every pose node, and a [`FrameId`] points to, but does not
//! own, a node. The world frame is the implicit root and has no node.

use crate::error::{KinetError, Result};
use crate::pose::{FramedPoint, FramedVector, Pose};
use crate::transform::Transform;

/// Handle to a pose node in a [`FrameArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameId(u32);

/// A reference frame: either the global (world) frame or a pose node.
///
/// Every frame-tagged quantity carries one of these; there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameRef {
    /// The global frame.
    World,
    /// The frame of a pose node in the arena.
    Pose(FrameId),
}

impl FrameRef {
    /// Whether this is the global frame.
    pub fn is_world(&self) -> bool {
        matches!(self, FrameRef::World)
    }
}

/// Owns the pose nodes of a frame forest.
///
/// Mutating a node (a body moving) implicitly moves every frame beneath it;
/// chain resolution always reads the current node values.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameArena {
    nodes: Vec<Pose>,
}

impl FrameArena {
    /// Empty arena: only the world frame exists.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Number of pose nodes (the world root is not counted).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no pose nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a pose node and return its handle.
    ///
    /// The pose's parent must already exist in the arena (or be the world),
    /// which keeps insertion from creating cycles.
    pub fn insert(&mut self, pose: Pose) -> Result<FrameId> {
        self.check_ref(pose.parent)?;
        let id = FrameId(self.nodes.len() as u32);
        self.nodes.push(pose);
        Ok(id)
    }

    /// Read a pose node.
    pub fn get(&self, id: FrameId) -> Result<&Pose> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(KinetError::InvalidIndex {
                index: id.0 as usize,
                len: self.nodes.len(),
            })
    }

    /// Overwrite a pose node (a body moved or was re-parented).
    pub fn set(&mut self, id: FrameId, pose: Pose) -> Result<()> {
        self.check_ref(pose.parent)?;
        let len = self.nodes.len();
        let slot = self
            .nodes
            .get_mut(id.0 as usize)
            .ok_or(KinetError::InvalidIndex {
                index: id.0 as usize,
                len,
            })?;
        *slot = pose;
        Ok(())
    }

    /// Whether `frame` is the world or a live handle.
    pub fn contains(&self, frame: FrameRef) -> bool {
        match frame {
            FrameRef::World => true,
            FrameRef::Pose(id) => (id.0 as usize) < self.nodes.len(),
        }
    }

    /// The transform mapping quantities expressed in `frame` into the
    /// world frame, composed along the relative-pose chain.
    pub fn to_world(&self, frame: FrameRef) -> Result<Transform> {
        let mut rot = kinet_math::Mat3::identity();
        let mut x = kinet_math::Vec3::zeros();

        let mut cur = frame;
        let mut steps = 0usize;
        while let FrameRef::Pose(id) = cur {
            let node = self.get(id)?;
            rot = node.rot * rot;
            x = node.rot * x + node.x;
            cur = node.parent;
            steps += 1;
            if steps > self.nodes.len() {
                return Err(KinetError::Precondition(
                    "pose chain contains a cycle".into(),
                ));
            }
        }
        Ok(Transform::new(rot, x, frame, FrameRef::World))
    }

    /// The transform mapping quantities expressed in `source` into
    /// `target`, for any two frames in the forest.
    ///
    /// Both chains are walked to the root and one is composed with the
    /// inverse of the other; the world frame is always a valid common
    /// ancestor, so this never requires the frames to be directly linked.
    pub fn transform_between(&self, source: FrameRef, target: FrameRef) -> Result<Transform> {
        let up = self.to_world(source)?;
        let down = self.to_world(target)?.inverse();
        up.compose(&down)
    }

    /// Re-express a point in `target`.
    pub fn transform_point(&self, p: &FramedPoint, target: FrameRef) -> Result<FramedPoint> {
        self.transform_between(p.frame, target)?.transform_point(p)
    }

    /// Re-express a free vector in `target` (rotation only).
    pub fn transform_vector(&self, v: &FramedVector, target: FrameRef) -> Result<FramedVector> {
        self.transform_between(v.frame, target)?.transform_vector(v)
    }

    /// The rigid placement of frame `id` expressed relative to `target`.
    pub fn resolve_pose(&self, id: FrameId, target: FrameRef) -> Result<Pose> {
        let t = self.transform_between(FrameRef::Pose(id), target)?;
        Ok(Pose::new(t.rot, t.x, target))
    }

    fn check_ref(&self, frame: FrameRef) -> Result<()> {
        if !self.contains(frame) {
            if let FrameRef::Pose(id) = frame {
                return Err(KinetError::InvalidIndex {
                    index: id.0 as usize,
                    len: self.nodes.len(),
                });
            }
        }
        Ok(())
    }
}
