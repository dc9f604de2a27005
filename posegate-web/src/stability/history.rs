//! Rolling history of frames and their derivatives
//!
//! Fixed-capacity FIFO buffers, so memory stays at
//! O(capacity × landmarks) regardless of session length.

use std::collections::VecDeque;

use crate::physics::{finite_difference, positions, MotionField};
use crate::pose::PoseFrame;

/// Frames plus per-landmark positions, velocities and accelerations.
///
/// `positions[i]` belongs to `frames[i]`. Velocities need two frames and
/// accelerations three, so those buffers lag by one and two entries
/// until the window is full.
#[derive(Clone, Debug)]
pub struct StabilityHistory {
    capacity: usize,
    frames: VecDeque<PoseFrame>,
    positions: VecDeque<MotionField>,
    velocities: VecDeque<MotionField>,
    accelerations: VecDeque<MotionField>,
}

impl StabilityHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity + 1),
            positions: VecDeque::with_capacity(capacity + 1),
            velocities: VecDeque::with_capacity(capacity + 1),
            accelerations: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Append a frame observed `dt` seconds after the previous one.
    /// `dt` is ignored for the first frame.
    pub fn push(&mut self, frame: PoseFrame, dt: f64) {
        let current = positions(&frame);

        if let Some(previous) = self.positions.back() {
            let velocity = finite_difference(&current, previous, dt);
            if let Some(previous_velocity) = self.velocities.back() {
                let acceleration = finite_difference(&velocity, previous_velocity, dt);
                Self::push_bounded(&mut self.accelerations, acceleration, self.capacity);
            }
            Self::push_bounded(&mut self.velocities, velocity, self.capacity);
        }

        Self::push_bounded(&mut self.positions, current, self.capacity);
        Self::push_bounded(&mut self.frames, frame, self.capacity);
    }

    fn push_bounded<T>(buffer: &mut VecDeque<T>, item: T, capacity: usize) {
        buffer.push_back(item);
        while buffer.len() > capacity {
            buffer.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&PoseFrame> {
        self.frames.back()
    }

    pub fn frames(&self) -> &VecDeque<PoseFrame> {
        &self.frames
    }

    pub fn positions(&self) -> &VecDeque<MotionField> {
        &self.positions
    }

    pub fn velocities(&self) -> &VecDeque<MotionField> {
        &self.velocities
    }

    pub fn accelerations(&self) -> &VecDeque<MotionField> {
        &self.accelerations
    }

    /// Clear the buffers (session restart)
    pub fn clear(&mut self) {
        self.frames.clear();
        self.positions.clear();
        self.velocities.clear();
        self.accelerations.clear();
    }
}
