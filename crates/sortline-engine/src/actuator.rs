//! The single diverting arm shared by every package.
//!
//! The arm extends toward the bottom of the package it last dispatched,
//! then retracts to zero. It does not know which package it serves and
//! does not gate the package's own drop; both animate in parallel.

use serde::Serialize;

/// Extend/retract state of the diverting arm.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Actuator {
    x: f64,
    base_y: f64,
    current_length: f64,
    target_length: f64,
    extend_rate: f64,
    extending: bool,
}

impl Actuator {
    /// A fully retracted arm parked at `x`.
    pub fn new(x: f64, base_y: f64, extend_rate: f64) -> Self {
        Self {
            x,
            base_y,
            current_length: 0.0,
            target_length: 0.0,
            extend_rate,
            extending: false,
        }
    }

    /// Start extending toward a package whose bottom edge will rest at
    /// `target_bottom`. Lanes sit below the base, but the distance is
    /// taken as an absolute value regardless.
    pub fn dispatch(&mut self, target_bottom: f64) {
        self.target_length = (target_bottom - self.base_y).abs();
        self.extending = true;
    }

    /// Advance one tick.
    ///
    /// While extending the length grows by `extend_rate`; extension stops
    /// on the tick it reaches or passes the target. Otherwise the arm
    /// retracts by `extend_rate`, never below zero.
    pub fn advance(&mut self) {
        if self.extending {
            if self.current_length < self.target_length {
                self.current_length += self.extend_rate;
            }
            if self.current_length >= self.target_length {
                self.extending = false;
            }
        } else if self.current_length > 0.0 {
            self.current_length = (self.current_length - self.extend_rate).max(0.0);
        }
    }

    /// Move the arm to a new decision zone.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Horizontal position of the arm.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position of the arm's base.
    pub fn base_y(&self) -> f64 {
        self.base_y
    }

    /// Current reach.
    pub fn current_length(&self) -> f64 {
        self.current_length
    }

    /// Reach the arm is extending toward.
    pub fn target_length(&self) -> f64 {
        self.target_length
    }

    /// Whether the arm is still extending.
    pub fn is_extending(&self) -> bool {
        self.extending
    }
}
