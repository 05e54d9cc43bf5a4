//! Kinematic vehicle model.
//!
//! A bicycle-style model: steering sets the yaw rate, throttle and brake change
//! speed, and the direction of travel trails the heading so that fast turns
//! build up a slip angle.

use std::f64::consts::{PI, TAU};

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::brain::Controls;
use super::geometric_utils::OrientedBox;

/// Physical parameters shared by all vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Body length along the heading.
    pub length: f64,
    /// Body width.
    pub width: f64,
    /// Distance between axles.
    pub wheelbase: f64,
    /// Steering angle at full lock (radians).
    pub max_steer: f64,
    /// Acceleration at full throttle.
    pub acceleration: f64,
    /// Deceleration at full brake.
    pub braking: f64,
    /// Linear drag coefficient.
    pub drag: f64,
    /// Hard speed cap.
    pub max_speed: f64,
    /// Speed above which a tick counts as speeding.
    pub speed_limit: f64,
    /// Rate at which the travel direction catches up with the heading.
    pub grip: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            length: 4.0,
            width: 2.0,
            wheelbase: 2.6,
            max_steer: 0.5,
            acceleration: 8.0,
            braking: 16.0,
            drag: 0.05,
            max_speed: 40.0,
            speed_limit: 30.0,
            grip: 6.0,
        }
    }
}

/// State of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vehicle {
    /// Position of the body center.
    pub pos: Coord<f64>,
    /// Facing direction (radians).
    pub heading: f64,
    /// Direction of travel (radians).
    pub travel: f64,
    /// Forward speed, never negative.
    pub speed: f64,
    /// Yaw rate of the last step (radians per second).
    pub yaw_rate: f64,
}

impl Vehicle {
    /// Vehicle at rest.
    pub fn new(pos: Coord<f64>, heading: f64) -> Self {
        Self {
            pos,
            heading,
            travel: heading,
            speed: 0.0,
            yaw_rate: 0.0,
        }
    }

    /// Signed angle between heading and direction of travel.
    pub fn slip_angle(&self) -> f64 {
        wrap_angle(self.heading - self.travel)
    }

    /// Body rectangle.
    pub fn footprint(&self, params: &VehicleParams) -> OrientedBox {
        OrientedBox::new(self.pos, params.length, params.width, self.heading)
    }

    /// Advances the vehicle by `dt` seconds.
    ///
    /// # Returns
    ///
    /// The distance travelled.
    pub fn step(&mut self, controls: Controls, dt: f64, params: &VehicleParams) -> f64 {
        let throttle = f64::from(controls.throttle).clamp(-1.0, 1.0);
        let steer = f64::from(controls.steer).clamp(-1.0, 1.0);

        let accel = if throttle >= 0.0 {
            throttle * params.acceleration
        } else {
            throttle * params.braking
        };
        self.speed += (accel - params.drag * self.speed) * dt;
        self.speed = self.speed.clamp(0.0, params.max_speed);

        self.yaw_rate = self.speed * (steer * params.max_steer).tan() / params.wheelbase;
        self.heading = wrap_angle(self.heading + self.yaw_rate * dt);

        let catch_up = (params.grip * dt).clamp(0.0, 1.0);
        self.travel = wrap_angle(self.travel + wrap_angle(self.heading - self.travel) * catch_up);

        let distance = self.speed * dt;
        self.pos.x += self.travel.cos() * distance;
        self.pos.y += self.travel.sin() * distance;
        distance
    }
}

/// Maps an angle to `[-PI, PI)`.
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}
