//! Controller state payloads.
//!
//! [`ControllerState`] is the per-frame input snapshot carried by an
//! upstream input-change event. [`WireControls`] is its compact outbound
//! form: two-letter keys, booleans flattened to `0`/`1`, consumed by the
//! browser overlay that feeds a virtual gamepad.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Immutable snapshot of one player's controls for a single frame.
///
/// Analog axes are normalized to `[-1, 1]`. Values are passed through
/// as delivered; the bridge does not clamp them. All nine fields must be
/// present in the upstream payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Jump button held.
    pub jump: bool,
    /// Steering axis.
    pub steer: f32,
    /// Throttle axis (negative is reverse).
    pub throttle: f32,
    /// Pitch axis.
    pub pitch: f32,
    /// Yaw axis.
    pub yaw: f32,
    /// Roll axis.
    pub roll: f32,
    /// Boost button held.
    pub boost: bool,
    /// Handbrake button held.
    pub handbrake: bool,
    /// Use-item button held.
    pub use_item: bool,
}

/// Outbound encoding of a [`ControllerState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WireControls {
    /// Jump, `0` or `1`.
    pub jm: u8,
    /// Steer.
    pub st: f32,
    /// Throttle.
    pub th: f32,
    /// Pitch.
    pub pt: f32,
    /// Yaw.
    pub yw: f32,
    /// Roll.
    pub rl: f32,
    /// Boost, `0` or `1`.
    pub bs: u8,
    /// Handbrake, `0` or `1`.
    pub hb: u8,
    /// Use item, `0` or `1`.
    pub us: u8,
}

impl From<&ControllerState> for WireControls {
    fn from(cs: &ControllerState) -> Self {
        Self {
            jm: u8::from(cs.jump),
            st: cs.steer,
            th: cs.throttle,
            pt: cs.pitch,
            yw: cs.yaw,
            rl: cs.roll,
            bs: u8::from(cs.boost),
            hb: u8::from(cs.handbrake),
            us: u8::from(cs.use_item),
        }
    }
}
