//! Catalogue of the signals an ARKit face-tracking session records.
//!
//! Capture files carry one column per signal. Blendshape columns hold
//! weights in `[0, 1]`; rotation columns hold head and eye angles
//! normalized to `[-1, 1]` (one unit = 90 degrees).

/// The 52 ARKit blendshape names, in capture order.
pub const ARKIT_BLENDSHAPES: [&str; 52] = [
    "eyeBlinkRight",
    "eyeLookDownRight",
    "eyeLookInRight",
    "eyeLookOutRight",
    "eyeLookUpRight",
    "eyeSquintRight",
    "eyeWideRight",
    "eyeBlinkLeft",
    "eyeLookDownLeft",
    "eyeLookInLeft",
    "eyeLookOutLeft",
    "eyeLookUpLeft",
    "eyeSquintLeft",
    "eyeWideLeft",
    "jawForward",
    "jawRight",
    "jawLeft",
    "jawOpen",
    "mouthClose",
    "mouthFunnel",
    "mouthPucker",
    "mouthRight",
    "mouthLeft",
    "mouthSmileRight",
    "mouthSmileLeft",
    "mouthFrownRight",
    "mouthFrownLeft",
    "mouthDimpleRight",
    "mouthDimpleLeft",
    "mouthStretchRight",
    "mouthStretchLeft",
    "mouthRollLower",
    "mouthRollUpper",
    "mouthShrugLower",
    "mouthShrugUpper",
    "mouthPressRight",
    "mouthPressLeft",
    "mouthLowerDownRight",
    "mouthLowerDownLeft",
    "mouthUpperUpRight",
    "mouthUpperUpLeft",
    "browDownRight",
    "browDownLeft",
    "browInnerUp",
    "browOuterUpRight",
    "browOuterUpLeft",
    "cheekPuff",
    "cheekSquintRight",
    "cheekSquintLeft",
    "noseSneerRight",
    "noseSneerLeft",
    "tongueOut",
];

/// Head and eye rotation signals, named `<Part><Axis>`.
pub const ARKIT_ROTATIONS: [&str; 9] = [
    "HeadYaw",
    "HeadPitch",
    "HeadRoll",
    "LeftEyeYaw",
    "LeftEyePitch",
    "LeftEyeRoll",
    "RightEyeYaw",
    "RightEyePitch",
    "RightEyeRoll",
];

/// Whether `name` is one of the catalogued blendshapes.
pub fn is_blendshape(name: &str) -> bool {
    ARKIT_BLENDSHAPES.contains(&name)
}

/// Whether `name` is one of the catalogued rotation signals.
pub fn is_rotation(name: &str) -> bool {
    ARKIT_ROTATIONS.contains(&name)
}
