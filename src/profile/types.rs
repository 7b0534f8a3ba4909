//! Profile data types.

use serde::{Deserialize, Serialize};

/// Facial landmark payload attached to a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceData {
    /// Ordered feature coordinates.
    pub landmarks: Vec<f64>,
}

impl FaceData {
    /// Create face data from landmark coordinates.
    pub fn new(landmarks: impl Into<Vec<f64>>) -> Self {
        Self {
            landmarks: landmarks.into(),
        }
    }
}

/// An enrolled user and their facial landmarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Externally assigned, case-sensitive identifier.
    pub user_id: String,
    /// Enrolled landmarks.
    pub face_data: FaceData,
}

impl Profile {
    /// Create a new profile.
    pub fn new(user_id: impl Into<String>, face_data: FaceData) -> Self {
        Self {
            user_id: user_id.into(),
            face_data,
        }
    }
}

/// Find the first profile with the given id.
pub fn find<'a>(profiles: &'a [Profile], user_id: &str) -> Option<&'a Profile> {
    profiles.iter().find(|p| p.user_id == user_id)
}

/// Find the first profile with the given id, mutably.
pub fn find_mut<'a>(profiles: &'a mut [Profile], user_id: &str) -> Option<&'a mut Profile> {
    profiles.iter_mut().find(|p| p.user_id == user_id)
}
