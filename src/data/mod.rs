// Data structures shared by the bridge, the observable objects and the host helpers

/// Implements integer-coded serde for wire enumerations.
///
/// The type must provide `code(&self) -> i64` and `from_code(i64) -> Option<Self>`.
macro_rules! impl_code_serde {
    ($type:ty, $label:expr) => {
        impl serde::Serialize for $type {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i64(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $type {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let code = <i64 as serde::Deserialize>::deserialize(deserializer)?;
                <$type>::from_code(code).ok_or_else(|| {
                    <D::Error as serde::de::Error>::custom(format!("unknown {} {}", $label, code))
                })
            }
        }
    };
}

pub mod action;
pub mod loop_mode;
pub mod metadata;
pub mod object_type;
pub mod playback_status;
pub mod playlist;
pub mod show_kind;
pub mod track;

// Re-export types from child modules
pub use action::*;
pub use loop_mode::*;
pub use metadata::*;
pub use object_type::*;
pub use playback_status::*;
pub use playlist::*;
pub use show_kind::*;
pub use track::*;
