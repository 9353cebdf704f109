//! Fixed pick-lists offered by the roasting report form

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A form value that does not match any known option
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

/// Declares an enum whose variants are stored and displayed by their form label.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every option, in form order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseLabelError;

            /// Case-insensitive match against the form label
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ParseLabelError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

labelled_enum! {
    /// Roastery locations that submit batch reports
    Roastery ("roastery") {
        MartinPlace => "Martin Place Store",
        Bondi => "Bondi Store",
        Coogee => "Coogee Store",
        Paddington => "Paddington Store",
        SurryHills => "Surry Hills Store",
        Bronte => "Bronte Store",
        Newtown => "Newtown Store",
    }
}

labelled_enum! {
    /// Green bean country of origin
    Origin ("origin") {
        Brazil => "Brazil",
        Colombia => "Colombia",
        CostaRica => "Costa Rica",
        ElSalvador => "El Salvador",
        Ethiopia => "Ethiopia",
        Guatemala => "Guatemala",
        Honduras => "Honduras",
        India => "India",
        Indonesia => "Indonesia",
        Kenya => "Kenya",
        Mexico => "Mexico",
        Nicaragua => "Nicaragua",
        Panama => "Panama",
        PapuaNewGuinea => "Papua New Guinea",
        Peru => "Peru",
        Rwanda => "Rwanda",
        Tanzania => "Tanzania",
        Uganda => "Uganda",
        Vietnam => "Vietnam",
        Yemen => "Yemen",
    }
}

labelled_enum! {
    /// Roast levels
    RoastLevel ("roast level") {
        Light => "Light",
        Medium => "Medium",
        MediumDark => "Medium-Dark",
        Dark => "Dark",
    }
}

/// Options for the report form's select inputs
#[derive(Debug, Clone, Serialize)]
pub struct FormOptions {
    pub roasteries: &'static [Roastery],
    pub origins: &'static [Origin],
    pub roast_levels: &'static [RoastLevel],
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            roasteries: Roastery::ALL,
            origins: Origin::ALL,
            roast_levels: RoastLevel::ALL,
        }
    }
}
