//! Mounting orientation of the sensor package.

use core::{fmt, str::FromStr};

use crate::measurement::Vector3;

/// Signed permutation matrix mapping sensor axes onto the board frame
pub type RotationMatrix = [[i8; 3]; 3];

/// Physical rotation of the package relative to the board's reference frame
///
/// "Obverse" means the package is mounted top-side up, "reverse" upside down.
/// The remaining part names where the sensor's X axis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MountingOrientation {
    #[default]
    ObverseXAxisForward,
    ObverseXAxisRightward,
    ObverseXAxisBackward,
    ObverseXAxisLeftward,
    ReverseXAxisForward,
    ReverseXAxisRightward,
    ReverseXAxisBackward,
    ReverseXAxisLeftward,
}

/// The orientation name did not match any [`MountingOrientation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownOrientation;

impl fmt::Display for UnknownOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown mounting orientation")
    }
}

impl core::error::Error for UnknownOrientation {}

impl MountingOrientation {
    /// Every orientation, in table order
    pub const ALL: [Self; 8] = [
        Self::ObverseXAxisForward,
        Self::ObverseXAxisRightward,
        Self::ObverseXAxisBackward,
        Self::ObverseXAxisLeftward,
        Self::ReverseXAxisForward,
        Self::ReverseXAxisRightward,
        Self::ReverseXAxisBackward,
        Self::ReverseXAxisLeftward,
    ];

    /// Configuration name of this orientation, e.g. `obverse-x-axis-forward`
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ObverseXAxisForward => "obverse-x-axis-forward",
            Self::ObverseXAxisRightward => "obverse-x-axis-rightward",
            Self::ObverseXAxisBackward => "obverse-x-axis-backward",
            Self::ObverseXAxisLeftward => "obverse-x-axis-leftward",
            Self::ReverseXAxisForward => "reverse-x-axis-forward",
            Self::ReverseXAxisRightward => "reverse-x-axis-rightward",
            Self::ReverseXAxisBackward => "reverse-x-axis-backward",
            Self::ReverseXAxisLeftward => "reverse-x-axis-leftward",
        }
    }

    /// Rotation matrix, row-major: `out[i] = sum(m[i][j] * in[j])`
    #[must_use]
    pub const fn matrix(self) -> RotationMatrix {
        match self {
            Self::ObverseXAxisForward => [[0, -1, 0], [1, 0, 0], [0, 0, 1]],
            Self::ObverseXAxisRightward => [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
            Self::ObverseXAxisBackward => [[0, 1, 0], [-1, 0, 0], [0, 0, 1]],
            Self::ObverseXAxisLeftward => [[-1, 0, 0], [0, -1, 0], [0, 0, 1]],
            Self::ReverseXAxisForward => [[0, 1, 0], [1, 0, 0], [0, 0, -1]],
            Self::ReverseXAxisRightward => [[1, 0, 0], [0, -1, 0], [0, 0, -1]],
            Self::ReverseXAxisBackward => [[0, -1, 0], [-1, 0, 0], [0, 0, -1]],
            Self::ReverseXAxisLeftward => [[-1, 0, 0], [0, 1, 0], [0, 0, -1]],
        }
    }

    /// Rotate a sensor-frame vector into the board frame
    #[must_use]
    pub fn apply(self, v: Vector3) -> Vector3 {
        let m = self.matrix();
        let input = [v.x, v.y, v.z];
        let row = |r: [i8; 3]| {
            r.iter()
                .zip(input)
                .map(|(&k, c)| i32::from(k) * c)
                .sum::<i32>()
        };

        Vector3 {
            x: row(m[0]),
            y: row(m[1]),
            z: row(m[2]),
        }
    }
}

impl FromStr for MountingOrientation {
    type Err = UnknownOrientation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.name() == s)
            .ok_or(UnknownOrientation)
    }
}

impl fmt::Display for MountingOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
