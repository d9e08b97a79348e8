//! Collaborator cursor markers.

use rand::Rng;

/// Identity of a marker. Equal to the owning session's id.
pub type MarkerId = u64;

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Rgb {
    /// Create a colour from components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uniformly random colour.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.gen_range(0..=255), rng.gen_range(0..=255), rng.gen_range(0..=255))
    }
}

/// A named, coloured cursor position shown to other sessions.
///
/// Each session owns exactly one marker and updates its position on every
/// render. Other sessions only read snapshots of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCursorMarker {
    /// Owning session.
    pub owner: MarkerId,
    /// Display colour.
    pub color: Rgb,
    /// Display name.
    pub name: String,
    /// Char offset into the document.
    pub position: usize,
}

impl RemoteCursorMarker {
    /// New marker at offset 0.
    pub fn new(owner: MarkerId, name: impl Into<String>, color: Rgb) -> Self {
        Self { owner, color, name: name.into(), position: 0 }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn random_colour_is_seed_deterministic() {
        let a = Rgb::random(&mut StdRng::seed_from_u64(7));
        let b = Rgb::random(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
