//! Store keys for proxied tiles.

use std::fmt;

use crate::tile::TileCoord;

/// File-name-safe key for a tile blob.
///
/// The three coordinates are written in decimal separated by `_`, so distinct
/// tiles never share a key and the key parses back to its tile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey(String);

impl TileKey {
    const EXTENSION: &'static str = ".png";

    pub fn for_tile(coord: TileCoord) -> Self {
        Self(format!(
            "{}_{}_{}{}",
            coord.z,
            coord.x,
            coord.y,
            Self::EXTENSION
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Recover the tile a key was built from.
    pub fn parse(key: &str) -> Option<TileCoord> {
        let stem = key.strip_suffix(Self::EXTENSION)?;
        let mut parts = stem.split('_');
        let z = parse_component(parts.next()?)?;
        let x = parse_component(parts.next()?)?;
        let y = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(TileCoord::new(z, x, y))
    }
}

/// Parse an unsigned decimal coordinate, digits only.
pub(crate) fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
