//! Territory map: tile ownership and grid geometry.
//!
//! Tiles are addressed by a flat row-major index. The map is the single
//! source of truth for ownership; player border sets are caches over it.

use serde::{Deserialize, Serialize};

use crate::game::PlayerId;

/// A coordinate on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column).
    pub x: u16,
    /// Y coordinate (row).
    pub y: u16,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another coordinate.
    #[must_use]
    pub fn manhattan(self, other: Coord) -> u32 {
        u32::from(self.x.abs_diff(other.x)) + u32::from(self.y.abs_diff(other.y))
    }
}

/// Ownership grid for the whole map.
#[derive(Debug, Clone)]
pub struct TerritoryMap {
    /// Width of the map in tiles.
    width: u16,
    /// Height of the map in tiles.
    height: u16,
    /// Owner per tile in row-major order (None = unclaimed).
    owners: Vec<Option<PlayerId>>,
}

impl TerritoryMap {
    /// Create a new map with every tile unclaimed.
    ///
    /// Returns `None` if width or height is zero.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let size = usize::from(width) * usize::from(height);
        Some(Self {
            width,
            height,
            owners: vec![None; size],
        })
    }

    /// Get the width of the map.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the height of the map.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Total number of tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.owners.len()
    }

    /// Check if a coordinate is within the map bounds.
    #[must_use]
    pub const fn in_bounds(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Convert a coordinate to a tile index.
    #[must_use]
    pub fn index_of(&self, coord: Coord) -> Option<usize> {
        if self.in_bounds(coord) {
            Some(usize::from(coord.y) * usize::from(self.width) + usize::from(coord.x))
        } else {
            None
        }
    }

    /// Convert a tile index back to a coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn coord_of(&self, tile: usize) -> Coord {
        let width = usize::from(self.width);
        Coord::new((tile % width) as u16, (tile / width) as u16)
    }

    /// Owner of a tile, `None` if unclaimed or out of range.
    #[must_use]
    #[inline]
    pub fn owner(&self, tile: usize) -> Option<PlayerId> {
        self.owners.get(tile).copied().flatten()
    }

    /// Check whether `player` owns `tile`.
    #[must_use]
    #[inline]
    pub fn is_owner(&self, tile: usize, player: PlayerId) -> bool {
        self.owner(tile) == Some(player)
    }

    /// Check whether a tile has no owner.
    #[must_use]
    #[inline]
    pub fn is_unclaimed(&self, tile: usize) -> bool {
        self.owner(tile).is_none()
    }

    /// Set the owner of a tile, returning the previous owner.
    ///
    /// Out-of-range tiles are ignored and report `None`.
    pub fn set_owner(&mut self, tile: usize, owner: Option<PlayerId>) -> Option<PlayerId> {
        match self.owners.get_mut(tile) {
            Some(slot) => std::mem::replace(slot, owner),
            None => None,
        }
    }

    /// Get the grid neighbours of a tile (up, down, left, right).
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid indices in `0..count`.
    #[must_use]
    #[inline]
    pub fn neighbors(&self, tile: usize) -> ([usize; 4], u8) {
        let width = usize::from(self.width);
        let height = usize::from(self.height);
        let x = tile % width;
        let y = tile / width;

        let mut result = [0usize; 4];
        let mut count = 0u8;

        if y > 0 {
            result[count as usize] = tile - width; // up
            count += 1;
        }
        if y + 1 < height {
            result[count as usize] = tile + width; // down
            count += 1;
        }
        if x > 0 {
            result[count as usize] = tile - 1; // left
            count += 1;
        }
        if x + 1 < width {
            result[count as usize] = tile + 1; // right
            count += 1;
        }

        (result, count)
    }

    /// Check whether a tile touches a differently-owned tile or the map edge.
    #[must_use]
    pub fn is_border(&self, tile: usize) -> bool {
        let owner = self.owner(tile);
        let (neighbors, count) = self.neighbors(tile);
        if count < 4 {
            return true;
        }
        neighbors.iter().any(|&n| self.owner(n) != owner)
    }

    /// Iterate over all tile indices owned by a player.
    pub fn tiles_owned_by(&self, player: PlayerId) -> impl Iterator<Item = usize> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(move |(_, owner)| **owner == Some(player))
            .map(|(tile, _)| tile)
    }

    /// Count tiles owned by a player.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn count_owned_by(&self, player: PlayerId) -> u32 {
        self.tiles_owned_by(player).count() as u32
    }
}
