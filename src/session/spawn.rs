//! Starting territory placement.

use crate::game::{Coord, PlayerId, World};

/// Tiles within `radius` (Manhattan) of `center`, clipped to the map.
///
/// Yields row-major order so placement is deterministic. Radii wider than
/// the map are clamped to its span.
#[must_use]
pub fn spawn_diamond(world: &World, center: Coord, radius: u16) -> Vec<usize> {
    let reach = i32::from(world.map.width()) + i32::from(world.map.height());
    let radius_i = i32::from(radius).min(reach);
    let cx = i32::from(center.x);
    let cy = i32::from(center.y);

    let mut tiles = Vec::new();
    for dy in -radius_i..=radius_i {
        let span = radius_i - dy.abs();
        for dx in -span..=span {
            let (Ok(x), Ok(y)) = (u16::try_from(cx + dx), u16::try_from(cy + dy)) else {
                continue;
            };
            if let Some(tile) = world.map.index_of(Coord::new(x, y)) {
                tiles.push(tile);
            }
        }
    }
    tiles
}

/// Claim the unowned part of a spawn diamond for `player`.
///
/// Tiles already held by another player are left alone. Troops are clamped
/// to the new territory's cap afterwards. Returns the number of tiles
/// claimed.
pub fn claim_spawn(world: &mut World, player: PlayerId, center: Coord, radius: u16) -> u32 {
    let mut claimed = 0;
    for tile in spawn_diamond(world, center, radius) {
        if world.map.is_unclaimed(tile) {
            world.transfer_tile(tile, player);
            claimed += 1;
        }
    }
    if let Some(p) = world.player_mut(player) {
        p.clamp_troops();
    }
    claimed
}
