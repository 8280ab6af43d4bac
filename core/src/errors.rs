//! Error taxonomy shared by the world, systems and the scene driver.
//!
//! [`PathError`] and [`SpawnError`] are fatal: they must surface while the
//! scene is being set up, never in the middle of a wave. The remaining errors
//! reject a single player request and leave every piece of state untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons the tile layer could not be turned into a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum PathError {
    /// The tile layer contains no path tiles at all.
    #[error("tile layer contains no path tiles")]
    Empty,
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// Another tower already occupies the requested cell.
    #[error("cell is already occupied by a tower")]
    CellOccupied,
    /// The balance cannot cover the build cost.
    #[error("insufficient funds for the build cost")]
    InsufficientFunds,
    /// The requested cell lies outside the map.
    #[error("cell lies outside the map")]
    OutOfBounds,
    /// The route runs through the requested cell.
    #[error("cell is part of the enemy route")]
    PathTile,
    /// The tower catalog holds no entry for the requested kind.
    #[error("tower kind is missing from the catalog")]
    UnavailableKind,
}

/// Reasons a tower upgrade request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// The tower already reached the last tier of its upgrade curve.
    #[error("tower is already at its maximum level")]
    MaxLevel,
    /// The balance cannot cover the upgrade cost.
    #[error("insufficient funds for the upgrade cost")]
    InsufficientFunds,
    /// No tower with the provided identifier exists.
    #[error("no tower with the provided identifier exists")]
    UnknownTower,
}

/// Reasons a tower sale request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SellError {
    /// No tower with the provided identifier exists, or it was already sold.
    #[error("no tower with the provided identifier exists")]
    UnknownTower,
}

/// Reasons an enemy could not be spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum SpawnError {
    /// The route is empty, so a spawned enemy would have no destination.
    #[error("no route available for spawned enemies")]
    NoRoute,
    /// The enemy catalog holds no entry for the requested kind.
    #[error("enemy kind is missing from the catalog")]
    UnknownKind,
}

/// Reasons the player's weapon refused to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum WeaponError {
    /// The weapon is still cooling down from the previous shot.
    #[error("weapon is cooling down")]
    CoolingDown,
    /// The aim point coincides with the muzzle, so no direction exists.
    #[error("aim point coincides with the weapon origin")]
    ZeroAim,
}
