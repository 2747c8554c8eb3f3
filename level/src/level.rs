//! The level aggregate: tile grid, entities, props, and metadata.

use std::collections::BTreeMap;

use variant::{StructMap, Variant};

use crate::edges;
use crate::entity::Entity;
use crate::error::{LevelError, LevelResult};
use crate::prop::Prop;
use crate::tile::Tile;

/// Ids below this are reserved by the engine for special entities.
const MIN_ALLOCATED_ID: u32 = 100;

/// A level: a sparse tile grid keyed by `(layer, x, y)`, entities and props
/// keyed by id, a free-form metadata map, and an optional thumbnail.
///
/// Levels other than backdrops own a backdrop sub-level scaled up 16x from
/// the parent coordinate system; backdrops hold only tiles and props.
///
/// Equality compares content only; the id allocator position is excluded.
#[derive(Debug, Clone)]
pub struct Level {
    /// Tiles keyed by (layer, x, y) in tile units.
    pub tiles: BTreeMap<(u8, i32, i32), Tile>,
    /// Entities keyed by id.
    pub entities: BTreeMap<u32, Entity>,
    /// Props keyed by id.
    pub props: BTreeMap<u32, Prop>,
    /// Raw metadata variables. Prefer the typed accessors where one exists.
    pub variables: StructMap,
    /// Thumbnail PNG bytes, empty when absent.
    pub sshot: Vec<u8>,
    /// The backdrop sub-level, `None` if this level is itself a backdrop.
    pub backdrop: Option<Box<Level>>,
    next_id: u32,
}

impl PartialEq for Level {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
            && self.entities == other.entities
            && self.props == other.props
            && self.variables == other.variables
            && self.sshot == other.sshot
            && self.backdrop == other.backdrop
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

impl Level {
    /// Creates an empty level with an empty backdrop.
    #[must_use]
    pub fn new() -> Self {
        Self {
            backdrop: Some(Box::new(Self::new_backdrop())),
            ..Self::new_backdrop()
        }
    }

    /// Creates an empty backdrop level (no nested backdrop).
    #[must_use]
    pub fn new_backdrop() -> Self {
        Self {
            tiles: BTreeMap::new(),
            entities: BTreeMap::new(),
            props: BTreeMap::new(),
            variables: StructMap::new(),
            sshot: Vec::new(),
            backdrop: None,
            next_id: MIN_ALLOCATED_ID,
        }
    }

    /// Allocates a fresh entity/prop id.
    pub fn gen_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Records an externally chosen id so the allocator never reuses it.
    pub fn note_id(&mut self, id: u32) {
        self.next_id = self.next_id.max(id.saturating_add(1));
    }

    /// Seeds the id allocator, used when decoding header metadata.
    pub fn set_next_id(&mut self, next_id: u32) {
        self.next_id = next_id.max(MIN_ALLOCATED_ID);
    }

    /// Adds an entity, allocating an id when `id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::DuplicateId`] if the requested id is taken.
    pub fn add_entity(&mut self, entity: Entity, id: Option<u32>) -> LevelResult<u32> {
        let id = match id {
            Some(id) => {
                self.note_id(id);
                id
            }
            None => self.gen_id(),
        };
        if self.entities.contains_key(&id) || self.props.contains_key(&id) {
            return Err(LevelError::DuplicateId { id });
        }
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Adds a prop, allocating an id when `id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::DuplicateId`] if the requested id is taken.
    pub fn add_prop(&mut self, prop: Prop, id: Option<u32>) -> LevelResult<u32> {
        let id = match id {
            Some(id) => {
                self.note_id(id);
                id
            }
            None => self.gen_id(),
        };
        if self.props.contains_key(&id) || self.entities.contains_key(&id) {
            return Err(LevelError::DuplicateId { id });
        }
        self.props.insert(id, prop);
        Ok(id)
    }

    /// Places a tile, replacing and returning any tile already at that
    /// coordinate.
    pub fn set_tile(&mut self, layer: u8, x: i32, y: i32, tile: Tile) -> Option<Tile> {
        self.tiles.insert((layer, x, y), tile)
    }

    /// The tile at a coordinate, if any.
    #[must_use]
    pub fn tile(&self, layer: u8, x: i32, y: i32) -> Option<&Tile> {
        self.tiles.get(&(layer, x, y))
    }

    /// The level's display name.
    #[must_use]
    pub fn name(&self) -> &[u8] {
        match self.variables.get("level_name") {
            Some(Variant::String(name)) => name,
            _ => b"",
        }
    }

    /// Sets the level's display name.
    pub fn set_name(&mut self, name: impl Into<Vec<u8>>) {
        self.variables
            .insert("level_name", Variant::String(name.into()));
    }

    /// The level type discriminant from the metadata map, 0 when unset.
    #[must_use]
    pub fn level_type(&self) -> i32 {
        match self.variables.get("level_type") {
            Some(Variant::Int(value)) => *value,
            _ => 0,
        }
    }

    /// Sets the level type discriminant.
    pub fn set_level_type(&mut self, level_type: i32) {
        self.variables
            .insert("level_type", Variant::Int(level_type));
    }

    /// Whether the level uses the virtual character.
    #[must_use]
    pub fn virtual_character(&self) -> bool {
        matches!(
            self.variables.get("vector_character"),
            Some(Variant::Bool(true))
        )
    }

    /// Sets the virtual character flag.
    pub fn set_virtual_character(&mut self, on: bool) {
        self.variables
            .insert("vector_character", Variant::Bool(on));
    }

    /// Player start position in pixels, from the `p{n}_x`/`p{n}_y`
    /// metadata variables.
    #[must_use]
    pub fn start_position(&self, player: u8) -> (i32, i32) {
        let read = |key: &str| match self.variables.get(key) {
            Some(Variant::Int(value)) => *value,
            _ => 0,
        };
        (
            read(&format!("p{player}_x")),
            read(&format!("p{player}_y")),
        )
    }

    /// Sets a player's start position in pixels.
    pub fn set_start_position(&mut self, player: u8, x: i32, y: i32) {
        self.variables.insert(format!("p{player}_x"), Variant::Int(x));
        self.variables.insert(format!("p{player}_y"), Variant::Int(y));
    }

    /// The maximum entity/prop id in use, at least 99. When `reset` is set
    /// the id allocator restarts just past the result.
    pub fn calculate_max_id(&mut self, reset: bool) -> u32 {
        let init = if reset {
            MIN_ALLOCATED_ID
        } else {
            self.next_id - 1
        };
        let mut max_id = init;
        if let Some(id) = self.props.keys().next_back() {
            max_id = max_id.max(*id);
        }
        if let Some(id) = self.entities.keys().next_back() {
            max_id = max_id.max(*id);
        }
        if let Some(backdrop) = self.backdrop.as_deref_mut() {
            max_id = max_id.max(backdrop.calculate_max_id(true));
        }
        self.next_id = max_id + 1;
        max_id
    }

    /// Moves the whole level by a pixel offset. Tile coordinates shift by
    /// the offset rounded to whole tiles (48 pixels per tile).
    #[allow(clippy::cast_possible_truncation)]
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let tile_dx = (dx / 48.0).round() as i32;
        let tile_dy = (dy / 48.0).round() as i32;

        self.tiles = std::mem::take(&mut self.tiles)
            .into_iter()
            .map(|((layer, x, y), tile)| ((layer, x + tile_dx, y + tile_dy), tile))
            .collect();

        for entity in self.entities.values_mut() {
            entity.x += dx;
            entity.y += dy;
        }
        for prop in self.props.values_mut() {
            prop.x += dx;
            prop.y += dy;
        }

        for player in 1..=4 {
            let (x, y) = self.start_position(player);
            if (x, y) != (0, 0) || self.variables.contains_key(&format!("p{player}_x")) {
                self.set_start_position(player, x + dx.round() as i32, y + dy.round() as i32);
            }
        }

        if let Some(backdrop) = self.backdrop.as_deref_mut() {
            backdrop.translate(dx / 16.0, dy / 16.0);
        }
    }

    /// Recomputes derived per-edge solidity, visibility, and cap flags for
    /// every tile from the current grid. Run after a batch of tile edits;
    /// existing flags are treated as stale cache, never consulted.
    pub fn compute_edges(&mut self) {
        edges::compute_edges(&mut self.tiles);
        if let Some(backdrop) = self.backdrop.as_deref_mut() {
            backdrop.compute_edges();
        }
    }
}
