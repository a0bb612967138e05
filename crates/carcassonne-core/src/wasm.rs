//! WebAssembly bindings for the board engine.
//!
//! This module exposes a board plus its deck to JavaScript through
//! wasm-bindgen. Everything crosses the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::board::Board;
use crate::config::BoardConfig;
use crate::geography::FeatureKind;
use crate::grid::GridPos;
use crate::tile::{Rotation, Tile, TileDeck};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed board with its draw pile
#[wasm_bindgen]
pub struct WasmBoard {
    board: Board,
    deck: TileDeck,
    current: Option<Tile>,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create a board with a standard deck shuffled from `seed`, start tile placed
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, config_json: Option<String>) -> Result<WasmBoard, JsValue> {
        let config = match config_json {
            Some(json) => BoardConfig::from_json(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
            None => BoardConfig::default(),
        };

        let mut deck = TileDeck::standard();
        deck.shuffle(&mut StdRng::seed_from_u64(seed));

        let mut board = Board::new(config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
        board
            .place_start_tile(deck.start_tile())
            .map_err(|e| JsValue::from_str(&format!("Start tile failed: {}", e)))?;

        Ok(WasmBoard {
            board,
            deck,
            current: None,
        })
    }

    /// Draw the next tile; returns its JSON, or "null" when the pile is empty
    #[wasm_bindgen(js_name = drawTile)]
    pub fn draw_tile(&mut self) -> String {
        self.current = self.deck.draw();
        match &self.current {
            Some(tile) => serde_json::to_string(tile).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }

    /// Tiles left in the pile
    #[wasm_bindgen(js_name = remainingTiles)]
    pub fn remaining_tiles(&self) -> usize {
        self.deck.len()
    }

    /// Legal placements for the drawn tile as `[[{x, z}, rotation], ...]`
    #[wasm_bindgen(js_name = getValidPlacements)]
    pub fn get_valid_placements(&self) -> String {
        let placements = match &self.current {
            Some(tile) => self.board.valid_placements(tile),
            None => Vec::new(),
        };
        serde_json::to_string(&placements).unwrap_or_else(|_| "[]".to_string())
    }

    /// Place the drawn tile; `rotation` counts clockwise quarter turns.
    /// Returns the events JSON or an error.
    #[wasm_bindgen(js_name = placeTile)]
    pub fn place_tile(&mut self, x: i32, z: i32, rotation: usize) -> Result<String, JsValue> {
        let tile = self
            .current
            .ok_or_else(|| JsValue::from_str("No tile drawn"))?
            .rotated(Rotation::from_quarter_turns(rotation));

        match self.board.try_place(tile, GridPos::new(x, z)) {
            Ok(events) => {
                self.current = None;
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&format!("Placement failed: {}", e))),
        }
    }

    /// Get board state as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        let board_json = self.board.to_json_friendly();
        serde_json::to_string(&board_json).unwrap_or_else(|_| "{}".to_string())
    }

    /// Feature sets of one kind ("City" or "Road") as JSON.
    /// Any other kind is an error.
    #[wasm_bindgen(js_name = getFeatureSets)]
    pub fn get_feature_sets(&self, kind: &str) -> Result<String, JsValue> {
        let kind: FeatureKind = kind.parse().map_err(|e| JsValue::from_str(&format!("{}", e)))?;
        serde_json::to_string(&self.board.feature_sets(kind))
            .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
    }

    /// Cloister tally for a cell
    #[wasm_bindgen(js_name = getSurroundCount)]
    pub fn get_surround_count(&self, x: i32, z: i32, end_turn: bool) -> u32 {
        self.board.surround_count(GridPos::new(x, z), end_turn)
    }
}
