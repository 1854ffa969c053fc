use serde::{Deserialize, Serialize};

use crate::core::engine::{Column, Side, WinLine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Piece colors handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub p1: Rgb,
    pub p2: Rgb,
}

impl Palette {
    pub fn color(&self, side: Side) -> Rgb {
        match side {
            Side::PlayerOne => self.p1,
            Side::PlayerTwo => self.p2,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            p1: Rgb(0xe7, 0x4c, 0x3c),
            p2: Rgb(0xf1, 0xc4, 0x0f),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub row: usize,
    pub col: Column,
    pub side: Side,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEndState {
    Win { side: Side, line: WinLine },
    Draw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    PlayerMove(Side),
    Finished(GameEndState),
}
