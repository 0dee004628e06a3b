//! Level layouts: static platforms and the kids haunting them
//!
//! Levels are horizontal pages of `LEVEL_WIDTH` world units laid out in a
//! fixed order. Y grows downward; the first platform of every level is its
//! ground.

use glam::Vec2;

use crate::consts::LEVEL_WIDTH;
use crate::rgb;

/// Horizontal facing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// True if `dx` (target minus self) points the way we face
    #[inline]
    pub fn faces(self, dx: f32) -> bool {
        match self {
            Facing::Left => dx < 0.0,
            Facing::Right => dx > 0.0,
        }
    }
}

/// Axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strictly inside the horizontal span (edges don't count)
    #[inline]
    pub fn spans_x(&self, x: f32) -> bool {
        x > self.x && x < self.x + self.w
    }
}

/// A kid NPC. `pos` is the point the kid stands on (feet).
#[derive(Debug, Clone, PartialEq)]
pub struct Kid {
    pub pos: Vec2,
    pub facing: Facing,
    /// Spotted the ghost; can no longer be scared
    pub seen: bool,
    /// Successfully scared
    pub scared: bool,
    /// Tumbling off their perch after a scare
    pub falling: bool,
    pub vy: f32,
}

impl Kid {
    pub fn new(x: f32, y: f32, facing: Facing) -> Self {
        Self {
            pos: Vec2::new(x, y),
            facing,
            seen: false,
            scared: false,
            falling: false,
            vy: 0.0,
        }
    }

    /// A kid whose outcome is decided, one way or the other
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.scared || self.seen
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub name: &'static str,
    pub background: [f32; 3],
    pub platforms: Vec<Rect>,
    pub kids: Vec<Kid>,
}

impl Level {
    /// The level's floor
    pub fn ground(&self) -> Rect {
        self.platforms
            .first()
            .copied()
            .unwrap_or(Rect::new(0.0, 450.0, LEVEL_WIDTH, 40.0))
    }
}

/// Build the mansion: Foyer, Library, Ballroom
pub fn build_levels() -> Vec<Level> {
    use Facing::{Left, Right};

    vec![
        Level {
            name: "Foyer",
            background: rgb(0x0b0f14),
            platforms: vec![
                Rect::new(0.0, 450.0, LEVEL_WIDTH, 40.0),
                Rect::new(200.0, 360.0, 160.0, 18.0),
                Rect::new(420.0, 300.0, 120.0, 18.0),
                Rect::new(620.0, 340.0, 140.0, 18.0),
                Rect::new(900.0, 320.0, 160.0, 18.0),
                Rect::new(1200.0, 360.0, 140.0, 18.0),
            ],
            kids: vec![Kid::new(260.0, 330.0, Right), Kid::new(950.0, 290.0, Left)],
        },
        Level {
            name: "Library",
            background: rgb(0x0b0f12),
            platforms: vec![
                Rect::new(0.0, 450.0, LEVEL_WIDTH, 40.0),
                Rect::new(100.0, 360.0, 180.0, 18.0),
                Rect::new(360.0, 300.0, 160.0, 18.0),
                Rect::new(560.0, 240.0, 120.0, 18.0),
                Rect::new(800.0, 320.0, 220.0, 18.0),
                Rect::new(1200.0, 300.0, 200.0, 18.0),
            ],
            kids: vec![
                Kid::new(140.0, 330.0, Right),
                Kid::new(570.0, 210.0, Left),
                Kid::new(1230.0, 270.0, Left),
            ],
        },
        Level {
            name: "Ballroom",
            background: rgb(0x07121a),
            platforms: vec![
                Rect::new(0.0, 460.0, LEVEL_WIDTH, 40.0),
                Rect::new(180.0, 380.0, 160.0, 18.0),
                Rect::new(420.0, 340.0, 160.0, 18.0),
                Rect::new(680.0, 300.0, 160.0, 18.0),
                Rect::new(980.0, 350.0, 160.0, 18.0),
                Rect::new(1300.0, 300.0, 240.0, 18.0),
            ],
            kids: vec![Kid::new(360.0, 310.0, Right), Kid::new(720.0, 270.0, Left)],
        },
    ]
}
