use crate::params::Params;

/// Lane bounds and vertical offset governing `[x, next.x)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSegment {
    pub x: f64,
    pub min_lane: u8,
    pub max_lane: u8,
    pub y_offset: f64,
}

impl TrackSegment {
    pub fn new(x: f64, min_lane: u8, max_lane: u8, y_offset: f64) -> Self {
        Self {
            x,
            min_lane,
            max_lane,
            y_offset,
        }
    }

    /// All four lanes open, no offset
    pub fn full_width() -> Self {
        Self::new(0.0, 0, Params::LANE_COUNT - 1, 0.0)
    }

    pub fn allows(&self, lane: i32) -> bool {
        lane >= self.min_lane as i32 && lane <= self.max_lane as i32
    }

    pub fn clamp_lane(&self, lane: u8) -> u8 {
        lane.clamp(self.min_lane, self.max_lane)
    }

    pub fn lane_span(&self) -> u8 {
        self.max_lane - self.min_lane + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Bump,
    Ramp,
    Mud,
    BigRamp,
    OilSlick,
    Hurdle,
    Water,
    Gravel,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 8] = [
        ObstacleKind::Bump,
        ObstacleKind::Ramp,
        ObstacleKind::Mud,
        ObstacleKind::BigRamp,
        ObstacleKind::OilSlick,
        ObstacleKind::Hurdle,
        ObstacleKind::Water,
        ObstacleKind::Gravel,
    ];

    /// Stable wire code
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Launch multiplier applied to the base jump force, if this obstacle launches riders
    pub fn launch_scale(self) -> Option<f64> {
        match self {
            ObstacleKind::Bump => Some(0.75),
            ObstacleKind::Ramp => Some(1.0),
            ObstacleKind::BigRamp => Some(1.6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub x: f64,
    pub lane: u8,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn new(x: f64, lane: u8, kind: ObstacleKind) -> Self {
        Self { x, lane, kind }
    }
}

/// Segments and obstacles of one stage, both ordered by ascending x
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub segments: Vec<TrackSegment>,
    pub obstacles: Vec<Obstacle>,
}

impl Track {
    pub fn new(segments: Vec<TrackSegment>, obstacles: Vec<Obstacle>) -> Self {
        Self {
            segments,
            obstacles,
        }
    }

    /// Segment with the greatest start `<= x`.
    ///
    /// An empty track resolves to the full-width default. Positions before
    /// the first segment resolve to the first segment.
    pub fn layout_at(&self, x: f64) -> TrackSegment {
        let Some(first) = self.segments.first() else {
            return TrackSegment::full_width();
        };
        let idx = self.segments.partition_point(|s| s.x <= x);
        if idx == 0 {
            *first
        } else {
            self.segments[idx - 1]
        }
    }

    /// Obstacles whose x lies strictly within `reach` of `x`
    pub fn obstacles_near(&self, x: f64, reach: f64) -> &[Obstacle] {
        let start = self.obstacles.partition_point(|o| o.x <= x - reach);
        let end = self.obstacles.partition_point(|o| o.x < x + reach);
        &self.obstacles[start..end.max(start)]
    }
}
