use crate::params::Params;
use crate::track::TrackSegment;

/// Race configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub lane_height: f64,
    pub track_top: f64,
    pub view_width: f64,
    pub camera_lead: f64,
    pub max_speed: f64,
    pub turbo_speed: f64,
    pub acceleration: f64,
    pub friction: f64,
    pub gravity: f64,
    pub jump_force: f64,
    pub max_heat: f64,
    pub heat_inc: f64,
    pub heat_cool: f64,
    pub overheat_penalty: u32,
    pub stage_length: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lane_height: Params::LANE_HEIGHT,
            track_top: Params::TRACK_TOP,
            view_width: Params::VIEW_WIDTH,
            camera_lead: Params::CAMERA_LEAD,
            max_speed: Params::MAX_SPEED,
            turbo_speed: Params::TURBO_SPEED,
            acceleration: Params::ACCELERATION,
            friction: Params::FRICTION,
            gravity: Params::GRAVITY,
            jump_force: Params::JUMP_FORCE,
            max_heat: Params::MAX_HEAT,
            heat_inc: Params::HEAT_INC,
            heat_cool: Params::HEAT_COOL,
            overheat_penalty: Params::OVERHEAT_PENALTY_TIME,
            stage_length: Params::STAGE_LENGTH,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Physical length of a stage in world units
    pub fn world_length(&self) -> f64 {
        self.stage_length as f64 * Params::WORLD_SCALE
    }

    /// Visual y of a lane's center line under the given layout
    pub fn lane_center_y(&self, layout: &TrackSegment, lane: u8) -> f64 {
        self.track_top + layout.y_offset + lane as f64 * self.lane_height + self.lane_height / 2.0
    }

    /// Nearest lane index for a visual y under the given layout
    pub fn lane_at_y(&self, layout: &TrackSegment, y: f64) -> u8 {
        let raw = (y - layout.y_offset - self.track_top - self.lane_height / 2.0) / self.lane_height;
        raw.round().clamp(0.0, (Params::LANE_COUNT - 1) as f64) as u8
    }

    /// Left edge of the camera window following a rider at `x`
    pub fn camera_x(&self, x: f64) -> f64 {
        x - self.camera_lead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_center_round_trips_through_lane_at_y() {
        let config = Config::new();
        let layout = TrackSegment::new(0.0, 0, 3, 10.0);
        for lane in 0..4 {
            let y = config.lane_center_y(&layout, lane);
            assert_eq!(config.lane_at_y(&layout, y), lane);
        }
        assert_eq!(config.lane_center_y(&TrackSegment::full_width(), 0), 70.0);
    }

    #[test]
    fn test_lane_at_y_clamps_outside_track() {
        let config = Config::new();
        let layout = TrackSegment::full_width();
        assert_eq!(config.lane_at_y(&layout, -500.0), 0);
        assert_eq!(config.lane_at_y(&layout, 500.0), 3);
    }

    #[test]
    fn test_world_length_scales_stage_length() {
        let config = Config::new();
        assert_eq!(config.world_length(), 50_000.0);
    }
}
