use crate::resources::*;

/// Ambient weather effects for the tick
pub fn roll_weather(weather: &Weather, rng: &mut GameRng, events: &mut Events) {
    // Calm themes never touch the RNG
    if weather.lightning_chance <= 0.0 {
        return;
    }
    if rng.chance(weather.lightning_chance) {
        events.push(Cue::Thunder);
        events.shake(15.0);
    }
}
