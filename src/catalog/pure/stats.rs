// Play statistics (pure)

use std::time::Duration;

use crate::catalog::types::GameRecord;

/// Add one session to a record: whole minutes played, plus a crash if any.
pub fn record_play(game: &mut GameRecord, played: Duration, crashed: bool) {
    game.time_played = game.time_played.saturating_add(played.as_secs() / 60);
    if crashed {
        game.times_crashed = game.times_crashed.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_minutes_are_dropped() {
        let mut game = GameRecord::new("Foo", "/a.exe", "/p1");
        record_play(&mut game, Duration::from_secs(59), false);
        assert_eq!(game.time_played, 0);

        record_play(&mut game, Duration::from_secs(3 * 60 + 30), true);
        assert_eq!(game.time_played, 3);
        assert_eq!(game.times_crashed, 1);
        assert_eq!(game.times_opened, 0);
    }
}
