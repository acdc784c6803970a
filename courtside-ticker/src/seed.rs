//! Built-in scripts for courts `C1` and `C2`.
//!
//! `C1` closes out a match, shows the summary, runs the full announcement
//! sequence for the next match and then plays it live. `C2` plays a single
//! match through changeovers and a set break.

use courtside_events::{scenes, H2HRecord, PlayerCard};

use crate::script::{AnnounceSlot, CourtScript, ScriptStep, StepDelay};

const SUMMARY_HOLD: StepDelay = StepDelay::Fixed { ms: 8000 };
const FINISHED_HOLD: StepDelay = StepDelay::Fixed { ms: 5000 };

pub fn seed_scripts() -> Vec<CourtScript> {
    vec![court_one(), court_two()]
}

pub fn court_one() -> CourtScript {
    const COURT: &str = "C1";
    let djokovic = "N. Djokovic";
    let alcaraz = "C. Alcaraz";
    let federer = "R. Federer";
    let nadal = "R. Nadal";

    let m1 = |score: &str| ScriptStep::score("M1", djokovic, alcaraz, score);
    let m3 = |score: &str| ScriptStep::score("M3", federer, nadal, score);

    let mut steps = vec![
        m1("6-4 2-2 30-15"),
        m1("6-4 2-2 40-15"),
        m1("6-4 3-2 0-0").ending_game(5, false),
        m1("6-4 3-2 15-0"),
        m1("6-4 3-3 0-0").ending_game(6, false),
        m1("6-4 3-3 30-30"),
        m1("6-4 4-3 0-0").ending_game(7, false),
        m1("6-4 4-3 15-30"),
        m1("6-4 5-3 0-0").ending_game(8, false),
        m1("6-4 5-3 40-15"),
        m1("6-4 6-3 FINAL").after(StepDelay::None),
        ScriptStep::complete_match(format!("{djokovic} vs {alcaraz}"), &["6-4", "6-3"]),
        ScriptStep::scene(scenes::FINISHED).after(FINISHED_HOLD),
        ScriptStep::scene(scenes::SUMMARY),
        ScriptStep::summary().after(SUMMARY_HOLD),
        ScriptStep::scene(scenes::ANNOUNCE_FED),
        ScriptStep::announce_player(
            "FED",
            PlayerCard {
                name: federer.to_string(),
                country: "SUI".to_string(),
                rank: 3,
                age: 38,
                titles: 103,
            },
        )
        .after(StepDelay::Announce(AnnounceSlot::Fed)),
        ScriptStep::scene(scenes::ANNOUNCE_NAD),
        ScriptStep::announce_player(
            "NAD",
            PlayerCard {
                name: nadal.to_string(),
                country: "ESP".to_string(),
                rank: 2,
                age: 33,
                titles: 92,
            },
        )
        .after(StepDelay::Announce(AnnounceSlot::Nad)),
        ScriptStep::scene(scenes::ANNOUNCE_H2H),
        ScriptStep::announce_h2h(
            "H2H",
            H2HRecord {
                player_a: federer.to_string(),
                player_b: nadal.to_string(),
                wins_a: 16,
                wins_b: 24,
                last_meeting: "2019 Wimbledon SF".to_string(),
            },
        )
        .after(StepDelay::Announce(AnnounceSlot::H2h)),
        ScriptStep::scene(scenes::ANNOUNCE_SIM),
        ScriptStep::announce("SIM"),
    ];

    steps.extend(
        ["0-0 0-0 15-0", "0-0 0-0 30-0", "0-0 0-0 40-15", "0-0 1-0 0-0"]
            .into_iter()
            .map(|score| m3(score).simulated()),
    );

    steps.extend([
        ScriptStep::scene(scenes::ADS).after(StepDelay::Announce(AnnounceSlot::Ads)),
        m3("0-0 0-0"),
        m3("0-0 15-0"),
        m3("0-0 30-15"),
        m3("1-0 0-0").ending_game(1, false),
        m3("1-0 0-15"),
        m3("1-1 0-0").ending_game(2, false),
        m3("1-1 40-40"),
        m3("2-1 0-0").ending_game(3, false),
    ]);

    CourtScript::new(COURT, steps)
        .with_finished("J. Sinner vs D. Medvedev", &["6-3", "6-4"], 95)
        .with_finished("A. Rublev vs H. Rune", &["7-6", "3-6", "6-2"], 40)
        .with_upcoming(COURT, &format!("{federer} vs {nadal}"))
        .with_upcoming("C2", "A. Zverev vs C. Ruud")
}

pub fn court_two() -> CourtScript {
    const COURT: &str = "C2";
    let zverev = "A. Zverev";
    let ruud = "C. Ruud";

    let m2 = |score: &str| ScriptStep::score("M2", zverev, ruud, score);

    let steps = vec![
        m2("1-0 15-0"),
        m2("1-0 40-15"),
        m2("2-0 0-0").ending_game(2, false),
        m2("2-0 30-30"),
        m2("2-1 0-0").ending_game(3, false),
        m2("3-1 0-0").ending_game(4, false),
        m2("4-1 0-0").ending_game(5, false),
        m2("4-2 0-0").ending_game(6, false),
        m2("5-2 0-0").ending_game(7, false),
        m2("5-3 0-0").ending_game(8, false),
        m2("5-3 40-30"),
        m2("6-3 0-0").ending_game(9, true),
        m2("6-3 1-0 0-0").ending_game(1, false),
        m2("6-3 1-1 0-0").ending_game(2, false),
        m2("6-3 2-1 0-0").ending_game(3, false),
        m2("6-3 2-1 15-40"),
        m2("6-3 2-2 0-0").ending_game(4, false),
        m2("6-3 3-2 0-0").ending_game(5, false),
        m2("6-3 4-2 0-0").ending_game(6, false),
        m2("6-3 5-2 0-0").ending_game(7, false),
        m2("6-3 5-2 40-0"),
        m2("6-3 6-2 FINAL").after(StepDelay::None),
        ScriptStep::complete_match(format!("{zverev} vs {ruud}"), &["6-3", "6-2"]),
        ScriptStep::scene(scenes::FINISHED).after(FINISHED_HOLD),
        ScriptStep::scene(scenes::SUMMARY),
        ScriptStep::summary().after(SUMMARY_HOLD),
        ScriptStep::scene(scenes::UPCOMING),
    ];

    CourtScript::new(COURT, steps)
        .with_finished("T. Fritz vs F. Tiafoe", &["6-4", "7-5"], 120)
        .with_upcoming(COURT, &format!("{zverev} vs {ruud}"))
        .with_upcoming(COURT, "S. Tsitsipas vs G. Dimitrov")
}
