//! Rules advisor integration tests
//!
//! Drives `RulesAdvisor` with the events a hosting application would send
//! after committing state, and checks what ends up in the log.

use std::time::{SystemTime, UNIX_EPOCH};

use heist_tactics::advisor::{
    should_show, AdvisorConfig, AdvisorEvent, RuleCategory, RulesAdvisor, Severity,
};
use heist_tactics::ai::{execute_activation_with, AIActivation, ActionTarget, DiceEvent, DiceRoll, RecordingEmitters};
use heist_tactics::core::config::EngineConfig;
use heist_tactics::core::types::CharacterId;
use heist_tactics::data::actions::{ActionKind, AttackMode};
use heist_tactics::data::roles::Role;
use heist_tactics::data::tables::DomainTables;
use heist_tactics::game::{award_vp, CharacterState, CharacterToken, MapState, Stats, TurnState, VpType};
use heist_tactics::spatial::{GridType, Position, WallMap};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn advisor() -> RulesAdvisor {
    RulesAdvisor::with_rules(GridType::Square, EngineConfig::default(), DomainTables::builtin())
}

fn runner(id: u32, player: u8, pos: Position) -> CharacterToken {
    CharacterToken::new(
        CharacterId(id),
        format!("Runner {id}"),
        player,
        Role::Ninja,
        pos,
        Stats {
            movement: 5,
            wounds: 3,
            max_wounds: 3,
            ..Stats::default()
        },
    )
}

fn open_floor(characters: Vec<CharacterToken>) -> MapState {
    let mut map = MapState::new(WallMap::new(20, 20));
    map.characters = characters;
    map
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[test]
fn test_movement_within_and_beyond_allowance() {
    let mover = runner(1, 1, Position::new(0, 0));
    let map = open_floor(vec![mover.clone()]);
    let mut advisor = advisor();

    let short = advisor.on_event(
        &AdvisorEvent::PositionPatched {
            before: mover.clone(),
            to: Position::new(3, 0),
            via: Some(ActionKind::Move),
        },
        &map,
    );
    assert!(short.is_empty(), "{short:?}");

    let long = advisor.on_event(
        &AdvisorEvent::PositionPatched {
            before: mover,
            to: Position::new(7, 0),
            via: Some(ActionKind::Move),
        },
        &map,
    );
    assert_eq!(long.len(), 1);
    assert_eq!(long[0].category, RuleCategory::Movement);
    assert_eq!(long[0].severity, Severity::Warning);
    assert!(long[0].message.contains('7') && long[0].message.contains('5'));
    assert_eq!(advisor.log().len(), 1);
}

#[test]
fn test_alert_shown_too_low() {
    let crew: Vec<_> = (1..=6)
        .map(|i| {
            let mut c = runner(i, if i <= 3 { 1 } else { 2 }, Position::new(i as i32, 0));
            c.state = CharacterState::Overt;
            c
        })
        .collect();
    let map = open_floor(crew);
    let turn = TurnState::new(&map);

    let entries = advisor().on_event(
        &AdvisorEvent::TurnPassed {
            ended: turn,
            next: None,
            alert_shown: Some(1),
            alert_modifier: 0,
        },
        &map,
    );

    let alert: Vec<_> = entries.iter().filter(|e| e.category == RuleCategory::Alert).collect();
    assert_eq!(alert.len(), 1);
    assert_eq!(alert[0].severity, Severity::Warning);
    assert!(alert[0].message.contains("6 compromised"), "{}", alert[0].message);
    assert!(alert[0].message.contains("should be 3"), "{}", alert[0].message);
}

#[test]
fn test_mute_then_unmute_round_trip() {
    let mover = runner(1, 1, Position::new(0, 0));
    let map = open_floor(vec![mover.clone()]);
    let mut advisor = advisor();
    advisor.set_config(AdvisorConfig::default().mute_category(RuleCategory::Movement));

    advisor.on_event(
        &AdvisorEvent::PositionPatched {
            before: mover,
            to: Position::new(9, 0),
            via: None,
        },
        &map,
    );

    assert_eq!(advisor.log().len(), 1, "muted entries are still recorded");
    assert!(advisor.visible_entries().is_empty());

    let unmuted = advisor.config().unmute_category(RuleCategory::Movement);
    advisor.set_config(unmuted);
    assert_eq!(advisor.visible_entries().len(), 1);
}

#[test]
fn test_severity_floor_hides_info() {
    let mover = runner(1, 1, Position::new(0, 0));
    let map = open_floor(vec![mover.clone()]);
    let mut advisor = advisor();
    let mut ended = TurnState::new(&map);
    ended.turn_number = 2;

    let entries = advisor.on_event(
        &AdvisorEvent::TurnPassed {
            ended,
            next: None,
            alert_shown: None,
            alert_modifier: 0,
        },
        &map,
    );
    assert!(entries.iter().all(|e| e.severity == Severity::Info));
    assert!(!entries.is_empty());

    let config = AdvisorConfig::default().with_min_severity(Severity::Warning);
    assert!(entries.iter().all(|e| !should_show(e, &config)));
}

#[test]
fn test_entries_have_unique_ids_and_current_timestamps() {
    let mover = runner(1, 1, Position::new(0, 0));
    let map = open_floor(vec![mover.clone()]);
    let mut advisor = advisor();

    let before = now_ms();
    for x in 6..12 {
        advisor.on_event(
            &AdvisorEvent::PositionPatched {
                before: mover.clone(),
                to: Position::new(x, 0),
                via: None,
            },
            &map,
        );
    }
    let after = now_ms();

    let ids: std::collections::HashSet<_> = advisor.log().iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), advisor.log().len());
    for entry in advisor.log().iter() {
        assert!(entry.timestamp_ms >= before && entry.timestamp_ms <= after);
        assert_eq!(advisor.log().get(entry.id).map(|e| e.id), Some(entry.id));
    }
}

#[test]
fn test_hack_award_needs_a_roll_this_turn() {
    let brain = runner(1, 1, Position::new(0, 0));
    let map = open_floor(vec![brain]);
    let mut advisor = advisor();
    let award = award_vp(CharacterId(1), VpType::Hack, 1, "terminal cracked", None);

    let unbacked = advisor.on_event(&AdvisorEvent::VpPatched { award: award.clone() }, &map);
    assert_eq!(unbacked.len(), 1);
    assert!(unbacked[0].message.contains("no check was rolled"));

    let check = DiceEvent {
        character_id: CharacterId(1),
        action: ActionKind::Hack,
        target: None,
        roll: DiceRoll { dice: [5, 5], total: 10 },
        modifier: 0,
        skill: 0,
        bonus: 0,
        situational: 0,
        previous_attacks: 0,
        target_number: 8,
        success: true,
        weapon: None,
        damage: None,
        actor_position: None,
        target_position: None,
        into_melee: None,
    };
    advisor.on_event(&AdvisorEvent::DiceRolled { check }, &map);
    let backed = advisor.on_event(&AdvisorEvent::VpPatched { award }, &map);
    assert!(backed.is_empty(), "{backed:?}");
}

#[test]
fn test_missing_character_yields_nothing() {
    let map = open_floor(vec![runner(1, 1, Position::new(0, 0))]);
    let ghost = runner(404, 1, Position::new(0, 0));
    let mut advisor = advisor();

    let events = [
        AdvisorEvent::StatePatched {
            before: ghost.clone(),
            after: ghost.clone(),
            trigger: None,
        },
        AdvisorEvent::VpPatched {
            award: award_vp(CharacterId(404), VpType::Hack, 1, "nobody", None),
        },
    ];
    for event in &events {
        assert!(advisor.on_event(event, &map).is_empty());
    }
    assert!(advisor.log().is_empty());
}

#[test]
fn test_disabled_advisor_stays_silent() {
    let mover = runner(1, 1, Position::new(0, 0));
    let map = open_floor(vec![mover.clone()]);
    let mut advisor = advisor();
    advisor.set_config(AdvisorConfig::default().with_enabled(false));

    let entries = advisor.on_event(
        &AdvisorEvent::PositionPatched {
            before: mover,
            to: Position::new(15, 0),
            via: None,
        },
        &map,
    );
    assert!(entries.is_empty());
    assert!(advisor.visible_entries().is_empty());
}

#[test]
fn test_shot_is_judged_by_the_board_it_was_fired_on() {
    let tables = DomainTables::builtin();
    let mut map = open_floor(vec![
        CharacterToken::from_role(CharacterId(1), "Spook", 1, Role::Spook, Position::new(0, 0), &tables),
        CharacterToken::from_role(CharacterId(2), "Rival", 2, Role::Face, Position::new(6, 0), &tables),
        CharacterToken::from_role(CharacterId(3), "Mate", 1, Role::Muscle, Position::new(0, 5), &tables),
    ]);
    let mut shot = AIActivation::new(CharacterId(1), "take the open shot");
    shot.push(
        ActionKind::Attack(AttackMode::Ranged),
        Some(Position::new(6, 0)),
        Some(ActionTarget::Character(CharacterId(2))),
        &tables,
    );

    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut emitters = RecordingEmitters::default();
    let results = execute_activation_with(&shot, &mut map, GridType::Square, 1, &tables, &mut emitters, &mut rng, None);
    let check = results[0].check.as_ref().expect("attack rolls dice");
    assert_eq!(check.situational, 0);
    assert_eq!(check.into_melee, Some(false));

    // Mate closes in on Rival after the shot was already resolved
    if let Some(mate) = map.characters.iter_mut().find(|c| c.id == CharacterId(3)) {
        mate.position = Position::new(7, 0);
    }

    let mut advisor = advisor();
    let entries = advisor.observe_results(&results, &map);
    assert!(
        entries.iter().all(|e| !e.message.contains("shooting-into-melee")),
        "{entries:?}"
    );
}
