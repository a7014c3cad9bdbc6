//! Plain-text rendering of a [`Report`] for the terminal.

use std::fmt::Write as _;

use petz_core::events::{AnimationCue, Emote, PetEvent};
use petz_core::session::Report;
use petz_core::view::{Mood, PetView};

const BAR_WIDTH: usize = 20;

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn cue_text(cue: AnimationCue) -> &'static str {
    match cue {
        AnimationCue::Snack => "*munch munch*",
        AnimationCue::Cuddle => "*purr*",
        AnimationCue::Play => "*boing*",
        AnimationCue::Run => "*zoom zoom*",
        AnimationCue::Sleep => "*zzz*",
    }
}

fn emote_text(emote: Emote) -> &'static str {
    match emote {
        Emote::Heart => "<3 <3 <3",
        Emote::Stars => "* * *",
        Emote::Fish => "><>",
    }
}

/// One line per event worth showing. Housekeeping events render as nothing.
#[must_use]
pub fn event_line(event: &PetEvent) -> Option<String> {
    match event {
        PetEvent::Animate { cue } => Some(cue_text(*cue).to_string()),
        PetEvent::Emote { emote } => Some(emote_text(*emote).to_string()),
        PetEvent::LevelUp { level } => Some(format!("** Level {level}! **")),
        PetEvent::BondMaxed => Some("** Legendary bond **".to_string()),
        PetEvent::Died { .. } => Some("x_x".to_string()),
        PetEvent::Revived { .. } | PetEvent::Adopted | PetEvent::StopSideEffects => None,
    }
}

fn header(view: &PetView) -> String {
    let crown = if view.crowned { "  (crowned)" } else { "" };
    let face = match view.mood {
        Mood::Content => "(^_^)",
        Mood::Upset => "(>_<)",
        Mood::Gone => "(x_x)",
    };
    format!("{face}  {}  ·  Level {}{crown}", view.name, view.level)
}

/// Render the whole card: header, bars or death card, status and events.
#[must_use]
pub fn render(report: &Report) -> String {
    let view = &report.view;
    let mut out = String::new();
    let _ = writeln!(out, "{}", header(view));

    if let Some(card) = &view.death_card {
        let _ = writeln!(out, "  {}", card.snark);
        if let Some(hint) = &card.revive_hint {
            let _ = writeln!(out, "  {hint}");
        }
        if let Some(label) = &view.revive_label {
            let _ = writeln!(out, "  -> `petz revive` ({label})");
        }
    } else {
        for (label, percent) in [
            ("hunger", view.bars.hunger),
            ("sleepiness", view.bars.sleepiness),
            ("enrichment", view.bars.enrichment),
            ("bonding", view.bars.bonding),
        ] {
            let _ = writeln!(out, "  {label:<11}{} {percent:>3}%", bar(percent));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", report.status);

    let lines: Vec<String> = report.events.iter().filter_map(event_line).collect();
    if !lines.is_empty() {
        let _ = writeln!(out, "{}", lines.join("  "));
    }
    if !report.durable {
        let _ = writeln!(out, "(progress is not being saved)");
    }
    out
}
