//! Page command: the whole effect stack on a demo page

use super::{load_config, FRAME};
use anyhow::{Context, Result};
use glint_animation::TimelineGroup;
use glint_effects::{demo, easter_egg::TRIGGERED_CLASS, glitch_helper, DemoPage, Director};
use glint_runtime::{PageEvent, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// Page time of the scripted load event
const LOAD_AT: f64 = 0.5;
/// Scripted logo clicks start once the splash has had time to leave
const CLICKS_FROM: f64 = 6.0;
const CLICK_GAP: f64 = 0.2;

pub struct PageArgs {
    pub frames: usize,
    pub clicks: u32,
    pub sections: usize,
    pub events: Option<PathBuf>,
    pub reduced_motion: bool,
    pub seed: u32,
    pub format: String,
    pub config: Option<PathBuf>,
}

/// One line of an event script
#[derive(Debug, Deserialize)]
struct ScriptedEvent {
    at: f64,
    #[serde(flatten)]
    event: PageEvent,
}

#[derive(Debug, Serialize)]
struct PageReport {
    frames: u64,
    seconds: f64,
    systems: Vec<String>,
    errors: usize,
    loading: bool,
    elements: usize,
    scroll_offset: f32,
    scroll_progress: f32,
    timelines: usize,
    ambient: usize,
    transient: usize,
    sequence: usize,
    ambient_paused: bool,
    haunted: bool,
    console: Vec<String>,
}

pub fn run(args: PageArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let (mut director, handles) = demo(
        Viewport::default(),
        config,
        args.reduced_motion,
        args.seed,
        args.sections,
    );

    let mut script = match &args.events {
        Some(path) => load_script(path)?,
        None => default_script(&director, &handles, args.frames, args.clicks),
    };

    director.initialize();
    for _ in 0..args.frames {
        let next = director.clock().total_time + FRAME;
        while script.front().is_some_and(|e| e.at <= next) {
            if let Some(scripted) = script.pop_front() {
                tracing::debug!(at = scripted.at, event = scripted.event.name(), "scripted event");
                director.push_event(scripted.event);
            }
        }
        director.step(FRAME);
    }

    let console = glitch_helper(&mut director.stage_mut().rng);
    let report = report(&director, console);
    director.shutdown();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report);
    }
    Ok(())
}

fn load_script(path: &Path) -> Result<VecDeque<ScriptedEvent>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read event script: {}", path.display()))?;
    let mut events: Vec<ScriptedEvent> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse event script: {}", path.display()))?;
    if let Some(bad) = events.iter().find(|e| !e.at.is_finite() || e.at < 0.0) {
        anyhow::bail!("event '{}' has an invalid time {}", bad.event.name(), bad.at);
    }
    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    Ok(events.into())
}

/// Load, a scroll sweep down and back, a pointer orbit and the logo clicks
fn default_script(
    director: &Director,
    handles: &DemoPage,
    frames: usize,
    clicks: u32,
) -> VecDeque<ScriptedEvent> {
    let page = &director.stage().page;
    let viewport = page.viewport();
    let max_scroll = page.max_scroll();
    let span = frames as f64 * FRAME;

    let mut events = vec![ScriptedEvent {
        at: LOAD_AT,
        event: PageEvent::Load,
    }];

    let mut at = LOAD_AT;
    while at < span {
        let phase = (at / span) as f32;
        let sweep = 1.0 - (2.0 * phase - 1.0).abs();
        events.push(ScriptedEvent {
            at,
            event: PageEvent::Scroll {
                offset: max_scroll * sweep,
            },
        });
        let angle = at as f32 * 1.5;
        events.push(ScriptedEvent {
            at,
            event: PageEvent::PointerMove {
                x: viewport.width * (0.5 + 0.3 * angle.cos()),
                y: viewport.height * (0.5 + 0.3 * angle.sin()),
            },
        });
        at += 0.1;
    }

    for i in 0..clicks {
        events.push(ScriptedEvent {
            at: CLICKS_FROM + f64::from(i) * CLICK_GAP,
            event: PageEvent::Click {
                element: handles.header_logo,
            },
        });
    }

    events.sort_by(|a, b| a.at.total_cmp(&b.at));
    events.into()
}

fn report(director: &Director, console: Vec<String>) -> PageReport {
    let stage = director.stage();
    let page = &stage.page;
    let timelines = &stage.timelines;
    PageReport {
        frames: director.clock().frame,
        seconds: director.clock().total_time,
        systems: director
            .system_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        errors: director.error_count(),
        loading: page.is_loading(),
        elements: page.element_count(),
        scroll_offset: page.scroll_offset(),
        scroll_progress: page.scroll_progress(),
        timelines: timelines.len(),
        ambient: timelines.group_len(TimelineGroup::Ambient),
        transient: timelines.group_len(TimelineGroup::Transient),
        sequence: timelines.group_len(TimelineGroup::Sequence),
        ambient_paused: timelines.is_group_paused(TimelineGroup::Ambient),
        haunted: page.has_class(page.root(), TRIGGERED_CLASS),
        console,
    }
}

fn print_text(report: &PageReport) {
    println!(
        "Ran {} frames ({:.2}s) with {} systems: {}",
        report.frames,
        report.seconds,
        report.systems.len(),
        report.systems.join(", ")
    );
    if report.errors > 0 {
        println!("System errors: {}", report.errors);
    }
    println!("Loading:    {}", report.loading);
    println!("Elements:   {}", report.elements);
    println!(
        "Scroll:     {:.0}px ({:.0}%)",
        report.scroll_offset,
        report.scroll_progress * 100.0
    );
    println!(
        "Timelines:  {} (ambient {}{}, transient {}, sequence {})",
        report.timelines,
        report.ambient,
        if report.ambient_paused { " paused" } else { "" },
        report.transient,
        report.sequence
    );
    println!("Haunted:    {}", report.haunted);
    println!();
    for line in &report.console {
        println!("  {}", line);
    }
}
