use ratatui::{prelude::*, widgets::*};
use rescue_world_core::{
    Position,
    agent::{RescueAgent, Role},
    simulation::Simulation,
    world::GridWorld,
};

use crate::App;

/// Renders the user interface.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)])
        .split(frame.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(main_layout[0]);
    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(12), Constraint::Min(8)])
        .split(body[1]);

    let sim = app.simulation();
    render_map(frame, body[0], sim);
    render_stats(frame, side[0], app);
    render_roster(frame, side[1], sim.agents());
    render_help(frame, main_layout[1], app);
}

fn role_glyph(role: Role) -> &'static str {
    match role {
        Role::Extinguisher => "E",
        Role::Searcher => "S",
        Role::Rescuer => "R",
        Role::DoorOpener => "D",
    }
}

/// Two-character tile for a cell. Undiscovered cells are opaque.
fn tile(world: &GridWorld, agents: &[RescueAgent], pos: Position) -> Span<'static> {
    if !world.is_discovered(pos) {
        return Span::styled("░░", Style::default().fg(Color::DarkGray));
    }
    if let Some(agent) = agents.iter().find(|a| a.position() == pos) {
        let style = if agent.is_carrying() {
            Style::default().fg(Color::Green).bold()
        } else {
            Style::default().fg(Color::Cyan).bold()
        };
        return Span::styled(format!("{}{}", role_glyph(agent.role()), agent.id()), style);
    }
    let (text, style) = if !world.is_floor(pos) {
        ("##", Style::default().fg(Color::DarkGray))
    } else if world.has_fire(pos) {
        ("^^", Style::default().fg(Color::Red).bold())
    } else if world.has_smoke(pos) {
        ("~~", Style::default().fg(Color::Gray))
    } else if world.has_found_victim(pos) {
        ("V!", Style::default().fg(Color::Magenta).bold())
    } else if world.has_poi(pos) {
        ("??", Style::default().fg(Color::Yellow))
    } else if world.has_closed_door(pos) {
        ("[]", Style::default().fg(Color::LightBlue))
    } else if world.open_doors().contains_key(&pos) {
        ("''", Style::default().fg(Color::LightBlue))
    } else if world.is_entrance(pos) {
        ("<>", Style::default().fg(Color::Green))
    } else {
        ("··", Style::default())
    };
    Span::styled(text, style)
}

fn render_map(frame: &mut Frame, area: Rect, sim: &Simulation) {
    let world = sim.world();
    let lines: Vec<Line> = (0..world.height())
        .map(|y| {
            let spans: Vec<Span> = (0..world.width())
                .flat_map(|x| [tile(world, sim.agents(), Position::new(x, y)), Span::raw(" ")])
                .collect();
            Line::from(spans)
        })
        .collect();

    let map_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Building").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(map_paragraph, area);
}

fn render_stats(frame: &mut Frame, area: Rect, app: &App) {
    let sim = app.simulation();
    let counters = sim.counters();
    let rules = sim.rules();
    let world = sim.world();

    let status = match counters.result {
        Some(result) if result.is_victory() => {
            Span::styled(result.to_string(), Style::default().fg(Color::Green).bold())
        }
        Some(result) => Span::styled(result.to_string(), Style::default().fg(Color::Red).bold()),
        None if app.auto_advance() => Span::raw("running"),
        None => Span::raw("paused"),
    };

    let lines = vec![
        Line::from(vec![Span::raw("Status:  "), status]),
        Line::from(format!("Turn:    {}", counters.turn)),
        Line::from(format!("Rescued: {}/{}", counters.rescued, rules.victims_to_win)),
        Line::from(format!("Lost:    {}/{}", counters.lost, rules.max_victims_lost)),
        Line::from(format!("Damage:  {}/{}", counters.damage, rules.max_damage)),
        Line::from(format!(
            "Found:   {}  markers {}",
            counters.found,
            world.found_victims().len()
        )),
        Line::from(format!(
            "Fire {}  Smoke {}  POI {}",
            world.fire().len(),
            world.smoke().len(),
            world.pois().len()
        )),
        Line::from(format!("Mode:    {:?}", sim.mode())),
        Line::from(format!("Seed:    {}", sim.seed())),
        Line::from(format!("Hazard:  {}", hazard_text(sim))),
    ];

    let widget = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Statistics"));
    frame.render_widget(widget, area);
}

fn hazard_text(sim: &Simulation) -> String {
    use rescue_world_core::fire::HazardEvent;
    match sim.last_hazard() {
        None => "-".to_string(),
        Some(HazardEvent::Smoke(p)) => format!("smoke at ({}, {})", p.x, p.y),
        Some(HazardEvent::Ignition(p)) => format!("ignition at ({}, {})", p.x, p.y),
        Some(HazardEvent::Expansion { to, .. }) => format!("spread to ({}, {})", to.x, to.y),
        Some(HazardEvent::Contained(p)) => format!("contained at ({}, {})", p.x, p.y),
    }
}

fn render_roster(frame: &mut Frame, area: Rect, agents: &[RescueAgent]) {
    let items: Vec<ListItem> = agents
        .iter()
        .map(|agent| {
            let pos = agent.position();
            let target = agent
                .target()
                .map(|t| format!("({}, {})", t.x, t.y))
                .unwrap_or_else(|| "-".to_string());
            let mut spans = vec![
                Span::styled(
                    format!("{}{} ", role_glyph(agent.role()), agent.id()),
                    Style::default().fg(Color::Cyan).bold(),
                ),
                Span::raw(format!(
                    "{:<12} ({}, {}) AP {}/{} {:?} -> {}",
                    agent.role().label(),
                    pos.x,
                    pos.y,
                    agent.action_points(),
                    agent.max_action_points(),
                    agent.state(),
                    target
                )),
            ];
            if agent.is_carrying() {
                spans.push(Span::styled(" carrying", Style::default().fg(Color::Green)));
            }
            ListItem::from(Line::from(spans))
        })
        .collect();

    let roster = List::new(items).block(Block::default().borders(Borders::ALL).title("Team"));
    frame.render_widget(roster, area);
}

fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let text = match app.notice() {
        Some(notice) => Line::from(Span::styled(notice.to_string(), Style::default().fg(Color::Yellow))),
        None => Line::from(
            "space: step  a: auto on/off  r: reset  m: reset in other mode  q/Esc: quit",
        ),
    };
    let help_text = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, area);
}
