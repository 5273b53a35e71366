use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::engine::compare::{AttendSimulation, SkipSimulation};
use crate::tui::theme;
use crate::utils::format::{format_percentage, format_requirement, plural};

/// What-if state shown in the simulator panel.
#[derive(Debug, Clone, PartialEq)]
pub enum Simulation {
    Idle,
    Attend(AttendSimulation),
    Skip(SkipSimulation),
}

pub fn render(frame: &mut Frame, area: Rect, simulation: &Simulation) {
    let block = Block::default()
        .title(Span::styled(" What If ", theme::accent()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let lines = match simulation {
        Simulation::Idle => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  [+] attend more  ·  [-] skip more",
                theme::dim(),
            )),
        ],
        Simulation::Attend(sim) => {
            let style = if sim.target_met {
                theme::green()
            } else {
                theme::amber()
            };
            vec![
                Line::from(vec![
                    Span::styled("  Attend next ", theme::dim()),
                    Span::styled(
                        plural(sim.lectures as usize, "lecture"),
                        theme::green().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("  → ", theme::dim()),
                    Span::styled(
                        format_percentage(sim.projected_percentage, 2),
                        style.add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        if sim.target_met {
                            "  target met".to_string()
                        } else {
                            format!(
                                "  still need {}",
                                format_requirement(sim.remaining_required)
                            )
                        },
                        theme::dim(),
                    ),
                ]),
            ]
        }
        Simulation::Skip(sim) => {
            let style = if sim.recovery_difficult {
                theme::red()
            } else {
                theme::amber()
            };
            let mut lines = vec![
                Line::from(vec![
                    Span::styled("  Skip next ", theme::dim()),
                    Span::styled(
                        plural(sim.lectures as usize, "lecture"),
                        theme::red().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    Span::styled("  → ", theme::dim()),
                    Span::styled(
                        format_percentage(sim.new_percentage, 2),
                        style.add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(
                            "  (−{})  need {} (+{})",
                            format_percentage(sim.drop, 2),
                            format_requirement(sim.new_required),
                            format_requirement(sim.extra_required)
                        ),
                        theme::dim(),
                    ),
                ]),
            ];
            if sim.recovery_difficult {
                lines.push(Line::from(Span::styled(
                    "  ⚠ Recovery would be difficult",
                    theme::red(),
                )));
            }
            lines
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
