//! Report screen: summary, impression and vascular age chart.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::domain::{ClassificationResult, RiskReport, CLINICAL_NOTE};
use crate::tui::styles::MedicalTheme;

use super::{key_hints, render_header};

/// Age axis upper bound, also the end of the patient line
const CHART_MAX_AGE: f64 = 80.0;
const CHART_MAX_CIMT: f64 = 1.15;

/// Render the report for a completed calculation
pub fn render_report(f: &mut Frame, area: Rect, report: &RiskReport) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(
        f,
        chunks[0],
        "CIMT Risk Summary",
        &format!(
            "{} │ {} reference │ {}",
            report.sex,
            report.reference_race,
            report.created_at.format("%Y-%m-%d %H:%M UTC")
        ),
    );

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .margin(1)
        .split(chunks[1]);

    render_summary(f, body[0], report);
    render_chart(f, body[1], report);

    let footer = Paragraph::new(key_hints(&[("N", "New Patient"), ("Esc", "Edit"), ("Q", "Quit")]))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(MedicalTheme::border()),
        );
    f.render_widget(footer, chunks[2]);
}

fn side_line(label: &str, cimt: f64, result: &ClassificationResult) -> Line<'static> {
    let band_style = if result.has_reference_data() {
        MedicalTheme::text()
    } else {
        MedicalTheme::text_muted()
    };
    let reference = result
        .reference_age
        .map(|age| format!(" (age {age} table)"))
        .unwrap_or_default();

    Line::from(vec![
        Span::styled(format!("{label}: "), MedicalTheme::text_secondary()),
        Span::styled(format!("{cimt:.3} mm"), MedicalTheme::title()),
        Span::styled(" → ", MedicalTheme::text_muted()),
        Span::styled(result.label.clone(), band_style),
        Span::styled(reference, MedicalTheme::text_muted()),
    ])
}

fn value_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), MedicalTheme::text_secondary()),
        Span::styled(value, MedicalTheme::title()),
    ])
}

fn render_summary(f: &mut Frame, area: Rect, report: &RiskReport) {
    let tier_style = MedicalTheme::risk_tier(report.impression.tier);
    let tier_badge = report
        .impression
        .tier
        .map_or_else(|| "UNGRADED".to_string(), |tier| tier.to_string());
    let tier_description = report
        .impression
        .tier
        .map(|tier| tier.description())
        .unwrap_or("Not enough reference data to grade");

    let text = vec![
        side_line("Right CIMT", report.right_cimt, &report.right),
        side_line("Left CIMT", report.left_cimt, &report.left),
        value_line("Average CIMT", format!("{:.3} mm", report.average_cimt)),
        value_line(
            "Vascular Age Estimate",
            format!("{} years", report.vascular_age),
        ),
        value_line("Plaque Burden", format!("{:.3} mm", report.plaque_burden)),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!(" {tier_badge} "), tier_style),
            Span::styled(format!(" {tier_description}"), MedicalTheme::text_secondary()),
        ]),
        Line::from(Span::styled(report.impression.text.clone(), tier_style)),
        Line::from(""),
        Line::from(Span::styled(
            format!("Note: {CLINICAL_NOTE}"),
            MedicalTheme::text_muted(),
        )),
    ];

    let summary = Paragraph::new(text)
        .block(
            Block::default()
                .title(Span::styled(" Summary ", MedicalTheme::title()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(summary, area);
}

fn render_chart(f: &mut Frame, area: Rect, report: &RiskReport) {
    let chart_data = &report.chart;
    let patient_line = [
        (0.0, chart_data.patient_cimt),
        (CHART_MAX_AGE, chart_data.patient_cimt),
    ];
    let marker = [chart_data.marker];

    let datasets = vec![
        Dataset::default()
            .name("Male avg")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(MedicalTheme::PRIMARY_LIGHT))
            .data(&chart_data.male_curve),
        Dataset::default()
            .name("Female avg")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(MedicalTheme::SECONDARY_LIGHT))
            .data(&chart_data.female_curve),
        Dataset::default()
            .name("Patient CIMT")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(MedicalTheme::text_muted())
            .data(&patient_line),
        Dataset::default()
            .name(format!("Vascular age {}", report.vascular_age))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(MedicalTheme::danger())
            .data(&marker),
    ];

    let x_labels = vec![
        Span::styled("0", MedicalTheme::text_muted()),
        Span::styled("40", MedicalTheme::text_muted()),
        Span::styled("80", MedicalTheme::text_muted()),
    ];
    let y_labels = vec![
        Span::styled("0.00", MedicalTheme::text_muted()),
        Span::styled("0.50", MedicalTheme::text_muted()),
        Span::styled("1.15", MedicalTheme::text_muted()),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(Span::styled(" Vascular Age ", MedicalTheme::title()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("Age (years)", MedicalTheme::text_secondary()))
                .style(MedicalTheme::border())
                .bounds([0.0, CHART_MAX_AGE])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("CIMT (mm)", MedicalTheme::text_secondary()))
                .style(MedicalTheme::border())
                .bounds([0.0, CHART_MAX_CIMT])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}
