//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::WorstBandPolicy;
use crate::application::{load_reference_tables, RiskAssessor};
use crate::config::CalculatorConfig;
use crate::domain::{RaceWindow, RiskReport};

use super::ui::{
    form::{render_patient_form, PatientFormState},
    render_disclaimer,
    report::render_report,
};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Report,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    assessor: RiskAssessor<WorstBandPolicy>,

    /// Window used to lock the race field
    race_window: RaceWindow,

    /// Patient form state
    form_state: PatientFormState,

    /// Last completed report
    report: Option<RiskReport>,
}

impl App {
    /// Create a new application from environment configuration.
    ///
    /// For more control, use `with_dependencies()`.
    ///
    /// # Errors
    /// Returns error if the configuration or reference data is invalid.
    pub fn new() -> Result<Self> {
        let config = CalculatorConfig::from_env()?;
        let tables = load_reference_tables(&config)?;
        let assessor = RiskAssessor::new(tables, WorstBandPolicy::default(), &config);
        Ok(Self::with_dependencies(assessor))
    }

    /// Create application with an injected assessor (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(assessor: RiskAssessor<WorstBandPolicy>) -> Self {
        let race_window = assessor.classifier().tables().race_window();
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            assessor,
            race_window,
            form_state: PatientFormState::default(),
            report: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match (self.screen, &self.report) {
                    (Screen::Report, Some(report)) => render_report(f, chunks[0], report),
                    _ => render_patient_form(f, chunks[0], &self.form_state, self.race_window),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_form_key(key),
            Screen::Report => self.handle_report_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.form_state.prev_field();
            }
            KeyCode::Down | KeyCode::Tab => {
                self.form_state.next_field();
            }
            KeyCode::Left | KeyCode::Right => {
                self.form_state.cycle_choice(self.race_window);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.form_state.load_sample_data();
            }
            KeyCode::Char(c) => {
                self.form_state.input_char(c, self.race_window);
            }
            KeyCode::Backspace => {
                self.form_state.delete_char();
            }
            KeyCode::Delete => {
                self.form_state.clear_field();
            }
            KeyCode::Enter => {
                self.submit_form();
            }
            _ => {}
        }
    }

    fn handle_report_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Enter => {
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state = PatientFormState::default();
                self.report = None;
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        let input = match self.form_state.to_patient_input(self.race_window) {
            Ok(input) => input,
            Err(e) => {
                self.form_state.error_message = Some(e);
                return;
            }
        };

        match self.assessor.assess(&input) {
            Ok(report) => {
                self.report = Some(report);
                self.form_state.error_message = None;
                self.screen = Screen::Report;
            }
            Err(e) => {
                tracing::error!("Report failed: {}", e);
                self.form_state.error_message = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::BuiltinReference;
    use crate::domain::Race;
    use crate::ports::ReferenceSource;

    fn app() -> App {
        let config = CalculatorConfig::default();
        let tables = BuiltinReference::new()
            .load(config.race_window)
            .expect("Built-in data is valid");
        App::with_dependencies(RiskAssessor::new(
            Arc::new(tables),
            WorstBandPolicy::default(),
            &config,
        ))
    }

    #[test]
    fn test_submit_sample_shows_report() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.screen, Screen::Report);
        let report = app.report.as_ref().expect("Report produced");
        assert_eq!(report.vascular_age, 50.0);
    }

    #[test]
    fn test_untoggled_race_uses_white_tables() {
        let mut app = app();
        for (i, text) in ["0.632", "0.670", "55"].into_iter().enumerate() {
            app.form_state.fields[i].value = text.to_string();
        }
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        let report = app.report.as_ref().expect("Report produced");
        assert_eq!(report.reference_race, Race::White);
        assert_eq!(report.right.reference_age, Some(55));
        assert_eq!(report.right.label, "25th–50th percentile");
    }

    #[test]
    fn test_submit_empty_form_shows_error() {
        let mut app = app();
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(app.screen, Screen::PatientForm);
        assert!(app.form_state.error_message.is_some());
        assert!(app.report.is_none());
    }

    #[test]
    fn test_new_patient_resets_form() {
        let mut app = app();
        app.handle_key(KeyCode::Char('s'), KeyModifiers::NONE);
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        app.handle_key(KeyCode::Char('n'), KeyModifiers::NONE);

        assert_eq!(app.screen, Screen::PatientForm);
        assert!(app.report.is_none());
        assert!(app.form_state.fields.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_ctrl_q_quits() {
        let mut app = app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
