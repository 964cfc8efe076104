//! Patient measurement input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{parse_plaque_sizes, PatientInput, Race, RaceWindow, Sex, MAX_AGE, MIN_AGE};
use crate::tui::styles::MedicalTheme;

use super::{key_hints, render_header};

/// How a field takes input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free numeric text
    Number,
    /// Comma-separated numbers
    List,
    /// Cycled with Space or arrow keys
    Choice,
}

/// Form field definition
#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

impl FormField {
    fn text(label: &'static str, hint: &'static str, kind: FieldKind) -> Self {
        Self {
            label,
            hint,
            kind,
            value: String::new(),
        }
    }
}

const RIGHT_CIMT: usize = 0;
const LEFT_CIMT: usize = 1;
const AGE: usize = 2;
const SEX: usize = 3;
const RACE: usize = 4;
const PLAQUES: usize = 5;

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub sex: Sex,
    /// Race as chosen, White until toggled; shown as General while the age
    /// is outside the window
    pub race: Race,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::text("Right CIMT", "mm (e.g. 0.632)", FieldKind::Number),
                FormField::text("Left CIMT", "mm (e.g. 0.670)", FieldKind::Number),
                FormField::text("Age", "years (15-100)", FieldKind::Number),
                FormField::text("Sex", "", FieldKind::Choice),
                FormField::text("Race", "", FieldKind::Choice),
                FormField::text("Plaques", "mm, comma-separated (optional)", FieldKind::List),
            ],
            selected_field: 0,
            sex: Sex::Male,
            race: Race::White,
            error_message: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    fn selected_kind(&self) -> FieldKind {
        self.fields[self.selected_field].kind
    }

    /// Add a character to the current field
    pub fn input_char(&mut self, c: char, window: RaceWindow) {
        let accepted = match self.selected_kind() {
            FieldKind::Number => c.is_ascii_digit() || c == '.',
            FieldKind::List => c.is_ascii_digit() || c == '.' || c == ',' || c == ' ',
            FieldKind::Choice => {
                if c == ' ' {
                    self.cycle_choice(window);
                }
                false
            }
        };
        if accepted {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.fields[self.selected_field].value.clear();
    }

    /// Advance the selected choice field; a locked race stays General.
    pub fn cycle_choice(&mut self, window: RaceWindow) {
        match self.selected_field {
            SEX => self.sex = self.sex.toggled(),
            RACE if !self.race_locked(window) => self.race = self.race.next_specific(),
            _ => {}
        }
    }

    /// Parsed age, if the field holds a whole number
    #[must_use]
    pub fn age(&self) -> Option<u32> {
        self.fields[AGE].value.trim().parse().ok()
    }

    /// Race selection is only offered inside the race window.
    #[must_use]
    pub fn race_locked(&self, window: RaceWindow) -> bool {
        self.age().map_or(true, |age| !window.contains(age))
    }

    /// Race that will be submitted
    #[must_use]
    pub fn effective_race(&self, window: RaceWindow) -> Race {
        if self.race_locked(window) {
            Race::General
        } else {
            self.race
        }
    }

    /// Validate and convert to a patient input
    pub fn to_patient_input(&self, window: RaceWindow) -> Result<PatientInput, String> {
        let cimt = |index: usize| -> Result<f64, String> {
            let field = &self.fields[index];
            match field.value.trim().parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
                _ => Err(format!("{}: Enter a thickness greater than 0", field.label)),
            }
        };

        let right = cimt(RIGHT_CIMT)?;
        let left = cimt(LEFT_CIMT)?;
        let age = self
            .age()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .ok_or_else(|| format!("Age: Value must be between {MIN_AGE} and {MAX_AGE}"))?;
        let plaques = parse_plaque_sizes(&self.fields[PLAQUES].value)?;

        Ok(PatientInput::new(right, left, age, self.sex)
            .with_race(self.effective_race(window))
            .with_plaques(plaques))
    }

    /// Load sample data for testing
    pub fn load_sample_data(&mut self) {
        // White male, 49, two significant plaques
        let sample = ["0.632", "0.670", "49", "", "", "2.0, 1.5"];
        for (field, value) in self.fields.iter_mut().zip(sample) {
            field.value = value.to_string();
        }
        self.sex = Sex::Male;
        self.race = Race::White;
        self.error_message = None;
    }

    fn display_value(&self, index: usize, window: RaceWindow) -> Option<String> {
        match index {
            SEX => Some(self.sex.to_string()),
            RACE if self.race_locked(window) => {
                Some(format!("General (race tables apply at ages {window})"))
            }
            RACE => Some(self.race.to_string()),
            _ => {
                let value = &self.fields[index].value;
                (!value.is_empty()).then(|| value.clone())
            }
        }
    }
}

/// Render the patient input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState, window: RaceWindow) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_header(f, chunks[0], "CIMT Risk Report", "Carotid Intima-Media Thickness");
    render_form_fields(f, chunks[1], state, window);
    render_form_footer(f, chunks[2], state);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState, window: RaceWindow) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;
    render_field_column(f, columns[0], state, 0..mid, window);
    render_field_column(f, columns[1], state, mid..state.fields.len(), window);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &PatientFormState,
    indices: std::ops::Range<usize>,
    window: RaceWindow,
) {
    let constraints: Vec<Constraint> = indices
        .clone()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, index) in indices.enumerate() {
        let field = &state.fields[index];
        let is_selected = index == state.selected_field;
        let locked = index == RACE && state.race_locked(window);

        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value_display = match state.display_value(index, window) {
            Some(value) if locked => Span::styled(value, MedicalTheme::text_muted()),
            Some(value) => Span::styled(value, MedicalTheme::text()),
            None => Span::styled(field.hint, MedicalTheme::text_muted()),
        };

        let cursor = match (is_selected, field.kind) {
            (false, _) => Span::raw(""),
            (true, FieldKind::Choice) if !locked => {
                Span::styled("  ◂ Space ▸", MedicalTheme::cursor())
            }
            (true, FieldKind::Choice) => Span::raw(""),
            (true, _) => Span::styled("▌", MedicalTheme::cursor()),
        };

        let content =
            Paragraph::new(Line::from(vec![Span::raw(" "), value_display, cursor])).block(block);

        f.render_widget(content, chunks[slot]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        key_hints(&[
            ("↑↓", "Navigate"),
            ("Space", "Toggle"),
            ("Enter", "Calculate"),
            ("S", "Sample Data"),
            ("Esc", "Quit"),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
