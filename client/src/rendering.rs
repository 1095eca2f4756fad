use crate::views::{AnswerContent, GameResult, ViewSet, ALPHABET};
use macroquad::prelude::*;

const LETTERS_PER_ROW: usize = 13;
const LETTER_SIZE: f32 = 44.0;
const LETTER_GAP: f32 = 8.0;

const BACKGROUND: Color = Color::new(0.1, 0.1, 0.12, 1.0);
const PANEL: Color = Color::new(0.2, 0.2, 0.24, 1.0);
const MISSED: Color = Color::new(0.55, 0.2, 0.2, 1.0);

/// Screen geometry shared by the renderer and the input hit tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
}

impl Layout {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn options_button(&self) -> Rect {
        Rect::new(20.0, 20.0, 160.0, 40.0)
    }

    pub fn reveal_button(&self) -> Rect {
        Rect::new(self.width * 0.4, self.height * 0.5, 180.0, 40.0)
    }

    pub fn gallows(&self) -> Rect {
        Rect::new(40.0, 90.0, self.width * 0.3, self.height * 0.55)
    }

    /// Button for the `index`-th letter of the alphabet, laid out in two rows
    pub fn letter_button(&self, index: usize) -> Rect {
        let row = index / LETTERS_PER_ROW;
        let column = index % LETTERS_PER_ROW;
        let row_width = LETTERS_PER_ROW as f32 * (LETTER_SIZE + LETTER_GAP) - LETTER_GAP;
        let x = (self.width - row_width) / 2.0 + column as f32 * (LETTER_SIZE + LETTER_GAP);
        let y = self.height - 2.0 * (LETTER_SIZE + LETTER_GAP) - 30.0
            + row as f32 * (LETTER_SIZE + LETTER_GAP);
        Rect::new(x, y, LETTER_SIZE, LETTER_SIZE)
    }

    pub fn letter_at(&self, point: Vec2) -> Option<char> {
        ALPHABET
            .enumerate()
            .find(|(index, _)| self.letter_button(*index).contains(point))
            .map(|(_, letter)| letter)
    }
}

pub struct Renderer {
    layout: Layout,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Renderer {
            layout: Layout::new(width, height),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn render(&mut self, views: &ViewSet, status: Option<&str>) {
        self.layout = Layout::new(screen_width(), screen_height());
        clear_background(BACKGROUND);

        self.draw_options(views);
        self.draw_gallows(views);
        self.draw_word(views);
        self.draw_banner(views);
        self.draw_answer(views);
        self.draw_alphabet(views);

        if let Some(status) = status {
            draw_text(status, 20.0, self.layout.height - 8.0, 18.0, ORANGE);
        }
    }

    fn draw_button(&self, rect: Rect, label: &str, fill: Color, text: Color) {
        draw_rectangle(rect.x, rect.y, rect.w, rect.h, fill);
        draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, LIGHTGRAY);

        let size = measure_text(label, None, 24, 1.0);
        draw_text(
            label,
            rect.x + (rect.w - size.width) / 2.0,
            rect.y + (rect.h + size.height) / 2.0,
            24.0,
            text,
        );
    }

    fn draw_options(&self, views: &ViewSet) {
        let options = views.options.borrow();
        self.draw_button(self.layout.options_button(), options.label(), PANEL, WHITE);
    }

    fn draw_gallows(&self, views: &ViewSet) {
        let progress = views.progress.borrow();
        let area = self.layout.gallows();
        let base_y = area.y + area.h;
        let pole_x = area.x + area.w * 0.25;
        let beam_end = area.x + area.w * 0.75;
        let rope_end = area.y + area.h * 0.15;

        draw_line(area.x, base_y, area.x + area.w, base_y, 4.0, LIGHTGRAY);
        draw_line(pole_x, base_y, pole_x, area.y, 4.0, LIGHTGRAY);
        draw_line(pole_x, area.y, beam_end, area.y, 4.0, LIGHTGRAY);
        draw_line(beam_end, area.y, beam_end, rope_end, 2.0, LIGHTGRAY);

        // Figure parts scale to the threshold so the last miss completes it
        let parts = 6.0;
        let shown = if progress.threshold == 0 {
            0
        } else {
            ((progress.stage as f32 / progress.threshold as f32) * parts).round() as u32
        };

        let head_radius = area.h * 0.08;
        let head_y = rope_end + head_radius;
        let body_top = head_y + head_radius;
        let body_bottom = body_top + area.h * 0.3;
        let arm_y = body_top + area.h * 0.08;
        let spread = area.w * 0.12;

        if shown >= 1 {
            draw_circle_lines(beam_end, head_y, head_radius, 3.0, WHITE);
        }
        if shown >= 2 {
            draw_line(beam_end, body_top, beam_end, body_bottom, 3.0, WHITE);
        }
        if shown >= 3 {
            draw_line(beam_end, arm_y, beam_end - spread, arm_y + spread, 3.0, WHITE);
        }
        if shown >= 4 {
            draw_line(beam_end, arm_y, beam_end + spread, arm_y + spread, 3.0, WHITE);
        }
        if shown >= 5 {
            draw_line(beam_end, body_bottom, beam_end - spread, body_bottom + spread * 1.5, 3.0, WHITE);
        }
        if shown >= 6 {
            draw_line(beam_end, body_bottom, beam_end + spread, body_bottom + spread * 1.5, 3.0, WHITE);
        }

        let caption = format!("{}/{}", progress.stage, progress.threshold);
        draw_text(&caption, area.x, area.y - 8.0, 20.0, GRAY);
    }

    fn draw_word(&self, views: &ViewSet) {
        let word = views.word.borrow();
        if word.cells.is_empty() {
            return;
        }

        let text = word.text();
        let size = measure_text(&text, None, 48, 1.0);
        let x = (self.layout.width * 0.4).max((self.layout.width - size.width) / 2.0);
        draw_text(&text, x, self.layout.height * 0.35, 48.0, WHITE);
    }

    fn draw_banner(&self, views: &ViewSet) {
        let banner = views.banner.borrow();
        let (text, color) = match banner.current {
            Some(GameResult::Won) => ("You won!", GREEN),
            Some(GameResult::Lost) => ("Out of guesses", RED),
            None => return,
        };
        draw_text(text, self.layout.width * 0.4, self.layout.height * 0.2, 40.0, color);
    }

    fn draw_answer(&self, views: &ViewSet) {
        let answer = views.answer.borrow();
        if !answer.visible {
            return;
        }

        match &answer.content {
            Some(AnswerContent::Answer(word)) => {
                let text = format!("The word was {}", word);
                draw_text(&text, self.layout.width * 0.4, self.layout.height * 0.55, 28.0, YELLOW);
            }
            Some(AnswerContent::Message(message)) => {
                draw_text(message, self.layout.width * 0.4, self.layout.height * 0.55, 22.0, ORANGE);
            }
            None if answer.reveal_offered => {
                self.draw_button(self.layout.reveal_button(), "Reveal answer", PANEL, YELLOW);
            }
            None => {}
        }
    }

    fn draw_alphabet(&self, views: &ViewSet) {
        let alphabet = views.alphabet.borrow();

        for (index, letter) in ALPHABET.enumerate() {
            let rect = self.layout.letter_button(index);
            let (fill, text) = if !alphabet.is_enabled(letter) {
                (DARKGRAY, GRAY)
            } else if alphabet.is_missed(letter) {
                (MISSED, WHITE)
            } else {
                (PANEL, WHITE)
            };
            self.draw_button(rect, &letter.to_string(), fill, text);
        }
    }
}
