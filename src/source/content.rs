//! Content stream scanning.
//!
//! Walks the operators of a decoded page content stream, tracks the text
//! and graphics state needed to place each glyph run, and emits one
//! [`TextRun`] per text-showing operator.

use lopdf::content::Operation;
use lopdf::Object;

use super::text::is_spaceless_script_char;
use crate::model::TextRun;

/// TJ adjustments beyond this many thousandths of an em read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn scale(s: f32) -> Self {
        Matrix {
            a: s,
            d: s,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        Some(Matrix {
            a: get_number(&operands[0])?,
            b: get_number(&operands[1])?,
            c: get_number(&operands[2])?,
            d: get_number(&operands[3])?,
            e: get_number(&operands[4])?,
            f: get_number(&operands[5])?,
        })
    }

    /// `self × other`
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

/// Text state between `BT` and `ET`.
#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    matrix: Matrix,
    line_matrix: Matrix,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            font_size: 12.0,
            leading: 0.0,
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.matrix = m;
        self.line_matrix = m;
    }

    /// Glyph rendering matrix for the current position.
    fn rendering_matrix(&self, ctm: &Matrix) -> Matrix {
        Matrix::scale(self.font_size).then(&self.matrix.then(ctm))
    }
}

/// Turns content stream operations of one page into text runs.
#[derive(Debug, Clone, Copy)]
pub struct ContentScanner {
    page: u32,
}

impl ContentScanner {
    /// Create a scanner for the given page (1-indexed).
    pub fn new(page: u32) -> Self {
        Self { page }
    }

    /// Scan operations, decoding string operands with `decode(font_resource, bytes)`.
    ///
    /// Blank fragments produce no run.
    pub fn scan<F>(&self, operations: &[Operation], mut decode: F) -> Vec<TextRun>
    where
        F: FnMut(&[u8], &[u8]) -> String,
    {
        let mut runs = Vec::new();
        let mut ctm = Matrix::IDENTITY;
        let mut saved = Vec::new();
        let mut state = TextState::default();
        let mut in_text = false;

        for op in operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                // Tf and TL belong to the graphics state, so Q restores them too
                "q" => saved.push((ctm, state.font.clone(), state.font_size, state.leading)),
                "Q" => {
                    if let Some((m, font, font_size, leading)) = saved.pop() {
                        ctm = m;
                        state.font = font;
                        state.font_size = font_size;
                        state.leading = leading;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        ctm = m.then(&ctm);
                    }
                }
                "BT" => {
                    in_text = true;
                    state.begin();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if let [Object::Name(name), size, ..] = operands {
                        state.font = name.clone();
                        state.font_size = get_number(size).unwrap_or(state.font_size);
                    }
                }
                "TL" => {
                    if let Some(leading) = operands.first().and_then(get_number) {
                        state.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let [tx, ty, ..] = operands {
                        let tx = get_number(tx).unwrap_or(0.0);
                        let ty = get_number(ty).unwrap_or(0.0);
                        if op.operator == "TD" {
                            state.leading = -ty;
                        }
                        state.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        state.set_matrix(m);
                    }
                }
                "T*" => state.next_line(),
                "Tj" | "'" | "\"" => {
                    if op.operator != "Tj" {
                        state.next_line();
                    }
                    let index = if op.operator == "\"" { 2 } else { 0 };
                    if let (true, Some(Object::String(bytes, _))) = (in_text, operands.get(index)) {
                        let text = decode(state.font.as_slice(), bytes);
                        self.push_run(&mut runs, &text, &state, &ctm);
                    }
                }
                "TJ" => {
                    if let (true, Some(Object::Array(items))) = (in_text, operands.first()) {
                        let text = join_tj(items, |bytes| decode(state.font.as_slice(), bytes));
                        self.push_run(&mut runs, &text, &state, &ctm);
                    }
                }
                _ => {}
            }
        }

        runs
    }

    fn push_run(&self, runs: &mut Vec<TextRun>, text: &str, state: &TextState, ctm: &Matrix) {
        let m = state.rendering_matrix(ctm);
        let size = m.a.hypot(m.d);
        if !size.is_finite() {
            return;
        }
        if let Some(run) = TextRun::new(text, self.page, size, m.f) {
            runs.push(run);
        }
    }
}

/// Join the strings of a TJ array, turning large kerning gaps into spaces.
fn join_tj<F>(items: &[Object], mut decode: F) -> String
where
    F: FnMut(&[u8]) -> String,
{
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode(bytes)),
            other => {
                // Negative adjustments advance the pen to the right
                let Some(adjustment) = get_number(other).map(|n| -n) else {
                    continue;
                };
                if adjustment > TJ_SPACE_THRESHOLD
                    && !combined.ends_with(&[' ', '\u{00A0}'][..])
                    && combined
                        .chars()
                        .last()
                        .is_some_and(|c| !is_spaceless_script_char(c))
                {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
