use mrz_fast_types::MrzResult;
use serde::{Deserialize, Serialize};

/// Minimum trimmed line length the pattern strategy accepts (TD2/TD3 widths
/// with a little OCR slack).
const PATTERN_MIN_LEN: usize = 40;
/// Maximum trimmed line length the pattern strategy accepts.
const PATTERN_MAX_LEN: usize = 45;
/// Shortest run of MRZ-charset characters that marks a line as MRZ-like.
const PATTERN_MIN_RUN: usize = 10;
/// TD3 passports carry exactly two MRZ lines.
const TD3_LINE_COUNT: usize = 2;

/// Line-filtering heuristic. `PatternValidated` is the default: it survives
/// garbled leading lines (headers, borders) that fool the equal-length rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Trust the final physical line: its length sets the expected MRZ width
    /// and the longest trailing run of lines with exactly that length wins.
    EqualLength,
    /// Keep lines that look like MRZ rows: trimmed length in the TD3 window
    /// and a long contiguous run of `A-Z0-9<` characters.
    #[default]
    PatternValidated,
}

/// Stateless extractor over raw OCR text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrzExtractor {
    strategy: Strategy,
}

impl MrzExtractor {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Filter raw OCR output down to the MRZ lines, in original order.
    /// Never fails; text with no valid lines yields an empty result.
    pub fn extract(&self, raw: &str) -> MrzResult {
        let lines = match self.strategy {
            Strategy::EqualLength => equal_length_lines(raw),
            Strategy::PatternValidated => pattern_lines(raw),
        };
        MrzResult::from_lines(lines)
    }
}

fn equal_length_lines(raw: &str) -> Vec<String> {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    // A trailing newline in the OCR dump would make the "last line" empty
    // and poison the expected width.
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let Some(expected) = lines.last().map(|line| line.len()) else {
        return Vec::new();
    };

    let tail_start = lines
        .iter()
        .rposition(|line| line.len() != expected)
        .map_or(0, |index| index + 1);
    lines[tail_start..]
        .iter()
        .map(|line| line.to_string())
        .collect()
}

fn pattern_lines(raw: &str) -> Vec<String> {
    let survivors: Vec<String> = raw
        .split('\n')
        .map(str::trim)
        .filter(|line| {
            (PATTERN_MIN_LEN..=PATTERN_MAX_LEN).contains(&line.len())
                && longest_mrz_run(line) >= PATTERN_MIN_RUN
        })
        .map(str::to_string)
        .collect();

    if survivors.len() >= TD3_LINE_COUNT {
        survivors[survivors.len() - TD3_LINE_COUNT..].to_vec()
    } else {
        survivors
    }
}

fn longest_mrz_run(line: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in line.chars() {
        if is_mrz_char(ch) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn is_mrz_char(ch: char) -> bool {
    ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '<'
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
    const LINE_2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";

    #[test]
    fn pattern_strategy_discards_noise_lines() {
        let raw = format!("NOISE\n{LINE_1}\n{LINE_2}\n");
        let result = MrzExtractor::new(Strategy::PatternValidated).extract(&raw);
        assert_eq!(result.lines(), &[LINE_1.to_string(), LINE_2.to_string()]);
    }

    #[test]
    fn pattern_strategy_accepts_ragged_line_widths() {
        // Line one lost trailing fillers to OCR (41 chars); the pattern rule
        // still accepts it where the equal-length rule cannot.
        let short = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<";
        let second = "L898902C<3UTO6908061F9406236ZE184226B<<<<<10";
        let raw = format!("NOISE\n{short}\n{second}\n");
        let result = MrzExtractor::new(Strategy::PatternValidated).extract(&raw);
        assert_eq!(result.lines(), &[short.to_string(), second.to_string()]);
    }

    #[test]
    fn both_strategies_recover_td3_lines_among_noise() {
        let raw = format!("PASSPORT\nREPUBLIC OF UTOPIA\nx\n{LINE_1}\n{LINE_2}");
        for strategy in [Strategy::EqualLength, Strategy::PatternValidated] {
            let result = MrzExtractor::new(strategy).extract(&raw);
            assert_eq!(
                result.lines(),
                &[LINE_1.to_string(), LINE_2.to_string()],
                "strategy {strategy:?}"
            );
        }
    }

    #[test]
    fn equal_length_takes_the_longest_trailing_run() {
        let raw = "aaaa\nbbbbb\ncccc\ndddd";
        let result = MrzExtractor::new(Strategy::EqualLength).extract(raw);
        assert_eq!(result.lines(), &["cccc".to_string(), "dddd".to_string()]);
    }

    #[test]
    fn equal_length_survives_a_trailing_newline() {
        let raw = format!("{LINE_1}\n{LINE_2}\n");
        let result = MrzExtractor::new(Strategy::EqualLength).extract(&raw);
        assert_eq!(result.line_count(), 2);
    }

    #[test]
    fn pattern_strategy_keeps_the_last_two_when_more_survive() {
        let extra = "X".repeat(44);
        let raw = format!("{extra}\n{LINE_1}\n{LINE_2}");
        let result = MrzExtractor::new(Strategy::PatternValidated).extract(&raw);
        assert_eq!(result.lines(), &[LINE_1.to_string(), LINE_2.to_string()]);
    }

    #[test]
    fn pattern_strategy_returns_a_single_survivor() {
        let raw = format!("short line\n{LINE_2}");
        let result = MrzExtractor::new(Strategy::PatternValidated).extract(&raw);
        assert_eq!(result.lines(), &[LINE_2.to_string()]);
    }

    #[test]
    fn no_valid_lines_yield_an_empty_result() {
        let raw = "RECEIPT\n12.50 TOTAL\nthank you";
        let result = MrzExtractor::new(Strategy::PatternValidated).extract(raw);
        assert!(result.is_empty());

        for strategy in [Strategy::EqualLength, Strategy::PatternValidated] {
            let empty = MrzExtractor::new(strategy).extract("");
            assert!(empty.is_empty(), "strategy {strategy:?}");
        }
    }

    #[test]
    fn lowercase_runs_do_not_count_as_mrz() {
        let lowercase = "l898902c36uto7408122f1204159ze184226b<<<<<10";
        assert!(longest_mrz_run(lowercase) < PATTERN_MIN_RUN);
        let result = MrzExtractor::new(Strategy::PatternValidated).extract(lowercase);
        assert!(result.is_empty());
    }

    #[test]
    fn extracted_pair_classifies_as_td3() {
        let raw = format!("{LINE_1}\n{LINE_2}");
        let result = MrzExtractor::default().extract(&raw);
        assert_eq!(result.format(), Some(mrz_fast_types::MrzFormat::Td3));
        assert_eq!(result.text(), raw);
    }
}
