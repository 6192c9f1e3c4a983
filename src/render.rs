use chrono::{Datelike, NaiveDate};

use crate::api::types::{CampaignDay, DayDetail, Progress};
use crate::machine::{AnswerOutcome, Notice, Severity};

/// Fallback month label when a day carries no date. Tiles without dates are a
/// deliberately degraded display mode, not an error.
const DEFAULT_MONTH: &str = "DECEMBER";

fn parse_day_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Uppercase month label for a tile, from its date when present.
pub fn tile_month_label(day_date: Option<&str>) -> String {
    day_date
        .and_then(parse_day_date)
        .map(|d| d.format("%B").to_string().to_uppercase())
        .unwrap_or_else(|| DEFAULT_MONTH.to_string())
}

/// Big number on a tile: day-of-month when dated, else the day index.
pub fn tile_number(day_number: u32, day_date: Option<&str>) -> u32 {
    day_date
        .and_then(parse_day_date)
        .map(|d| d.day())
        .unwrap_or(day_number)
}

/// Heading for the question view, e.g. "Friday, December 5" or "Day 5".
pub fn day_heading(day_number: u32, day_date: Option<&str>) -> String {
    match day_date.and_then(parse_day_date) {
        Some(d) => format!("{}, {} {}", d.format("%A"), d.format("%B"), d.day()),
        None => format!("Day {day_number}"),
    }
}

fn tile_marker(day: &CampaignDay) -> &'static str {
    if day.is_locked || !day.is_available {
        "locked"
    } else if day.is_completed {
        match day.is_correct {
            Some(true) => "answered ✓",
            Some(false) => "answered ✗",
            None => "answered",
        }
    } else if day.is_current {
        "today"
    } else {
        "open"
    }
}

/// Print the calendar grid, one tile per line.
pub fn print_dashboard(days: &[CampaignDay], current_day: Option<u32>, total_days: u32) {
    println!("=== {total_days} Days of Giving ===");
    if let Some(current) = current_day {
        println!("Today is day {current}.");
    }
    for day in days {
        println!(
            "  {:>2}. {} {:>2} — {:<24} [{}]",
            day.day_number,
            tile_month_label(day.day_date.as_deref()),
            tile_number(day.day_number, day.day_date.as_deref()),
            day.prize_name,
            tile_marker(day)
        );
    }
    println!();
}

pub fn print_question(detail: &DayDetail) {
    println!("=== {} ===", day_heading(detail.day_number, detail.day_date.as_deref()));
    println!("Today's prize is a {}.", detail.prize_name);
    println!("Answer the question below correctly for a chance to win.\n");
    println!("{}\n", detail.question);
    for (letter, text) in detail.options() {
        println!("  {letter}. {text}");
    }
    println!();
}

pub fn print_result(outcome: &AnswerOutcome) {
    println!("=== Thanks for playing! ===");
    if outcome.is_correct {
        println!("You're entered to win today's prize.");
        println!("Check back tomorrow for another chance!");
    } else {
        println!("Please see the correct answer below,");
        println!("and check back tomorrow for another chance!");
    }
    if !outcome.correct_answer_text.is_empty() {
        println!("Correct Answer: {}", outcome.correct_answer_text);
    }
    println!();
}

pub fn print_progress(progress: &Progress) {
    println!("=== Your progress ===");
    println!(
        "Completed {} of {} days ({} correct, {} incorrect)",
        progress.completed_days,
        progress.total_days,
        progress.correct_answers,
        progress.incorrect_answers
    );
    if !progress.completed_day_numbers.is_empty() {
        let list: Vec<String> = progress
            .completed_day_numbers
            .iter()
            .map(u32::to_string)
            .collect();
        println!("Days answered: {}", list.join(", "));
    }
    println!();
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.severity {
            Severity::Error => println!("!! {}: {}", notice.title, notice.message),
            Severity::Info => println!("-- {}: {}", notice.title, notice.message),
        }
    }
}
