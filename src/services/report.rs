use colored::Colorize;

use crate::domain::{Division, Match};
use crate::predict::{EventValidation, ValidationReport, WeightSweep};
use crate::rating::{RankedTeam, RankingKey};

const GOOD_ACCURACY: f64 = 50.0;

pub fn print_rankings(division: &Division, ranked: &[RankedTeam], key: RankingKey) {
    println!(
        "{}",
        format!("{} (division {}) by {}", division.name, division.id, key.as_str().to_uppercase()).bold()
    );
    println!("{:>4}  {:<10} {:>8} {:>8} {:>8} {:>6}", "#", "Team", "OPR", "DPR", "CCWM", "Played");

    for entry in ranked {
        let r = &entry.rating;
        println!(
            "{:>4}  {:<10} {:>8.2} {:>8.2} {:>8.2} {:>6}",
            entry.rank, r.team.number, r.opr, r.dpr, r.ccwm, r.matches_played
        );
    }
    println!();
}

pub fn print_unrated(division: &Division, reason: &str) {
    println!(
        "{} {}",
        format!("{} (division {}):", division.name, division.id).bold(),
        format!("no ratings available ({})", reason).yellow()
    );
}

pub fn print_predictions(division: &Division, matches: &[Match]) {
    println!("{}", format!("Predictions for {}", division.name).bold());

    for m in matches.iter().filter(|m| m.predicted) {
        println!(
            "  {:<16} {:>5} - {:<5}  red [{}] vs blue [{}]",
            display_name(m),
            m.predicted_red_score.to_string().red(),
            m.predicted_blue_score.to_string().blue(),
            alliance_numbers(&m.red),
            alliance_numbers(&m.blue),
        );
    }
}

pub fn print_validation(validation: &EventValidation) {
    for entry in &validation.divisions {
        println!("{:<20} {}", entry.division.name, format_report(&entry.report));
    }
    for division in &validation.skipped {
        println!("{:<20} {}", division.name, "skipped (no ratings)".yellow());
    }
    println!("{:<20} {}", "All divisions".bold(), format_report(&validation.aggregate));
}

pub fn print_sweep(sweep: &WeightSweep) {
    let header: Vec<String> = sweep.weights.iter().map(|w| format!("{:>6.2}", w)).collect();
    println!("{}", format!("opr\\dpr {}", header.join(" ")).bold());

    for (i, row) in sweep.accuracy.outer_iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|a| format!("{:>6.1}", a)).collect();
        println!("{:>7.2} {}", sweep.weights[i], cells.join(" "));
    }

    let (opr_weight, dpr_weight, accuracy) = sweep.best();
    println!(
        "{} opr {:.2}, dpr {:.2} -> {}",
        "Best:".bold(),
        opr_weight,
        dpr_weight,
        color_accuracy(accuracy)
    );
}

fn format_report(report: &ValidationReport) -> String {
    format!(
        "{}/{} correct ({}), {} predicted ties, {} actual ties",
        report.correct,
        report.total,
        color_accuracy(report.accuracy),
        report.predicted_ties,
        report.actual_ties
    )
}

fn color_accuracy(accuracy: f64) -> String {
    let text = format!("{:.1}%", accuracy);
    if accuracy >= GOOD_ACCURACY {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn display_name(m: &Match) -> String {
    if m.name.is_empty() {
        format!("{} {}", m.round.as_str(), m.number)
    } else {
        m.name.clone()
    }
}

fn alliance_numbers(teams: &[crate::domain::Team; 2]) -> String {
    teams
        .iter()
        .filter(|t| !t.is_none())
        .map(|t| t.number.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
