use console::Style;
use stoutline_core::config::AnalyzerConfig;
use stoutline_core::scoring::Feedback;

use crate::commands::analyze::Report;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    good: Style,
    warn: Style,
    bad: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            good: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            bad: Style::new().red().bold(),
        }
    }

    fn feedback(&self, feedback: Feedback) -> &Style {
        match feedback {
            Feedback::Perfect | Feedback::VeryClose => &self.good,
            Feedback::NotBad | Feedback::KeepAdjusting => &self.warn,
            Feedback::TryAgain => &self.bad,
        }
    }
}

pub fn print_analyze_summary(config: &AnalyzerConfig, files: usize) {
    let s = Styles::new();
    let det = &config.detection;

    println!();
    println!("  {}", s.title.apply_to("Stoutline"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(9)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Captures"),
        s.value.apply_to(files)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Band"),
        s.value.apply_to(format!(
            "{:.0}%-{:.0}% of width",
            config.band.start * 100.0,
            config.band.end * 100.0
        ))
    );
    println!();

    println!("  {}", s.header.apply_to("Detection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Strategy"),
        s.method.apply_to(det.strategy)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Level Scan"),
        s.method.apply_to(det.level_method)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rim Window"),
        s.value.apply_to(det.rim_window)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Base Window"),
        s.value.apply_to(det.base_window)
    );
    if det.split_rim {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Split Rim"),
            s.value.apply_to(if det.prefer_near_rim { "near" } else { "far" })
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Split Rim"),
            s.disabled.apply_to("disabled")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Fallback"),
        s.value.apply_to(det.fallback)
    );
    println!();

    println!("  {}", s.header.apply_to("Scoring"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Target"),
        s.value.apply_to(format!("{:.0}%", config.scoring.target_ratio * 100.0))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(config.scoring.method)
    );
    println!();
}

pub fn print_report(report: &Report) {
    let s = Styles::new();
    let g = &report.geometry;
    let score = &report.score;

    println!(
        "  {} {}",
        s.path.apply_to(report.file.display()),
        s.label.apply_to(format!("({}x{})", report.width, report.height))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rim"),
        s.value.apply_to(format!("row {}", g.rim_top))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Level"),
        s.value.apply_to(format!("row {}", g.liquid_level))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Base"),
        s.value.apply_to(format!("row {}", g.base_bottom))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Fill"),
        s.value.apply_to(format!(
            "{:.1}% (target {:.0}%, row {})",
            report.fill_ratio * 100.0,
            score.target_ratio * 100.0,
            score.target_row
        ))
    );

    let mut verdict = score.feedback.to_string();
    if let Some(hint) = score.hint {
        verdict.push_str(&format!(", {hint}"));
    }
    println!(
        "    {:<12}{} {}",
        s.label.apply_to("Score"),
        s.value.apply_to(format!("{:.2}", score.score)),
        s.feedback(score.feedback).apply_to(verdict)
    );

    if report.low_confidence {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Confidence"),
            s.warn.apply_to("low")
        );
    }
    for note in &report.notes {
        println!("    {:<12}{}", s.label.apply_to("Note"), s.disabled.apply_to(note));
    }

    if let Some(ref overlay) = report.overlay {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Overlay"),
            s.path.apply_to(overlay.display())
        );
        if !report.labels.is_empty() {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Labels"),
                s.value.apply_to(report.labels.join(" | "))
            );
        }
    }
    println!();
}
