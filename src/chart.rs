use std::fmt::Write;

use anyhow::bail;

use crate::models::ClassAverage;

pub const TITLE: &str = "Average Bites Completed by Class";

const BAR: char = '█';
const SEGMENTS: [(&str, char); 3] = [("Newbie", '█'), ("Intro", '▓'), ("Regular", '░')];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    Horizontal,
    Stacked,
}

impl ChartStyle {
    fn headroom(self) -> f64 {
        match self {
            ChartStyle::Horizontal => 1.1,
            ChartStyle::Stacked => 1.2,
        }
    }
}

pub fn render(rows: &[ClassAverage], style: ChartStyle, width: usize) -> anyhow::Result<String> {
    if rows.is_empty() {
        bail!("no class averages to plot");
    }

    let label_width = rows.iter().map(|row| row.class_.chars().count()).max().unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|row| format_value(row.total_completed).len())
        .max()
        .unwrap_or(0);
    let bar_width = width.saturating_sub(label_width + value_width + 4).max(10);

    let max_total = rows.iter().map(|row| row.total_completed).fold(0.0, f64::max);
    let axis_max = if max_total > 0.0 {
        max_total * style.headroom()
    } else {
        1.0
    };

    let mut output = String::new();
    let _ = writeln!(output, "{TITLE}");
    let _ = writeln!(output);

    for row in rows {
        let bar = match style {
            ChartStyle::Horizontal => {
                BAR.to_string().repeat(scale(row.total_completed, axis_max, bar_width))
            }
            ChartStyle::Stacked => stacked_bar(row, axis_max, bar_width),
        };
        let _ = writeln!(
            output,
            "{:>label_width$} │{} {}",
            row.class_,
            bar,
            format_value(row.total_completed)
        );
    }

    let _ = writeln!(
        output,
        "{:>label_width$} └{}",
        "",
        "─".repeat(bar_width)
    );
    let _ = writeln!(
        output,
        "{:>label_width$}  0{:>bar_width$}",
        "",
        format_value(axis_max),
        bar_width = bar_width.saturating_sub(1)
    );

    if style == ChartStyle::Stacked {
        let legend: Vec<String> = SEGMENTS
            .iter()
            .map(|(label, glyph)| format!("{glyph} {label}"))
            .collect();
        let _ = writeln!(output);
        let _ = writeln!(output, "{}", legend.join("   "));
    }

    Ok(output)
}

fn stacked_bar(row: &ClassAverage, axis_max: f64, bar_width: usize) -> String {
    let values = [
        row.newbie_completed,
        row.intro_completed,
        row.regular_completed,
    ];
    let mut bar = String::new();
    let mut cumulative = 0.0;
    let mut drawn = 0usize;

    // Segment ends are scaled cumulatively so rounding never drifts the total.
    for ((_, glyph), value) in SEGMENTS.iter().zip(values) {
        cumulative += value;
        let end = scale(cumulative, axis_max, bar_width);
        bar.extend(std::iter::repeat(*glyph).take(end.saturating_sub(drawn)));
        drawn = drawn.max(end);
    }
    bar
}

fn scale(value: f64, axis_max: f64, bar_width: usize) -> usize {
    let cells = (value.max(0.0) / axis_max * bar_width as f64).round() as usize;
    cells.min(bar_width)
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_average(class_: &str, newbie: f64, intro: f64, regular: f64) -> ClassAverage {
        ClassAverage {
            class_: class_.to_string(),
            newbie_completed: newbie,
            intro_completed: intro,
            regular_completed: regular,
            total_completed: newbie + intro + regular,
        }
    }

    #[test]
    fn horizontal_chart_lists_every_class() {
        let rows = vec![
            class_average("period 2", 2.0, 8.0, 1.0),
            class_average("period 5", 1.0, 1.5, 0.0),
        ];

        let chart = render(&rows, ChartStyle::Horizontal, 75).unwrap();
        assert!(chart.starts_with(TITLE));
        assert!(chart.contains("period 2"));
        assert!(chart.contains("period 5"));
        assert!(chart.contains(" 11\n"));
        assert!(chart.contains(" 2.5\n"));
    }

    #[test]
    fn longest_bar_belongs_to_highest_total() {
        let rows = vec![
            class_average("low", 1.0, 0.0, 0.0),
            class_average("high", 10.0, 0.0, 0.0),
        ];

        let chart = render(&rows, ChartStyle::Horizontal, 60).unwrap();
        let bar_len = |label: &str| {
            chart
                .lines()
                .find(|line| line.trim_start().starts_with(label))
                .map(|line| line.chars().filter(|c| *c == BAR).count())
                .unwrap()
        };

        assert!(bar_len("high") > bar_len("low"));
    }

    #[test]
    fn stacked_chart_draws_each_category() {
        let rows = vec![class_average("period 2", 2.0, 8.0, 1.0)];

        let chart = render(&rows, ChartStyle::Stacked, 75).unwrap();
        let line = chart
            .lines()
            .find(|line| line.contains("period 2"))
            .unwrap();

        for (label, glyph) in SEGMENTS {
            assert!(line.contains(glyph), "missing {label} segment");
            assert!(chart.contains(label));
        }
    }

    #[test]
    fn bars_fit_inside_requested_width() {
        let rows = vec![class_average("a", 5.0, 5.0, 5.0)];
        let chart = render(&rows, ChartStyle::Stacked, 40).unwrap();

        for line in chart.lines() {
            assert!(line.chars().count() <= 40, "{line}");
        }
    }

    #[test]
    fn empty_rows_are_rejected() {
        let err = render(&[], ChartStyle::Horizontal, 75).unwrap_err();
        assert!(err.to_string().contains("no class averages"));
    }

    #[test]
    fn zero_totals_do_not_divide_by_zero() {
        let rows = vec![class_average("idle", 0.0, 0.0, 0.0)];
        let chart = render(&rows, ChartStyle::Horizontal, 75).unwrap();
        assert!(chart.contains("idle │ 0"));
    }
}
