use std::fmt::Write as _;
use std::io::Write;

use colored::*;
use serde::Serialize;

use crate::errors::*;
use crate::sorter::Classification;

/// Per-category pair counts for one run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SortCounts {
    pub total: usize,
    pub unreadable: usize,
    pub matched: usize,
    pub partial: usize,
    pub absent: usize,
}

impl SortCounts {
    pub fn record(&mut self, class: Classification) {
        self.total += 1;

        match class {
            Classification::Unreadable => self.unreadable += 1,
            Classification::Match => self.matched += 1,
            Classification::Partial => self.partial += 1,
            Classification::Absent => self.absent += 1,
        }
    }

    pub fn usable(&self) -> usize {
        self.total - self.unreadable
    }

    /// Console report with right-aligned counts and percentages.
    pub fn report(&self) -> String {
        let usable = self.usable();
        let counts = [
            self.total,
            usable,
            self.unreadable,
            self.matched,
            self.partial,
            self.absent,
        ]
        .map(|c| c.to_string());
        let width = counts.iter().map(|c| c.len()).max().unwrap_or(0);
        let [total, usable_s, unreadable, matched, partial, absent] =
            counts.map(|c| format!("{c:>width$}"));

        let of_total = |n| percentage(n, self.total);
        let of_usable = |n| percentage(n, usable);

        let mut res = String::new();
        // writing into a String cannot fail
        let _ = writeln!(res, "\n{}", "Sorting metrics".bold());
        let _ = writeln!(res, "\nTotal Pairs:       {total}");
        let _ = writeln!(res, "\nUsable Pairs:      {usable_s} ( {}% )", of_total(usable));
        let _ = writeln!(res, "Unreadable Pairs:  {unreadable} ( {}% )", of_total(self.unreadable));
        let _ = writeln!(
            res,
            "\nTotal Matches:     {matched} ( {}% of usable, {}% of total)",
            of_usable(self.matched),
            of_total(self.matched)
        );
        let _ = writeln!(
            res,
            "Total Partials:    {partial} ( {}% of usable, {}% of total)",
            of_usable(self.partial),
            of_total(self.partial)
        );
        let _ = writeln!(
            res,
            "Total Absents:     {absent} ( {}% of usable, {}% of total)",
            of_usable(self.absent),
            of_total(self.absent)
        );
        res
    }

    pub fn write_yaml(&self, writer: impl Write) -> Result<()> {
        Ok(serde_yaml::to_writer(writer, self)?)
    }
}

/// Percentage with two decimals, truncated rather than rounded, padded to six columns.
fn percentage(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        return format!("{:>6.2}", 0.0);
    }

    let hundredths = (numerator as u128) * 10_000 / (denominator as u128);
    format!("{:>3}.{:02}", hundredths / 100, hundredths % 100)
}
