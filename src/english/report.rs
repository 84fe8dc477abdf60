//! Plain-text daily report

use chrono::NaiveDate;

use super::log::ErrorLog;

/// Render the report for one day.
///
/// Categories are listed in the order they first appeared that day.
pub fn daily_report(log: &ErrorLog, date: NaiveDate) -> String {
    let entries = log.entries_on(date);
    if entries.is_empty() {
        return format!("No errors recorded for {}", date);
    }

    let mut categories: Vec<(&str, usize)> = Vec::new();
    for entry in entries {
        match categories.iter_mut().find(|(name, _)| *name == entry.category) {
            Some((_, count)) => *count += 1,
            None => categories.push((entry.category.as_str(), 1)),
        }
    }

    let mut report = String::with_capacity(256 + entries.len() * 128);
    report.push_str(&format!("English Learning Report - {}\n", date));
    report.push_str(&"=".repeat(40));
    report.push('\n');
    report.push_str(&format!("Total errors today: {}\n\n", entries.len()));
    report.push_str("Error breakdown by category:\n");
    for (category, count) in &categories {
        report.push_str(&format!("- {}: {} occurrence(s)\n", category, count));
    }

    report.push_str("\nDetailed errors:\n");
    for (i, entry) in entries.iter().enumerate() {
        report.push_str(&format!("\n{}. Original: {}\n", i + 1, entry.original_text));
        report.push_str(&format!("   Corrected: {}\n", entry.corrected_text));
        report.push_str(&format!("   Explanation: {}\n", entry.explanation));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::english::log::ErrorEntry;

    fn entry(day: u32, category: &str, original: &str, corrected: &str) -> ErrorEntry {
        ErrorEntry {
            timestamp: NaiveDate::from_ymd_opt(2026, 5, day).unwrap().and_hms_opt(12, 0, 0).unwrap(),
            original_text: original.to_string(),
            corrected_text: corrected.to_string(),
            category: category.to_string(),
            explanation: format!("fix {}", category),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_no_entries() {
        let log = ErrorLog::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        let report = daily_report(&log, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        assert_eq!(report, "No errors recorded for 2026-05-04");
    }

    #[test]
    fn test_exact_layout() {
        let mut log = ErrorLog::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
        log.record(entry(4, "spelling", "recieve", "receive"));
        log.record(entry(4, "grammar", "he don't", "he doesn't"));
        log.record(entry(4, "spelling", "definately", "definitely"));
        log.record(entry(5, "grammar", "other day", "other day"));

        let report = daily_report(&log, NaiveDate::from_ymd_opt(2026, 5, 4).unwrap());
        let expected = "\
English Learning Report - 2026-05-04
========================================
Total errors today: 3

Error breakdown by category:
- spelling: 2 occurrence(s)
- grammar: 1 occurrence(s)

Detailed errors:

1. Original: recieve
   Corrected: receive
   Explanation: fix spelling

2. Original: he don't
   Corrected: he doesn't
   Explanation: fix grammar

3. Original: definately
   Corrected: definitely
   Explanation: fix spelling
";
        assert_eq!(report, expected);
    }
}
