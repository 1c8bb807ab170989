use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::DatasetStats;

const DATASET_VERSION: &str = "1.0";

static BADGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[!\[Dataset\]\(https://img\.shields\.io/badge/matches-\d+-orange\.svg\)\]")
        .expect("badge pattern compiles")
});
static TIME_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\| \*\*Time Period\*\* \| (.+?) – .+ \|").expect("time period pattern compiles")
});
static TOTAL_MATCHES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\| \*\*Total Matches\*\* \| [\d,]+ matches \|")
        .expect("total matches pattern compiles")
});
static LAST_UPDATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*Last Updated\*\*: \w+ \d{4}").expect("last updated pattern compiles")
});
static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*Last Updated: .+ \| Dataset Version: .+ \| Matches: [\d,]+\*")
        .expect("footer pattern compiles")
});

/// 12345 -> "12,345"
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Rewrite the dataset figures embedded in a README. Lines that do not match
/// any known pattern are left alone.
pub fn update_readme(text: &str, stats: &DatasetStats, today: NaiveDate) -> String {
    let month_year = today.format("%B %Y").to_string();
    let total = stats.total_matches;

    let text = BADGE.replace_all(
        text,
        format!("[![Dataset](https://img.shields.io/badge/matches-{}-orange.svg)]", total).as_str(),
    );

    let text = match stats.last_match {
        Some(last) => TIME_PERIOD
            .replace_all(&text, |caps: &Captures| {
                format!("| **Time Period** | {} – {} |", &caps[1], last)
            })
            .into_owned(),
        None => text.into_owned(),
    };

    let text = TOTAL_MATCHES.replace_all(
        &text,
        format!("| **Total Matches** | {} matches |", thousands(total)).as_str(),
    );
    let text = LAST_UPDATED.replace_all(&text, format!("**Last Updated**: {}", month_year).as_str());
    let text = FOOTER.replace_all(
        &text,
        format!(
            "*Last Updated: {} | Dataset Version: {} | Matches: {}*",
            month_year,
            DATASET_VERSION,
            thousands(total)
        )
        .as_str(),
    );
    text.into_owned()
}
