use aha_config::ChannelStatus;
use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::Style;

use aha_server::PollSummary;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_channels(statuses: &[ChannelStatus]) {
    println!("{}", channel_table(statuses));
    let enabled = statuses.iter().filter(|s| s.enabled).count();
    println!("{} {enabled} of {} channels enabled", "Channels:".cyan(), statuses.len());
}

fn channel_table(statuses: &[ChannelStatus]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Channel", "Enabled", "Reason"]);
    for status in statuses {
        let enabled = if status.enabled { "yes" } else { "no" };
        builder.push_record([status.name, enabled, status.reason.as_str()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn summary_line(summary: &PollSummary) -> String {
    format!(
        "{} fetched, {} new, {} updated, {} unchanged, {} excluded, {} failed",
        summary.fetched,
        summary.new,
        summary.updated,
        summary.unchanged,
        summary.skipped_excluded,
        summary.failed
    )
}
