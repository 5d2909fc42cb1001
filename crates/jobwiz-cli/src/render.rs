//! Console rendering of decoded worker records.
//!
//! Tables pad columns but never truncate values -- an over-length title
//! widens its row rather than losing characters. Worker text is always
//! printed as data, never as a format template.

use jobwiz_core::{Candidate, FieldAnomaly, JobDetail, JobSummary, Projection};

fn open_label(is_open: bool) -> &'static str {
    if is_open { "open" } else { "closed" }
}

/// Print a job summary table.
pub fn print_summaries(projection: &Projection<JobSummary>) {
    if projection.records.is_empty() {
        println!("No jobs found.");
    } else {
        println!(
            "{:<8} {:<32} {:<6} {:<12}",
            "ID", "TITLE", "OPEN", "POSTED"
        );
        println!("{}", "-".repeat(60));
        for job in &projection.records {
            println!(
                "{:<8} {:<32} {:<6} {:<12}",
                job.job_id,
                job.title,
                open_label(job.is_open),
                job.date_posted
            );
        }
        println!("{} job(s)", projection.records.len());
    }
    print_anomalies(&projection.anomalies);
}

/// Print the full detail of one job.
pub fn print_detail(detail: &JobDetail, anomalies: &[FieldAnomaly]) {
    println!("Job {} ({})", detail.job_id, open_label(detail.is_open));
    println!("  Title:          {}", detail.title);
    println!("  Creator:        {}", detail.creator);
    println!("  Posted:         {}", detail.date_posted);
    println!("  Education:      {}", detail.min_education);
    println!("  Experience:     {} year(s)", detail.min_experience);
    println!("  Salary:         {}", detail.salary);
    println!("  Description:    {}", detail.description);
    print_anomalies(anomalies);
}

/// Print an applicant table.
pub fn print_candidates(projection: &Projection<Candidate>) {
    if projection.records.is_empty() {
        println!("No applicants found.");
    } else {
        println!(
            "{:<28} {:<24} {:<12} {:<12}",
            "EMAIL", "NAME", "PHONE", "APPLIED"
        );
        println!("{}", "-".repeat(78));
        for candidate in &projection.records {
            println!(
                "{:<28} {:<24} {:<12} {:<12}",
                candidate.email, candidate.name, candidate.phone, candidate.applied_date
            );
        }
        println!("{} applicant(s)", projection.records.len());
    }
    print_anomalies(&projection.anomalies);
}

/// Print per-field diagnostics on stderr, one note per finding.
pub fn print_anomalies(anomalies: &[FieldAnomaly]) {
    for anomaly in anomalies {
        eprintln!("note: {anomaly}");
    }
}
