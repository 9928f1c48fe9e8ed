//! # Attendance Reports
//!
//! CSV report generation for a class: a detail section with every
//! attendance record, overall summary statistics, and a per-student
//! summary computed over the enrollment list. Rendering is pure; the
//! export function wires it to the store snapshots and the filesystem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rollcall_core::errors::{AppError, AppResult};
use rollcall_core::models::attendance::{AttendanceRecord, AttendanceStats, AttendanceStatus};
use rollcall_core::models::class::Class;
use rollcall_core::models::enrollment::Enrollment;

use crate::actions;
use crate::store::AppStore;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Renders the attendance report for one class as CSV text.
///
/// Records are listed most recent day first, students alphabetical within a
/// day. The per-student summary follows the enrollment list, so a student
/// with no records still appears with zero totals.
pub fn attendance_report_csv(
    class: &Class,
    enrollments: &[Enrollment],
    records: &[AttendanceRecord],
    generated_at: DateTime<Utc>,
) -> String {
    let mut rows: Vec<Vec<String>> = Vec::new();

    rows.push(vec![format!("Class: {}", class.name)]);
    rows.push(vec![format!("Teacher: {}", class.teacher_name)]);
    rows.push(vec![format!(
        "Report Generated: {}",
        generated_at.format(TIMESTAMP_FORMAT)
    )]);
    rows.push(Vec::new());

    rows.push(vec![
        "Student Name".to_string(),
        "Student ID".to_string(),
        "Date".to_string(),
        "Status".to_string(),
        "Marked At".to_string(),
    ]);

    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.student_name.cmp(&b.student_name))
    });
    for record in sorted {
        rows.push(vec![
            record.student_name.clone(),
            record.student_id.clone(),
            record.date.to_string(),
            record.status.as_str().to_uppercase(),
            record.marked_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }

    let present = records
        .iter()
        .filter(|record| record.status == AttendanceStatus::Present)
        .count();
    let absent = records
        .iter()
        .filter(|record| record.status == AttendanceStatus::Absent)
        .count();

    rows.push(Vec::new());
    rows.push(vec!["SUMMARY STATISTICS".to_string()]);
    rows.push(vec![
        "Total Students Enrolled".to_string(),
        enrollments.len().to_string(),
    ]);
    rows.push(vec![
        "Total Attendance Records".to_string(),
        records.len().to_string(),
    ]);
    rows.push(vec!["Total Present".to_string(), present.to_string()]);
    rows.push(vec!["Total Absent".to_string(), absent.to_string()]);

    rows.push(Vec::new());
    rows.push(vec!["STUDENT-WISE SUMMARY".to_string()]);
    rows.push(vec![
        "Student Name".to_string(),
        "Total Classes".to_string(),
        "Present".to_string(),
        "Absent".to_string(),
        "Attendance %".to_string(),
    ]);
    for enrollment in enrollments {
        let stats = AttendanceStats::for_student(records, &enrollment.student_id);
        rows.push(vec![
            enrollment.student_name.clone(),
            stats.total().to_string(),
            stats.present.to_string(),
            stats.absent.to_string(),
            format!("{}%", stats.percentage()),
        ]);
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .map(|cell| csv_field(cell))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Report filename for a class and day, e.g.
/// `attendance_algebra_i_2024-01-15.csv`.
pub fn report_filename(class_name: &str, date: NaiveDate) -> String {
    let sanitized: String = class_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("attendance_{}_{}.csv", sanitized, date)
}

/// Renders and writes today's report for a class the signed-in teacher
/// owns, from the current snapshots. Returns the path of the written file.
pub async fn export_class_report(
    app: &AppStore,
    class_id: &str,
    dir: &Path,
) -> AppResult<PathBuf> {
    let class = actions::require_owning_teacher(app, class_id)?;
    let enrollments = app.class_enrollments(class_id);
    let records = app.class_attendance(class_id);

    let now = Utc::now();
    let csv = attendance_report_csv(&class, &enrollments, &records, now);
    let path = dir.join(report_filename(&class.name, now.date_naive()));

    if let Err(err) = tokio::fs::write(&path, &csv).await {
        tracing::error!("Error generating CSV: {}", err);
        return Err(AppError::Backend(err.into()));
    }
    tracing::info!("Wrote attendance report to {}", path.display());

    Ok(path)
}

fn csv_field(value: &str) -> String {
    // Quote when the value contains a comma, quote or newline; quotes
    // inside are doubled.
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
