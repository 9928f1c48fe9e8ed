use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attendance mark. A student has at most one record per class per day;
/// re-marking the same day overwrites the status in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub class_id: String,
    pub student_id: String,
    pub student_name: String,
    /// Calendar day the mark applies to, in UTC.
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_at: DateTime<Utc>,
}

/// Per-student attendance tally over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceStats {
    pub present: usize,
    pub absent: usize,
}

impl AttendanceStats {
    pub fn for_student(records: &[AttendanceRecord], student_id: &str) -> Self {
        let mut stats = AttendanceStats::default();
        for record in records.iter().filter(|r| r.student_id == student_id) {
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.present + self.absent
    }

    /// Attendance rate as a whole percentage, rounded half up. Zero when the
    /// student has no records at all.
    pub fn percentage(&self) -> u32 {
        if self.total() == 0 {
            return 0;
        }
        ((self.present as f64 / self.total() as f64) * 100.0).round() as u32
    }
}
