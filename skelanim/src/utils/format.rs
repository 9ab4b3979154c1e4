//! Formatting utilities

use humansize::{DECIMAL, format_size};
use skeletal_anim::glam::{Mat4, Vec3};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a duration in seconds
pub fn format_seconds(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0} ms", seconds * 1000.0)
    } else {
        format!("{seconds:.2} s")
    }
}

pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format a matrix as four row strings
pub fn format_matrix_rows(m: &Mat4) -> [String; 4] {
    [m.row(0), m.row(1), m.row(2), m.row(3)].map(|r| {
        format!(
            "[{:>9.4} {:>9.4} {:>9.4} {:>9.4}]",
            r.x, r.y, r.z, r.w
        )
    })
}
