//! Shared geometry calculations for annotation rendering

/// Arrow geometry constants
pub mod arrow {
    /// Arrowhead length in pixels
    pub const HEAD_LENGTH: f32 = 12.0;
    /// Arrowhead back-edge angle from the shaft in radians (30 degrees)
    pub const HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

    /// Back corners of the filled arrowhead triangle.
    ///
    /// Both are the reverse direction vector rotated by +/- the head angle,
    /// scaled to the head length from the arrow tip. Returns `None` for a
    /// zero-length arrow.
    pub fn head_points(
        start_x: f32,
        start_y: f32,
        end_x: f32,
        end_y: f32,
    ) -> Option<((f32, f32), (f32, f32))> {
        let dx = end_x - start_x;
        let dy = end_y - start_y;
        let length = (dx * dx + dy * dy).sqrt();
        if length == 0.0 {
            return None;
        }
        let angle = dy.atan2(dx);

        let back1 = (
            end_x - HEAD_LENGTH * (angle - HEAD_ANGLE).cos(),
            end_y - HEAD_LENGTH * (angle - HEAD_ANGLE).sin(),
        );
        let back2 = (
            end_x - HEAD_LENGTH * (angle + HEAD_ANGLE).cos(),
            end_y - HEAD_LENGTH * (angle + HEAD_ANGLE).sin(),
        );
        Some((back1, back2))
    }
}

#[cfg(test)]
mod tests {
    use super::arrow;

    #[test]
    fn head_points_sit_behind_the_tip() {
        let ((x1, y1), (x2, y2)) = arrow::head_points(0.0, 0.0, 100.0, 0.0).unwrap();
        // Both corners are head-length behind the tip along the shaft axis
        assert!((x1 - (100.0 - arrow::HEAD_LENGTH * arrow::HEAD_ANGLE.cos())).abs() < 1e-4);
        assert!((x2 - x1).abs() < 1e-4);
        // Symmetric about the shaft
        assert!((y1 + y2).abs() < 1e-4);
        assert!(y1 != y2);
    }

    #[test]
    fn zero_length_arrow_has_no_head() {
        assert!(arrow::head_points(5.0, 5.0, 5.0, 5.0).is_none());
    }
}
