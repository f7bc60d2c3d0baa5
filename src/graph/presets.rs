//! Ready-made graphs used by the grade-8 worksheets.

use super::spec::GraphSpec;

const MAX_SLOPE_TICKS: f64 = 20.0;

/// Distance from home in Jerusalem over six hours: leave, stop, go on,
/// come back a little, stop again, return home.
pub fn motion_graph() -> GraphSpec {
    let points = vec![
        (0.0, 0.0),
        (1.0, 4.0),
        (2.0, 4.0),
        (3.0, 8.0),
        (4.0, 6.0),
        (5.0, 6.0),
        (6.0, 0.0),
    ];
    GraphSpec {
        labels: (0..points.len()).map(point_label).collect(),
        points,
        title: "גרף תנועה: מרחק מהבית בירושלים לאורך זמן".to_string(),
        x_label: "זמן (שעות)".to_string(),
        y_label: "מרחק מהבית בירושלים (ק\"מ)".to_string(),
        x_range: (0.0, 6.0),
        y_range: (0.0, 12.0),
        x_ticks: Some((0..=6).map(f64::from).collect()),
        y_ticks: Some((0..=10).step_by(2).map(f64::from).collect()),
        filename: "jerusalem_motion_graph.png".to_string(),
    }
}

/// `y = slope·x + intercept` sampled at `x = 0, 1, …, x_max`.
pub fn linear_function(slope: i32, intercept: i32, x_max: u32) -> GraphSpec {
    let points: Vec<(f64, f64)> = (0..=x_max)
        .map(|x| {
            let x = f64::from(x);
            (x, f64::from(slope) * x + f64::from(intercept))
        })
        .collect();
    let y_lo = points.iter().map(|p| p.1).fold(0.0_f64, f64::min);
    let y_hi = points.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    let y_hi = if y_hi > y_lo { y_hi } else { y_lo + 1.0 };

    // Ticks at multiples of the slope while they fit; otherwise automatic.
    let step = f64::from(slope.unsigned_abs().max(1));
    let y_ticks = ((y_hi - y_lo) / step <= MAX_SLOPE_TICKS).then(|| {
        let mut ticks = Vec::new();
        let mut t = (y_lo / step).ceil() * step;
        while t <= y_hi {
            ticks.push(t);
            t += step;
        }
        ticks
    });

    GraphSpec {
        labels: (0..points.len()).map(point_label).collect(),
        points,
        title: format!("גרף פונקציה קווית: {}", equation(slope, intercept)),
        x_label: "x".to_string(),
        y_label: "y".to_string(),
        x_range: (0.0, f64::from(x_max.max(1))),
        y_range: (y_lo, y_hi),
        x_ticks: (f64::from(x_max) <= MAX_SLOPE_TICKS)
            .then(|| (0..=x_max.max(1)).map(f64::from).collect()),
        y_ticks,
        filename: "linear_function_graph.png".to_string(),
    }
}

/// The slope-3, intercept-3 line from the slope worksheet.
pub fn default_linear_function() -> GraphSpec {
    linear_function(3, 3, 4)
}

fn equation(slope: i32, intercept: i32) -> String {
    match intercept {
        0 => format!("y = {slope}x"),
        b if b < 0 => format!("y = {slope}x - {}", b.unsigned_abs()),
        b => format!("y = {slope}x + {b}"),
    }
}

/// `A`, `B`, … `Z`, then `P27`, `P28`, …
fn point_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'A' + i).to_string(),
        _ => format!("P{}", index + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_graph_matches_worksheet() {
        let g = motion_graph();
        assert!(g.validate().is_ok());
        assert_eq!(g.labels, ["A", "B", "C", "D", "E", "F", "G"]);
        assert_eq!(g.points[3], (3.0, 8.0));
        assert_eq!(g.y_ticks.as_deref(), Some(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0][..]));
        assert_eq!(g.filename, "jerusalem_motion_graph.png");
    }

    #[test]
    fn default_linear_function_is_3x_plus_3() {
        let g = default_linear_function();
        assert!(g.validate().is_ok());
        assert_eq!(
            g.points,
            vec![(0.0, 3.0), (1.0, 6.0), (2.0, 9.0), (3.0, 12.0), (4.0, 15.0)]
        );
        assert_eq!(g.y_range, (0.0, 15.0));
        assert_eq!(
            g.y_ticks.as_deref(),
            Some(&[0.0, 3.0, 6.0, 9.0, 12.0, 15.0][..])
        );
        assert!(g.title.ends_with("y = 3x + 3"));
        // Padded limits match the printed worksheet: x ∈ [-0.5, 4.5], y ∈ [-1, 16].
        assert_eq!(g.limits(), (-0.5, 4.5, -1.0, 16.0));
    }

    #[test]
    fn negative_slope_ranges_below_zero() {
        let g = linear_function(-2, 1, 4);
        assert!(g.validate().is_ok());
        assert_eq!(g.y_range, (-7.0, 1.0));
        assert_eq!(g.y_ticks.as_deref(), Some(&[-6.0, -4.0, -2.0, 0.0][..]));
        assert!(g.title.ends_with("y = -2x + 1"));
    }

    #[test]
    fn wide_lines_fall_back_to_automatic_ticks() {
        let g = linear_function(1, 2_000_000_000, 4);
        assert!(g.validate().is_ok());
        assert_eq!(g.y_ticks, None);
        assert!(g.x_ticks.is_some());

        let g = linear_function(1, 0, 1000);
        assert_eq!(g.points.len(), 1001);
        assert_eq!(g.x_ticks, None);
        assert_eq!(g.y_ticks, None);
    }

    #[test]
    fn labels_continue_past_z() {
        assert_eq!(point_label(0), "A");
        assert_eq!(point_label(25), "Z");
        assert_eq!(point_label(26), "P27");
    }
}
