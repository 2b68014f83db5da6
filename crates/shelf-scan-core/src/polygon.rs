use nalgebra::Point2;

/// Barycentric containment test. Points on an edge count as inside.
///
/// Degenerate (zero-area) triangles contain nothing.
#[inline]
pub fn point_in_triangle(
    p: &Point2<f32>,
    p1: &Point2<f32>,
    p2: &Point2<f32>,
    p3: &Point2<f32>,
) -> bool {
    let denom = (p2.y - p3.y) * (p1.x - p3.x) + (p3.x - p2.x) * (p1.y - p3.y);
    if denom == 0.0 {
        return false;
    }
    let a = ((p2.y - p3.y) * (p.x - p3.x) + (p3.x - p2.x) * (p.y - p3.y)) / denom;
    let b = ((p3.y - p1.y) * (p.x - p3.x) + (p1.x - p3.x) * (p.y - p3.y)) / denom;
    let c = 1.0 - a - b;

    (0.0..=1.0).contains(&a) && (0.0..=1.0).contains(&b) && (0.0..=1.0).contains(&c)
}

/// Containment in a quadrilateral given in cyclic corner order, tested as the
/// two triangles `(0, 1, 2)` and `(0, 2, 3)`.
#[inline]
pub fn point_in_quad(p: &Point2<f32>, corners: &[Point2<f32>; 4]) -> bool {
    point_in_triangle(p, &corners[0], &corners[1], &corners[2])
        || point_in_triangle(p, &corners[0], &corners[2], &corners[3])
}
