use super::detector::Detection;

/// Intersection over union of the square windows of two detections.
pub fn iou(a: &Detection, b: &Detection) -> f64 {
    let (r1, c1, s1) = (a.row as f64, a.col as f64, a.scale as f64);
    let (r2, c2, s2) = (b.row as f64, b.col as f64, b.scale as f64);

    let over_rows = (f64::min(r1 + s1 / 2.0, r2 + s2 / 2.0)
        - f64::max(r1 - s1 / 2.0, r2 - s2 / 2.0))
    .max(0.0);
    let over_cols = (f64::min(c1 + s1 / 2.0, c2 + s2 / 2.0)
        - f64::max(c1 - s1 / 2.0, c2 - s2 / 2.0))
    .max(0.0);

    let intersection = over_rows * over_cols;
    let union = s1 * s1 + s2 * s2 - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Collapse overlapping detections into one representative each.
///
/// A greedy pass takes the first unassigned detection as a seed and absorbs
/// every unassigned detection whose IoU with the seed exceeds `iou_threshold`.
/// The representative sits at the mean center and mean scale of its members
/// and carries the sum of their scores. Representatives keep the order of
/// their seeds.
///
/// Passes repeat until one merges nothing, so the result contains no pair
/// above the threshold and clustering it again returns it unchanged.
pub fn cluster_detections(detections: &[Detection], iou_threshold: f64) -> Vec<Detection> {
    let mut current = merge_pass(detections, iou_threshold);
    loop {
        let next = merge_pass(&current, iou_threshold);
        if next.len() == current.len() {
            return next;
        }
        current = next;
    }
}

fn merge_pass(detections: &[Detection], iou_threshold: f64) -> Vec<Detection> {
    let mut assigned = vec![false; detections.len()];
    let mut clustered = Vec::new();

    for (i, seed) in detections.iter().enumerate() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;

        let (mut rows, mut cols, mut scales) = (seed.row as f64, seed.col as f64, seed.scale as f64);
        let mut score = seed.score;
        let mut members = 1usize;

        for j in (i + 1)..detections.len() {
            if assigned[j] || iou(seed, &detections[j]) <= iou_threshold {
                continue;
            }
            assigned[j] = true;

            let other = &detections[j];
            rows += other.row as f64;
            cols += other.col as f64;
            scales += other.scale as f64;
            score += other.score;
            members += 1;
        }

        let n = members as f64;
        clustered.push(Detection::new(
            (rows / n).round() as i32,
            (cols / n).round() as i32,
            (scales / n) as f32,
            score,
        ));
    }

    clustered
}
