//! Treemap layout.
//!
//! Squarified rectangle subdivision (Bruls, Huizing & van Wijk) over the
//! two-level hierarchy the grouping engine produces: a root covering the
//! viewport, one node per group, one leaf per record. Siblings are sorted
//! by descending size before subdivision, since the algorithm uses input
//! order as a tie-break for visual stability.

use serde::{Deserialize, Serialize};

use crate::models::Record;
use crate::services::color::ColorResult;
use crate::services::grouping::{record_weight, Group, SizeField};

/// Default gap between sibling rectangles, in pixels.
pub const DEFAULT_PADDING: f64 = 3.0;

/// Leaf name candidates, checked in order.
const NAME_FIELDS: &[&str] = &["name", "title", "label"];
const ID_FIELDS: &[&str] = &["id", "key", "identifier"];

/// Viewport and spacing parameters for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    /// Fixed pixel padding subtracted between sibling rectangles.
    pub padding: f64,
    /// Round coordinates to integer pixel boundaries.
    pub round: bool,
}

impl LayoutOptions {
    pub fn new(width: f64, height: f64) -> Self {
        LayoutOptions {
            width,
            height,
            padding: DEFAULT_PADDING,
            round: true,
        }
    }
}

/// One positioned node of the laid-out hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapNode {
    pub name: String,
    /// Summed size of the subtree (the record's own weight at leaves).
    pub value: f64,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreemapNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorResult>,
}

impl TreemapNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Visit every record-bearing leaf mutably, depth first.
    pub fn for_each_leaf_mut<F: FnMut(&mut TreemapNode)>(&mut self, f: &mut F) {
        if self.children.is_empty() {
            if self.record.is_some() {
                f(self);
            }
            return;
        }
        for child in &mut self.children {
            child.for_each_leaf_mut(f);
        }
    }
}

/// Display label for one record cell: a name-like field first, an id-like
/// field second.
pub fn display_label(record: &Record) -> String {
    for field in NAME_FIELDS.iter().chain(ID_FIELDS) {
        if let Some(value) = record.get(field) {
            if !value.is_null() {
                return value.to_string();
            }
        }
    }
    "Unknown".to_string()
}

/// Lay out grouped records inside the viewport.
///
/// The root rectangle equals the viewport; group rectangles tile it with
/// areas proportional to their summed weights; member rectangles tile each
/// group the same way. Zero-weight subtrees collapse to zero-area
/// rectangles rather than failing.
pub fn compute_layout(groups: Vec<Group>, size: &SizeField, opts: &LayoutOptions) -> TreemapNode {
    let mut weighted: Vec<(Group, Vec<f64>, f64)> = groups
        .into_iter()
        .map(|group| {
            let weights: Vec<f64> = group
                .members
                .iter()
                .map(|r| record_weight(r, size))
                .collect();
            let total = weights.iter().sum();
            (group, weights, total)
        })
        .collect();
    // Descending by summed size; stable, so ties keep first-seen order.
    weighted.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));

    let total: f64 = weighted.iter().map(|(_, _, t)| t).sum();
    let root_rect = Rect {
        x: 0.0,
        y: 0.0,
        w: opts.width,
        h: opts.height,
    };

    let group_rects = subdivide(
        &weighted.iter().map(|(_, _, t)| *t).collect::<Vec<f64>>(),
        total,
        root_rect,
    );

    let children = weighted
        .into_iter()
        .zip(group_rects)
        .map(|((group, weights, group_total), rect)| {
            let rect = finish_rect(rect, opts);
            layout_group(group, weights, group_total, rect, opts)
        })
        .collect();

    TreemapNode {
        name: "root".to_string(),
        value: total,
        x0: root_rect.x,
        y0: root_rect.y,
        x1: root_rect.x + root_rect.w,
        y1: root_rect.y + root_rect.h,
        children,
        record: None,
        color: None,
    }
}

fn layout_group(
    group: Group,
    weights: Vec<f64>,
    total: f64,
    rect: Rect,
    opts: &LayoutOptions,
) -> TreemapNode {
    let mut members: Vec<(Record, f64)> = group.members.into_iter().zip(weights).collect();
    members.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let member_rects = subdivide(
        &members.iter().map(|(_, w)| *w).collect::<Vec<f64>>(),
        total,
        rect,
    );

    let children = members
        .into_iter()
        .zip(member_rects)
        .map(|((record, weight), leaf)| {
            let leaf = finish_rect(leaf, opts);
            TreemapNode {
                name: display_label(&record),
                value: weight,
                x0: leaf.x,
                y0: leaf.y,
                x1: leaf.x + leaf.w,
                y1: leaf.y + leaf.h,
                children: Vec::new(),
                record: Some(record),
                color: None,
            }
        })
        .collect();

    TreemapNode {
        name: group.name,
        value: total,
        x0: rect.x,
        y0: rect.y,
        x1: rect.x + rect.w,
        y1: rect.y + rect.h,
        children,
        record: None,
        color: None,
    }
}

/// Scale weights to the rectangle's area and squarify. A non-positive
/// weight total collapses every child at the rectangle's origin.
fn subdivide(weights: &[f64], total: f64, rect: Rect) -> Vec<Rect> {
    if weights.is_empty() {
        return Vec::new();
    }
    if total <= 0.0 || rect.area() <= 0.0 {
        return weights.iter().map(|_| rect.collapsed()).collect();
    }
    let scale = rect.area() / total;
    let areas: Vec<f64> = weights.iter().map(|w| w.max(0.0) * scale).collect();
    squarify(&areas, rect)
}

/// Half-padding inset plus optional integer rounding, applied to every
/// non-root rectangle. Insetting both siblings by half the padding leaves
/// the full padding between them.
fn finish_rect(rect: Rect, opts: &LayoutOptions) -> Rect {
    let mut rect = rect.inset(opts.padding / 2.0);
    if opts.round {
        rect = rect.rounded();
    }
    rect
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl Rect {
    fn area(&self) -> f64 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    fn collapsed(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: 0.0,
            h: 0.0,
        }
    }

    fn inset(&self, pad: f64) -> Rect {
        if pad <= 0.0 {
            return *self;
        }
        Rect {
            x: self.x + pad,
            y: self.y + pad,
            w: (self.w - 2.0 * pad).max(0.0),
            h: (self.h - 2.0 * pad).max(0.0),
        }
    }

    fn rounded(&self) -> Rect {
        let x1 = (self.x + self.w).round();
        let y1 = (self.y + self.h).round();
        let x = self.x.round();
        let y = self.y.round();
        Rect {
            x,
            y,
            w: (x1 - x).max(0.0),
            h: (y1 - y).max(0.0),
        }
    }
}

/// Squarified subdivision: greedily grow a row while the worst aspect
/// ratio improves, then lay the row along the short side of the remaining
/// rectangle. Emits one rectangle per input area, in input order;
/// non-positive areas collapse at the rectangle origin.
fn squarify(areas: &[f64], rect: Rect) -> Vec<Rect> {
    let mut out: Vec<Rect> = areas.iter().map(|_| rect.collapsed()).collect();
    let positive: Vec<(usize, f64)> = areas
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, a)| *a > 0.0)
        .collect();
    if positive.is_empty() {
        return out;
    }

    let mut x = rect.x;
    let mut y = rect.y;
    let mut w = rect.w;
    let mut h = rect.h;

    let mut idx = 0usize;
    let mut row_start = 0usize;
    let mut row_sum = 0.0;
    let mut row_min = f64::INFINITY;
    let mut row_max = 0.0;

    while idx < positive.len() {
        if w <= 1e-9 || h <= 1e-9 {
            break;
        }

        let area = positive[idx].1;
        let side = w.min(h);
        let current = if row_sum > 0.0 {
            worst_aspect_ratio(row_min, row_max, row_sum, side)
        } else {
            f64::INFINITY
        };
        let next_sum = row_sum + area;
        let next_min = row_min.min(area);
        let next_max = row_max.max(area);
        let next = worst_aspect_ratio(next_min, next_max, next_sum, side);

        // Grow the row while the aspect ratio improves (or the row is empty).
        if row_sum <= 0.0 || next <= current {
            row_sum = next_sum;
            row_min = next_min;
            row_max = next_max;
            idx += 1;
            continue;
        }

        layout_row(
            &positive[row_start..idx],
            row_sum,
            &mut x,
            &mut y,
            &mut w,
            &mut h,
            &mut out,
        );
        row_start = idx;
        row_sum = 0.0;
        row_min = f64::INFINITY;
        row_max = 0.0;
    }

    if row_sum > 0.0 && row_start < idx {
        layout_row(
            &positive[row_start..idx],
            row_sum,
            &mut x,
            &mut y,
            &mut w,
            &mut h,
            &mut out,
        );
    }

    out
}

/// Lay one row of cells along the short side of the remaining rectangle,
/// then shrink the rectangle past the row. The final cell of a row absorbs
/// accumulated floating point error.
#[allow(clippy::too_many_arguments)]
fn layout_row(
    row: &[(usize, f64)],
    row_sum: f64,
    x: &mut f64,
    y: &mut f64,
    w: &mut f64,
    h: &mut f64,
    out: &mut [Rect],
) {
    if row.is_empty() || row_sum <= 0.0 || *w <= 1e-9 || *h <= 1e-9 {
        return;
    }

    let horizontal = *w <= *h;
    let short = if horizontal { *w } else { *h };
    let thickness = row_sum / short;
    if !thickness.is_finite() || thickness <= 0.0 {
        return;
    }

    let mut offset = 0.0;
    for (i, &(slot, area)) in row.iter().enumerate() {
        let mut length = area / thickness;
        if !length.is_finite() || length < 0.0 {
            length = 0.0;
        }
        if i == row.len() - 1 {
            let remaining = if horizontal {
                (*w - offset).max(0.0)
            } else {
                (*h - offset).max(0.0)
            };
            if remaining.is_finite() {
                length = remaining;
            }
        }

        out[slot] = if horizontal {
            Rect {
                x: *x + offset,
                y: *y,
                w: length,
                h: thickness,
            }
        } else {
            Rect {
                x: *x,
                y: *y + offset,
                w: thickness,
                h: length,
            }
        };
        offset += length;
    }

    if horizontal {
        *y += thickness;
        *h = (*h - thickness).max(0.0);
    } else {
        *x += thickness;
        *w = (*w - thickness).max(0.0);
    }
}

fn worst_aspect_ratio(min_area: f64, max_area: f64, sum: f64, side: f64) -> f64 {
    if sum <= 0.0 || side <= 0.0 || min_area <= 0.0 || max_area <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let a = (side_sq * max_area) / sum_sq;
    let b = sum_sq / (side_sq * min_area);
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use proptest::prelude::*;

    fn record(name: &str, client: &str, area: f64) -> Record {
        let mut r = Record::new();
        r.set("name", name);
        r.set("client", client);
        r.set("area", area);
        r
    }

    fn groups(specs: &[(&str, &[f64])]) -> Vec<Group> {
        specs
            .iter()
            .map(|(name, areas)| Group {
                name: name.to_string(),
                members: areas
                    .iter()
                    .enumerate()
                    .map(|(i, a)| record(&format!("{}-{}", name, i), name, *a))
                    .collect(),
            })
            .collect()
    }

    fn flat_options(width: f64, height: f64) -> LayoutOptions {
        LayoutOptions {
            width,
            height,
            padding: 0.0,
            round: false,
        }
    }

    const SIZE: SizeField = SizeField::Uniform;

    fn area_field() -> SizeField {
        SizeField::Field("area".to_string())
    }

    #[test]
    fn test_root_rectangle_equals_viewport() {
        let root = compute_layout(
            groups(&[("A", &[10.0])]),
            &area_field(),
            &LayoutOptions::new(800.0, 600.0),
        );
        assert_eq!((root.x0, root.y0, root.x1, root.y1), (0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn test_children_tile_parent_without_padding() {
        let root = compute_layout(
            groups(&[("A", &[40.0, 20.0]), ("B", &[30.0, 10.0])]),
            &area_field(),
            &flat_options(100.0, 100.0),
        );
        let child_area: f64 = root.children.iter().map(|c| c.area()).sum();
        assert!((child_area - 10000.0).abs() < 1e-6);

        for group in &root.children {
            let leaf_area: f64 = group.children.iter().map(|c| c.area()).sum();
            assert!((leaf_area - group.area()).abs() < 1e-6);
            for leaf in &group.children {
                assert!(leaf.x0 >= group.x0 - 1e-9 && leaf.x1 <= group.x1 + 1e-9);
                assert!(leaf.y0 >= group.y0 - 1e-9 && leaf.y1 <= group.y1 + 1e-9);
            }
        }
    }

    #[test]
    fn test_areas_proportional_to_weights() {
        let root = compute_layout(
            groups(&[("A", &[60.0]), ("B", &[30.0]), ("C", &[10.0])]),
            &area_field(),
            &flat_options(200.0, 100.0),
        );
        let total_area = 200.0 * 100.0;
        let by_name = |n: &str| root.children.iter().find(|c| c.name == n).unwrap();
        assert!((by_name("A").area() - total_area * 0.6).abs() < 1e-6);
        assert!((by_name("B").area() - total_area * 0.3).abs() < 1e-6);
        assert!((by_name("C").area() - total_area * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_siblings_sorted_by_descending_size() {
        let root = compute_layout(
            groups(&[("small", &[5.0]), ("big", &[50.0]), ("mid", &[20.0])]),
            &area_field(),
            &flat_options(100.0, 100.0),
        );
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["big", "mid", "small"]);
    }

    #[test]
    fn test_equal_weights_keep_first_seen_order() {
        let root = compute_layout(
            groups(&[("first", &[10.0]), ("second", &[10.0]), ("third", &[10.0])]),
            &area_field(),
            &flat_options(90.0, 90.0),
        );
        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rounding_produces_integer_coordinates() {
        let mut opts = LayoutOptions::new(101.0, 67.0);
        opts.padding = 3.0;
        let root = compute_layout(
            groups(&[("A", &[7.0, 3.0]), ("B", &[5.0])]),
            &area_field(),
            &opts,
        );
        for group in &root.children {
            for v in [group.x0, group.y0, group.x1, group.y1] {
                assert_eq!(v, v.round());
            }
            for leaf in &group.children {
                for v in [leaf.x0, leaf.y0, leaf.x1, leaf.y1] {
                    assert_eq!(v, v.round());
                }
            }
        }
    }

    #[test]
    fn test_padding_separates_siblings() {
        let mut opts = flat_options(100.0, 100.0);
        opts.padding = 4.0;
        let root = compute_layout(
            groups(&[("A", &[50.0]), ("B", &[50.0])]),
            &area_field(),
            &opts,
        );
        let a = &root.children[0];
        let b = &root.children[1];
        // Insetting each sibling by half the padding leaves the full gap.
        let gap = if a.x1 <= b.x0 {
            b.x0 - a.x1
        } else if b.x1 <= a.x0 {
            a.x0 - b.x1
        } else if a.y1 <= b.y0 {
            b.y0 - a.y1
        } else {
            a.y0 - b.y1
        };
        assert!((gap - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_weight_records_collapse_but_survive() {
        let root = compute_layout(
            groups(&[("A", &[10.0, 0.0, 5.0])]),
            &area_field(),
            &flat_options(100.0, 100.0),
        );
        let group = &root.children[0];
        assert_eq!(group.children.len(), 3);
        let zero = group
            .children
            .iter()
            .find(|c| c.value == 0.0)
            .expect("zero-weight leaf kept");
        assert_eq!(zero.area(), 0.0);
    }

    #[test]
    fn test_all_zero_weights_never_fail() {
        let root = compute_layout(
            groups(&[("A", &[0.0, 0.0])]),
            &area_field(),
            &flat_options(100.0, 100.0),
        );
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].children.len(), 2);
        assert_eq!(root.value, 0.0);
    }

    #[test]
    fn test_uniform_size_weights_equally() {
        let root = compute_layout(
            groups(&[("A", &[999.0]), ("B", &[1.0])]),
            &SIZE,
            &flat_options(100.0, 100.0),
        );
        assert!((root.children[0].area() - root.children[1].area()).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        let root = compute_layout(vec![], &SIZE, &LayoutOptions::new(100.0, 100.0));
        assert!(root.children.is_empty());
        assert_eq!(root.value, 0.0);
    }

    #[test]
    fn test_display_label_prefers_name_over_id() {
        let mut r = Record::new();
        r.set("id", "B-1");
        r.set("name", "North Plant");
        assert_eq!(display_label(&r), "North Plant");

        let mut r = Record::new();
        r.set("id", "B-2");
        assert_eq!(display_label(&r), "B-2");

        let mut r = Record::new();
        r.set("misc", 1.0);
        assert_eq!(display_label(&r), "Unknown");

        let mut r = Record::new();
        r.set("name", Value::Null);
        r.set("key", "K-7");
        assert_eq!(display_label(&r), "K-7");
    }

    proptest! {
        #[test]
        fn prop_leaves_tile_their_group(
            weights in proptest::collection::vec(0.1f64..100.0, 1..20),
        ) {
            let members: Vec<Record> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| record(&format!("r{}", i), "G", *w))
                .collect();
            let group = Group { name: "G".to_string(), members };
            let root = compute_layout(
                vec![group],
                &area_field(),
                &flat_options(640.0, 480.0),
            );
            let parent = &root.children[0];
            let leaf_area: f64 = parent.children.iter().map(|c| c.area()).sum();
            prop_assert!((leaf_area - parent.area()).abs() < 1e-3);

            let total: f64 = weights.iter().sum();
            for leaf in &parent.children {
                prop_assert!(leaf.x0 >= parent.x0 - 1e-6 && leaf.x1 <= parent.x1 + 1e-6);
                prop_assert!(leaf.y0 >= parent.y0 - 1e-6 && leaf.y1 <= parent.y1 + 1e-6);
                let expected = parent.area() * leaf.value / total;
                prop_assert!((leaf.area() - expected).abs() < 1e-3);
            }
        }
    }
}
